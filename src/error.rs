use thiserror::Error;

/// A named artist, genre or year range could not be turned into something the
/// catalog understands. Always fatal for the run that hit it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("none of the requested artists could be found: {}", .0.join(", "))]
    ArtistsNotFound(Vec<String>),

    #[error(
        "no genre matches '{requested}'. Available genres include: {}",
        .available.join(", ")
    )]
    GenreNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error("no valid years to search: {requested:?} fall outside {min}-{max}")]
    NoValidYears {
        requested: Vec<u32>,
        min: u32,
        max: u32,
    },

    #[error("the time machine needs either a year or a birth year")]
    MissingYear,
}
