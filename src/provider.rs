use anyhow::Result;

use crate::intent::RecommendationParams;
use crate::models::{
    Artist, AudioFeatures, CreatedPlaylist, PlayHistory, SearchKind, SearchResults, TimeRange,
    Track,
};

/// Maximum ids accepted by a single audio features lookup
pub const AUDIO_FEATURES_BATCH_SIZE: usize = 100;

/// Everything the generator needs from the music catalog.
///
/// Implementations own transport concerns (auth, token refresh, paging). Callers
/// treat every error as fatal for the current run.
#[cfg_attr(test, mockall::automock)]
pub trait MusicProvider: Send + Sync {
    /// Top tracks for a window, most relevant first
    fn top_tracks(&self, range: TimeRange, limit: u32) -> Result<Vec<Track>>;

    /// Top artists for a window, most relevant first
    fn top_artists(&self, range: TimeRange, limit: u32) -> Result<Vec<Artist>>;

    fn recently_played(&self, limit: u32) -> Result<Vec<PlayHistory>>;

    /// Audio descriptors for at most [`AUDIO_FEATURES_BATCH_SIZE`] ids, `None` for unknown ids
    fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>>;

    fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<SearchResults>;

    /// Candidate tracks; the count is advisory and may repeat earlier results
    fn recommendations(&self, params: &RecommendationParams) -> Result<Vec<Track>>;

    fn available_genre_seeds(&self) -> Result<Vec<String>>;

    fn tracks_by_year(&self, year: u32, limit: u32) -> Result<Vec<Track>>;

    fn current_user_id(&self) -> Result<String>;

    fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist>;

    fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()>;
}
