pub mod blend;
pub mod deep_dive;
pub mod finalizer;
pub mod generator;
pub mod standard;
pub mod time_machine;
pub mod utils;

pub use blend::BlendRequest;
pub use deep_dive::DeepDiveRequest;
pub use finalizer::{PlaylistDraft, PlaylistFinalizer, PlaylistOptions};
pub use generator::*;
pub use standard::StandardRequest;
pub use time_machine::TimeMachineRequest;

use crate::intent::{Activity, Mood, TimeOfDay};

/// What a standard playlist is about, used for its default name
#[derive(Debug, Clone, PartialEq)]
pub enum Theme {
    BasedOn(String),
    Vibe(String),
    Mood(Mood),
    Activity(Activity),
    TimeOfDay(TimeOfDay),
    Mix,
}

/// The mode that produced a playlist, with the details its name is built from
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistKind {
    Standard {
        theme: Theme,
    },
    Discovery,
    Blend {
        artists: Vec<String>,
    },
    TimeMachine {
        first_year: u32,
        last_year: u32,
        from_birth_year: bool,
    },
    DeepDive {
        genre: String,
        deep_cuts: bool,
    },
}
