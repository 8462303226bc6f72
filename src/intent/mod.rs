pub mod presets;
pub mod targets;
pub mod vibe;

pub use presets::{Activity, Mood, TimeOfDay};
pub use targets::*;
pub use vibe::parse_vibe;

/// A single thing the listener asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Mood(Mood),
    Activity(Activity),
    TimeOfDay(TimeOfDay),
    Vibe(String),
}

/// Maps intents to audio targets. Stateless: the same intents always give the same targets.
pub struct IntentMapper;

impl IntentMapper {
    pub fn targets_for(intent: &Intent) -> AudioTargets {
        match intent {
            Intent::Mood(mood) => mood.targets(),
            Intent::Activity(activity) => activity.targets(),
            Intent::TimeOfDay(time) => time.targets(),
            Intent::Vibe(text) => parse_vibe(text),
        }
    }

    /// Combine several intents, later ones overriding earlier ones
    pub fn combine(intents: &[Intent]) -> AudioTargets {
        AudioTargets::layered(intents.iter().map(Self::targets_for))
    }
}
