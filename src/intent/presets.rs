use clap::ValueEnum;
use serde::Serialize;

use super::AudioTargets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Chill,
    Angry,
    Romantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Workout,
    Focus,
    Party,
    Sleep,
    Commute,
    Cooking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Mood {
    pub const fn targets(self) -> AudioTargets {
        match self {
            Mood::Happy => AudioTargets {
                energy: Some(0.7),
                valence: Some(0.8),
                danceability: Some(0.7),
                ..AudioTargets::NONE
            },
            Mood::Sad => AudioTargets {
                energy: Some(0.3),
                valence: Some(0.2),
                acousticness: Some(0.6),
                ..AudioTargets::NONE
            },
            Mood::Energetic => AudioTargets {
                energy: Some(0.9),
                valence: Some(0.7),
                tempo: Some(130.0),
                ..AudioTargets::NONE
            },
            Mood::Chill => AudioTargets {
                energy: Some(0.3),
                valence: Some(0.5),
                acousticness: Some(0.6),
                ..AudioTargets::NONE
            },
            Mood::Angry => AudioTargets {
                energy: Some(0.9),
                valence: Some(0.2),
                tempo: Some(140.0),
                ..AudioTargets::NONE
            },
            Mood::Romantic => AudioTargets {
                energy: Some(0.4),
                valence: Some(0.6),
                acousticness: Some(0.5),
                ..AudioTargets::NONE
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Energetic => "energetic",
            Mood::Chill => "chill",
            Mood::Angry => "angry",
            Mood::Romantic => "romantic",
        }
    }
}

impl Activity {
    pub const fn targets(self) -> AudioTargets {
        match self {
            Activity::Workout => AudioTargets {
                energy: Some(0.9),
                danceability: Some(0.75),
                tempo: Some(140.0),
                ..AudioTargets::NONE
            },
            Activity::Focus => AudioTargets {
                energy: Some(0.4),
                valence: Some(0.5),
                instrumentalness: Some(0.7),
                ..AudioTargets::NONE
            },
            Activity::Party => AudioTargets {
                energy: Some(0.85),
                valence: Some(0.8),
                danceability: Some(0.85),
                ..AudioTargets::NONE
            },
            Activity::Sleep => AudioTargets {
                energy: Some(0.1),
                acousticness: Some(0.8),
                instrumentalness: Some(0.6),
                tempo: Some(70.0),
                ..AudioTargets::NONE
            },
            Activity::Commute => AudioTargets {
                energy: Some(0.6),
                valence: Some(0.6),
                ..AudioTargets::NONE
            },
            Activity::Cooking => AudioTargets {
                energy: Some(0.5),
                valence: Some(0.7),
                danceability: Some(0.6),
                ..AudioTargets::NONE
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Activity::Workout => "workout",
            Activity::Focus => "focus",
            Activity::Party => "party",
            Activity::Sleep => "sleep",
            Activity::Commute => "commute",
            Activity::Cooking => "cooking",
        }
    }
}

impl TimeOfDay {
    pub const fn targets(self) -> AudioTargets {
        match self {
            TimeOfDay::Morning => AudioTargets {
                energy: Some(0.5),
                valence: Some(0.7),
                acousticness: Some(0.4),
                ..AudioTargets::NONE
            },
            TimeOfDay::Afternoon => AudioTargets {
                energy: Some(0.6),
                valence: Some(0.6),
                ..AudioTargets::NONE
            },
            TimeOfDay::Evening => AudioTargets {
                energy: Some(0.4),
                valence: Some(0.5),
                acousticness: Some(0.5),
                ..AudioTargets::NONE
            },
            TimeOfDay::Night => AudioTargets {
                energy: Some(0.3),
                valence: Some(0.4),
                instrumentalness: Some(0.3),
                ..AudioTargets::NONE
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

/// Coffee shop base layer, only reachable through vibe text
pub const COFFEE_CONTEXT: AudioTargets = AudioTargets {
    energy: Some(0.4),
    valence: Some(0.6),
    acousticness: Some(0.6),
    ..AudioTargets::NONE
};
