pub mod builder;
pub mod history;

pub use builder::TasteProfileBuilder;
pub use history::HistoryAggregator;

use serde::Serialize;

/// Weighted summary of a listener's history, rebuilt on every run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TasteProfile {
    pub top_genres: Vec<GenreWeight>,
    pub avg_features: FeatureAverages,
    pub feature_ranges: FeatureRanges,
    pub top_artist_ids: Vec<String>,
    pub top_artist_names: Vec<String>,
    pub top_track_ids: Vec<String>,
    pub listening_patterns: ListeningPatterns,
    pub tracks_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreWeight {
    pub genre: String,
    pub weight: u32,
}

/// Weighted means of the audio descriptors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeatureAverages {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub tempo: f64,
    pub loudness: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[cfg(test)]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeatureRanges {
    pub danceability: ValueRange,
    pub energy: ValueRange,
    pub valence: ValueRange,
    pub tempo: ValueRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ListeningPatterns {
    pub prefers_major_key: bool,
    pub prefers_high_energy: bool,
    pub prefers_acoustic: bool,
    pub average_popularity: f64,
}

impl TasteProfile {
    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.top_genres.iter().map(|g| g.genre.as_str())
    }

    /// A profile with no analysed tracks carries no usable averages
    pub fn is_empty(&self) -> bool {
        self.tracks_analyzed == 0
    }
}
