use std::collections::HashMap;

use super::history::RawHistory;
use super::{FeatureAverages, FeatureRanges, GenreWeight, ListeningPatterns, TasteProfile, ValueRange};
use crate::models::{AudioFeatures, Track};

const SHORT_TERM_WEIGHT: f64 = 3.0;
const RECENTLY_PLAYED_WEIGHT: f64 = 2.5;
const MEDIUM_TERM_WEIGHT: f64 = 2.0;
const LONG_TERM_WEIGHT: f64 = 1.0;

/// Rank positions over which a tier's weight decays to zero
const RANK_DEPTH: usize = 50;

const SHORT_TERM_GENRE_WEIGHT: u32 = 3;
const MEDIUM_TERM_GENRE_WEIGHT: u32 = 2;
const LONG_TERM_GENRE_WEIGHT: u32 = 1;

const MAX_TOP_GENRES: usize = 20;
const MAX_SEEDS: usize = 10;

const HIGH_ENERGY_THRESHOLD: f64 = 0.6;
const ACOUSTIC_THRESHOLD: f64 = 0.4;

/// Turns raw history into a [`TasteProfile`]
pub struct TasteProfileBuilder;

impl TasteProfileBuilder {
    pub fn build(history: &RawHistory) -> TasteProfile {
        let weighted = Self::weighted_tracks(history);

        let mut accumulator = FeatureAccumulator::default();
        for (track, weight) in &weighted {
            if let Some(features) = history.features_for(&track.id) {
                accumulator.add(features, *weight, track.popularity);
            }
        }

        let (top_artist_ids, top_artist_names) = Self::seed_artists(history);

        accumulator.finish(
            Self::top_genres(history),
            top_artist_ids,
            top_artist_names,
            Self::seed_tracks(history),
        )
    }

    /// Weight for the entry at `rank` (0-based) of a tier
    pub fn rank_weight(tier_weight: f64, rank: usize) -> f64 {
        tier_weight * RANK_DEPTH.saturating_sub(rank) as f64 / RANK_DEPTH as f64
    }

    fn weighted_tracks(history: &RawHistory) -> Vec<(&Track, f64)> {
        let tiers = [
            (&history.short_term_tracks, SHORT_TERM_WEIGHT),
            (&history.recently_played, RECENTLY_PLAYED_WEIGHT),
            (&history.medium_term_tracks, MEDIUM_TERM_WEIGHT),
            (&history.long_term_tracks, LONG_TERM_WEIGHT),
        ];

        tiers
            .into_iter()
            .flat_map(|(tracks, tier_weight)| {
                tracks
                    .iter()
                    .enumerate()
                    .map(move |(rank, track)| (track, Self::rank_weight(tier_weight, rank)))
            })
            .filter(|(track, weight)| *weight > 0.0 && !track.id.is_empty())
            .collect()
    }

    fn top_genres(history: &RawHistory) -> Vec<GenreWeight> {
        let tiers = [
            (&history.short_term_artists, SHORT_TERM_GENRE_WEIGHT),
            (&history.medium_term_artists, MEDIUM_TERM_GENRE_WEIGHT),
            (&history.long_term_artists, LONG_TERM_GENRE_WEIGHT),
        ];

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for (artists, weight) in tiers {
            for genre in artists.iter().flat_map(|artist| &artist.genres) {
                *counts.entry(genre.as_str()).or_insert(0) += weight;
            }
        }

        let mut genres: Vec<GenreWeight> = counts
            .into_iter()
            .map(|(genre, weight)| GenreWeight {
                genre: genre.to_string(),
                weight,
            })
            .collect();
        genres.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.genre.cmp(&b.genre)));
        genres.truncate(MAX_TOP_GENRES);
        genres
    }

    // An empty short-term window (new accounts) falls back to the longer windows
    fn seed_artists(history: &RawHistory) -> (Vec<String>, Vec<String>) {
        let artists = [
            &history.short_term_artists,
            &history.medium_term_artists,
            &history.long_term_artists,
        ]
        .into_iter()
        .find(|tier| !tier.is_empty());

        artists
            .map(|tier| {
                tier.iter()
                    .take(MAX_SEEDS)
                    .map(|artist| (artist.id.clone(), artist.name.clone()))
                    .unzip()
            })
            .unwrap_or_default()
    }

    fn seed_tracks(history: &RawHistory) -> Vec<String> {
        [
            &history.short_term_tracks,
            &history.medium_term_tracks,
            &history.long_term_tracks,
        ]
        .into_iter()
        .find(|tier| !tier.is_empty())
        .map(|tier| {
            tier.iter()
                .filter(|track| !track.id.is_empty())
                .take(MAX_SEEDS)
                .map(|track| track.id.clone())
                .collect()
        })
        .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct FeatureAccumulator {
    total_weight: f64,
    sums: FeatureAverages,
    ranges: Option<FeatureRanges>,
    major: usize,
    minor: usize,
    popularity_sum: u64,
    count: usize,
}

impl FeatureAccumulator {
    fn add(&mut self, features: &AudioFeatures, weight: f64, popularity: u32) {
        self.total_weight += weight;
        self.sums.danceability += features.danceability * weight;
        self.sums.energy += features.energy * weight;
        self.sums.valence += features.valence * weight;
        self.sums.acousticness += features.acousticness * weight;
        self.sums.instrumentalness += features.instrumentalness * weight;
        self.sums.tempo += features.tempo * weight;
        self.sums.loudness += features.loudness * weight;

        let point = |value: f64| ValueRange { min: value, max: value };
        let ranges = self.ranges.get_or_insert(FeatureRanges {
            danceability: point(features.danceability),
            energy: point(features.energy),
            valence: point(features.valence),
            tempo: point(features.tempo),
        });
        widen(&mut ranges.danceability, features.danceability);
        widen(&mut ranges.energy, features.energy);
        widen(&mut ranges.valence, features.valence);
        widen(&mut ranges.tempo, features.tempo);

        if features.is_major() {
            self.major += 1;
        } else {
            self.minor += 1;
        }

        self.popularity_sum += u64::from(popularity);
        self.count += 1;
    }

    fn finish(
        self,
        top_genres: Vec<GenreWeight>,
        top_artist_ids: Vec<String>,
        top_artist_names: Vec<String>,
        top_track_ids: Vec<String>,
    ) -> TasteProfile {
        // Nothing had features: keep the zero profile instead of dividing by zero
        let avg_features = if self.total_weight > 0.0 {
            let w = self.total_weight;
            FeatureAverages {
                danceability: self.sums.danceability / w,
                energy: self.sums.energy / w,
                valence: self.sums.valence / w,
                acousticness: self.sums.acousticness / w,
                instrumentalness: self.sums.instrumentalness / w,
                tempo: self.sums.tempo / w,
                loudness: self.sums.loudness / w,
            }
        } else {
            FeatureAverages::default()
        };

        let average_popularity = if self.count > 0 {
            self.popularity_sum as f64 / self.count as f64
        } else {
            0.0
        };

        TasteProfile {
            top_genres,
            avg_features,
            feature_ranges: self.ranges.unwrap_or_default(),
            top_artist_ids,
            top_artist_names,
            top_track_ids,
            listening_patterns: ListeningPatterns {
                prefers_major_key: self.major > self.minor,
                prefers_high_energy: avg_features.energy > HIGH_ENERGY_THRESHOLD,
                prefers_acoustic: avg_features.acousticness > ACOUSTIC_THRESHOLD,
                average_popularity,
            },
            tracks_analyzed: self.count,
        }
    }
}

fn widen(range: &mut ValueRange, value: f64) {
    range.min = range.min.min(value);
    range.max = range.max.max(value);
}
