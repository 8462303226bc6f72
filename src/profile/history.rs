use std::collections::{HashMap, HashSet};
use std::thread::{self, ScopedJoinHandle};

use anyhow::{Result, anyhow};

use crate::models::{Artist, AudioFeatures, Track, TimeRange};
use crate::provider::{AUDIO_FEATURES_BATCH_SIZE, MusicProvider};

/// Items requested per top list and for recently played
pub const HISTORY_LIMIT: u32 = 50;

/// Raw listening signals for one run, in the order the catalog ranked them
#[derive(Debug, Clone, Default)]
pub struct RawHistory {
    pub short_term_tracks: Vec<Track>,
    pub medium_term_tracks: Vec<Track>,
    pub long_term_tracks: Vec<Track>,
    pub short_term_artists: Vec<Artist>,
    pub medium_term_artists: Vec<Artist>,
    pub long_term_artists: Vec<Artist>,
    pub recently_played: Vec<Track>,
    pub audio_features: HashMap<String, AudioFeatures>,
}

impl RawHistory {
    /// Every track seen across all lists, first occurrence wins
    pub fn unique_track_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        [
            &self.short_term_tracks,
            &self.medium_term_tracks,
            &self.long_term_tracks,
            &self.recently_played,
        ]
        .into_iter()
        .flatten()
        .filter(|track| !track.id.is_empty() && seen.insert(track.id.as_str()))
        .map(|track| track.id.clone())
        .collect()
    }

    pub fn features_for(&self, track_id: &str) -> Option<&AudioFeatures> {
        self.audio_features.get(track_id)
    }
}

/// Gathers listening history from the catalog
pub struct HistoryAggregator;

impl HistoryAggregator {
    /// Fetch the seven history lists concurrently, then look up audio features
    pub fn collect(provider: &dyn MusicProvider) -> Result<RawHistory> {
        let mut history = thread::scope(|scope| -> Result<RawHistory> {
            let short_tracks =
                scope.spawn(|| provider.top_tracks(TimeRange::ShortTerm, HISTORY_LIMIT));
            let medium_tracks =
                scope.spawn(|| provider.top_tracks(TimeRange::MediumTerm, HISTORY_LIMIT));
            let long_tracks =
                scope.spawn(|| provider.top_tracks(TimeRange::LongTerm, HISTORY_LIMIT));
            let short_artists =
                scope.spawn(|| provider.top_artists(TimeRange::ShortTerm, HISTORY_LIMIT));
            let medium_artists =
                scope.spawn(|| provider.top_artists(TimeRange::MediumTerm, HISTORY_LIMIT));
            let long_artists =
                scope.spawn(|| provider.top_artists(TimeRange::LongTerm, HISTORY_LIMIT));
            let recent = scope.spawn(|| provider.recently_played(HISTORY_LIMIT));

            Ok(RawHistory {
                short_term_tracks: join(short_tracks)?,
                medium_term_tracks: join(medium_tracks)?,
                long_term_tracks: join(long_tracks)?,
                short_term_artists: join(short_artists)?,
                medium_term_artists: join(medium_artists)?,
                long_term_artists: join(long_artists)?,
                recently_played: join(recent)?
                    .into_iter()
                    .map(|entry| entry.track)
                    .collect(),
                audio_features: HashMap::new(),
            })
        })?;

        let track_ids = history.unique_track_ids();
        history.audio_features = Self::fetch_audio_features(provider, &track_ids)?;

        log::debug!(
            "collected history: {} unique tracks, {} with audio features",
            track_ids.len(),
            history.audio_features.len()
        );

        Ok(history)
    }

    /// Look up audio features in batches; ids without features are dropped
    pub fn fetch_audio_features(
        provider: &dyn MusicProvider,
        track_ids: &[String],
    ) -> Result<HashMap<String, AudioFeatures>> {
        let mut features = HashMap::with_capacity(track_ids.len());

        for batch in track_ids.chunks(AUDIO_FEATURES_BATCH_SIZE) {
            let results = provider.audio_features(batch)?;
            for (id, entry) in batch.iter().zip(results) {
                if let Some(entry) = entry {
                    features.insert(id.clone(), entry);
                }
            }
        }

        Ok(features)
    }
}

fn join<T>(handle: ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("history fetch thread panicked"))?
}
