use std::collections::HashSet;

use anyhow::Result;
use rand::Rng;

use super::blend::BlendRequest;
use super::deep_dive::DeepDiveRequest;
use super::standard::StandardRequest;
use super::time_machine::TimeMachineRequest;
use super::PlaylistKind;
use crate::models::Track;
use crate::profile::TasteProfile;
use crate::provider::MusicProvider;

/// Track count used when a request names neither a count nor a duration
pub const DEFAULT_TRACK_COUNT: u32 = 30;

/// One playlist request, by generation mode
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    Standard(StandardRequest),
    Discovery(StandardRequest),
    Blend(BlendRequest),
    TimeMachine(TimeMachineRequest),
    DeepDive(DeepDiveRequest),
}

/// Tracks picked by a strategy, before naming and upload
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPlaylist {
    pub kind: PlaylistKind,
    pub tracks: Vec<Track>,
}

/// Runs the generation strategies against a catalog and a taste profile.
///
/// Randomness is injected so runs can be reproduced with a seeded generator.
pub struct PlaylistGenerator<'a, R: Rng> {
    pub(super) provider: &'a dyn MusicProvider,
    pub(super) profile: &'a TasteProfile,
    pub(super) rng: R,
}

impl<'a, R: Rng> PlaylistGenerator<'a, R> {
    pub fn new(provider: &'a dyn MusicProvider, profile: &'a TasteProfile, rng: R) -> Self {
        Self {
            provider,
            profile,
            rng,
        }
    }

    pub fn generate(&mut self, request: &GenerationRequest) -> Result<GeneratedPlaylist> {
        match request {
            GenerationRequest::Standard(request) => self.standard(request),
            GenerationRequest::Discovery(request) => self.discover(request),
            GenerationRequest::Blend(request) => self.blend(request),
            GenerationRequest::TimeMachine(request) => self.time_machine(request),
            GenerationRequest::DeepDive(request) => self.deep_dive(request),
        }
    }
}

/// Collects tracks in arrival order, skipping ids it has already seen
#[derive(Debug, Default)]
pub(crate) struct TrackAccumulator {
    tracks: Vec<Track>,
    seen: HashSet<String>,
}

impl TrackAccumulator {
    /// Append unseen tracks and return how many were added
    pub fn extend(&mut self, batch: impl IntoIterator<Item = Track>) -> usize {
        self.extend_up_to(batch, usize::MAX)
    }

    /// Like [`extend`](Self::extend) but stops once `cap` tracks are held
    pub fn extend_up_to(&mut self, batch: impl IntoIterator<Item = Track>, cap: usize) -> usize {
        let before = self.tracks.len();
        for track in batch {
            if self.tracks.len() >= cap {
                break;
            }
            if self.seen.insert(track.id.clone()) {
                self.tracks.push(track);
            }
        }
        self.tracks.len() - before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration_ms).sum()
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

/// Requested count clamped to something the catalog can serve
pub(crate) fn resolve_count(count: Option<u32>) -> u32 {
    count.unwrap_or(DEFAULT_TRACK_COUNT).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, duration_ms: u64) -> Track {
        Track {
            id: id.to_string(),
            duration_ms,
            ..Track::default()
        }
    }

    #[test]
    fn test_accumulator_skips_seen_ids() {
        let mut acc = TrackAccumulator::default();
        assert_eq!(acc.extend(vec![track("a", 1000), track("b", 2000), track("a", 1000)]), 2);
        assert_eq!(acc.extend(vec![track("b", 2000), track("c", 3000)]), 1);
        assert_eq!(acc.extend(vec![track("c", 3000)]), 0);
        assert!(acc.contains("c"));
        assert_eq!(acc.total_duration_ms(), 6000);
        let ids: Vec<String> = acc.into_tracks().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_accumulator_respects_cap() {
        let mut acc = TrackAccumulator::default();
        let batch: Vec<Track> = (0..10).map(|i| track(&format!("t{i}"), 1)).collect();
        assert_eq!(acc.extend_up_to(batch, 4), 4);
        assert_eq!(acc.len(), 4);
    }

    #[test]
    fn test_resolve_count_defaults_and_floors() {
        assert_eq!(resolve_count(None), DEFAULT_TRACK_COUNT);
        assert_eq!(resolve_count(Some(0)), 1);
        assert_eq!(resolve_count(Some(12)), 12);
    }
}
