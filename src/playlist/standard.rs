use anyhow::Result;
use rand::Rng;
use rand::seq::SliceRandom;

use super::generator::{GeneratedPlaylist, PlaylistGenerator, TrackAccumulator, resolve_count};
use super::{PlaylistKind, Theme};
use crate::intent::{
    Activity, AudioTargets, Intent, IntentMapper, MAX_RECOMMENDATION_LIMIT, Mood,
    RecommendationParams, TimeOfDay,
};
use crate::models::{SearchKind, Track};

/// Assumed average track length when sizing the first duration-based fetch
pub const AVERAGE_TRACK_MINUTES: f64 = 3.5;
/// Upper bound on tracks gathered while filling a duration
pub const MAX_DURATION_FILL_TRACKS: usize = 100;

const DISCOVERY_MAX_POPULARITY: u32 = 50;
const RANDOM_ARTIST_SEEDS: usize = 2;
const RANDOM_TRACK_SEEDS: usize = 2;

/// Preset / vibe driven request, optionally anchored on an artist or track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardRequest {
    pub mood: Option<Mood>,
    pub activity: Option<Activity>,
    pub time_of_day: Option<TimeOfDay>,
    pub vibe: Option<String>,
    pub based_on: Option<String>,
    pub discover: bool,
    pub count: Option<u32>,
    pub duration_minutes: Option<u32>,
}

impl StandardRequest {
    /// Intents in precedence order: presets first, free text on top
    pub fn intents(&self) -> Vec<Intent> {
        let mut intents = Vec::new();
        if let Some(mood) = self.mood {
            intents.push(Intent::Mood(mood));
        }
        if let Some(activity) = self.activity {
            intents.push(Intent::Activity(activity));
        }
        if let Some(time) = self.time_of_day {
            intents.push(Intent::TimeOfDay(time));
        }
        if let Some(vibe) = self.vibe.as_deref().filter(|v| !v.trim().is_empty()) {
            intents.push(Intent::Vibe(vibe.to_string()));
        }
        intents
    }

    fn theme(&self, based_on: Option<String>) -> Theme {
        if let Some(name) = based_on {
            Theme::BasedOn(name)
        } else if let Some(vibe) = self.vibe.as_deref().filter(|v| !v.trim().is_empty()) {
            Theme::Vibe(vibe.trim().to_string())
        } else if let Some(mood) = self.mood {
            Theme::Mood(mood)
        } else if let Some(activity) = self.activity {
            Theme::Activity(activity)
        } else if let Some(time) = self.time_of_day {
            Theme::TimeOfDay(time)
        } else {
            Theme::Mix
        }
    }
}

/// `artist:NAME` or `track:NAME`; a bare name is taken as an artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReference {
    Artist(String),
    Track(String),
}

impl SeedReference {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (kind, name) = match value.split_once(':') {
            Some((prefix, rest)) if prefix.trim().eq_ignore_ascii_case("artist") => {
                (SearchKind::Artist, rest)
            }
            Some((prefix, rest)) if prefix.trim().eq_ignore_ascii_case("track") => {
                (SearchKind::Track, rest)
            }
            _ => (SearchKind::Artist, value),
        };

        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(match kind {
            SearchKind::Artist => SeedReference::Artist(name.to_string()),
            SearchKind::Track => SeedReference::Track(name.to_string()),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            SeedReference::Artist(name) | SeedReference::Track(name) => name,
        }
    }
}

impl<R: Rng> PlaylistGenerator<'_, R> {
    /// Presets and vibe blended with the listener's taste
    pub fn standard(&mut self, request: &StandardRequest) -> Result<GeneratedPlaylist> {
        let mut params = RecommendationParams::with_targets(IntentMapper::combine(&request.intents()));

        let based_on = match request.based_on.as_deref() {
            Some(value) => self.apply_based_on(value, &mut params)?,
            None => None,
        };

        if !params.has_seeds() {
            self.pick_profile_seeds(&mut params);
        }

        if request.discover {
            self.apply_discovery(&mut params)?;
        }

        self.fill_from_profile(&mut params.targets);

        log::debug!("standard recommendation params: {params:?}");

        let tracks = match request.duration_minutes {
            Some(minutes) => self.fill_duration(params, minutes)?,
            None => {
                let count = resolve_count(request.count);
                params.limit = Some(count.min(MAX_RECOMMENDATION_LIMIT));
                let mut collected = TrackAccumulator::default();
                collected.extend(self.provider.recommendations(&params)?);
                let mut tracks = collected.into_tracks();
                tracks.truncate(count as usize);
                tracks
            }
        };

        Ok(GeneratedPlaylist {
            kind: PlaylistKind::Standard {
                theme: request.theme(based_on),
            },
            tracks,
        })
    }

    /// Standard generation pushed towards less popular tracks
    pub fn discover(&mut self, request: &StandardRequest) -> Result<GeneratedPlaylist> {
        let request = StandardRequest {
            discover: true,
            ..request.clone()
        };
        let mut generated = self.standard(&request)?;
        generated.kind = PlaylistKind::Discovery;
        Ok(generated)
    }

    /// Resolve `based_on` to a single seed. Returns the matched display name.
    fn apply_based_on(
        &mut self,
        value: &str,
        params: &mut RecommendationParams,
    ) -> Result<Option<String>> {
        let Some(reference) = SeedReference::parse(value) else {
            log::warn!("ignoring empty based-on value '{value}'");
            return Ok(None);
        };

        match &reference {
            SeedReference::Artist(name) => {
                let results = self.provider.search(name, SearchKind::Artist, 1)?;
                if let Some(artist) = results.artists.into_iter().next() {
                    log::info!("seeding from artist '{}' ({})", artist.name, artist.id);
                    params.seed_artists = vec![artist.id];
                    return Ok(Some(artist.name));
                }
            }
            SeedReference::Track(name) => {
                let results = self.provider.search(name, SearchKind::Track, 1)?;
                if let Some(track) = results.tracks.into_iter().next() {
                    log::info!("seeding from track '{}' ({})", track.name, track.id);
                    params.seed_tracks = vec![track.id];
                    return Ok(Some(track.name));
                }
            }
        }

        log::warn!(
            "no match for '{}', falling back to your top artists and tracks",
            reference.name()
        );
        Ok(None)
    }

    fn pick_profile_seeds(&mut self, params: &mut RecommendationParams) {
        params.seed_artists = self
            .profile
            .top_artist_ids
            .choose_multiple(&mut self.rng, RANDOM_ARTIST_SEEDS)
            .cloned()
            .collect();
        params.seed_tracks = self
            .profile
            .top_track_ids
            .choose_multiple(&mut self.rng, RANDOM_TRACK_SEEDS)
            .cloned()
            .collect();

        if !params.has_seeds() {
            log::warn!("taste profile has no top artists or tracks to seed from");
        }
    }

    fn apply_discovery(&mut self, params: &mut RecommendationParams) -> Result<()> {
        params.cap_popularity(DISCOVERY_MAX_POPULARITY);

        let allowed = self.provider.available_genre_seeds()?;
        let genre = self
            .profile
            .genre_names()
            .find(|genre| allowed.iter().any(|a| a == genre));

        if let Some(genre) = genre {
            params.seed_genres = vec![genre.to_string()];
            params.seed_artists.truncate(1);
            params.seed_tracks.truncate(1);
        }
        Ok(())
    }

    /// Energy, valence and danceability default to the listener's averages
    fn fill_from_profile(&self, targets: &mut AudioTargets) {
        if self.profile.is_empty() {
            return;
        }
        let averages = self.profile.avg_features;
        targets.energy.get_or_insert(averages.energy);
        targets.valence.get_or_insert(averages.valence);
        targets.danceability.get_or_insert(averages.danceability);
    }

    /// Query repeatedly until the requested minutes are covered
    pub(super) fn fill_duration(
        &mut self,
        mut params: RecommendationParams,
        minutes: u32,
    ) -> Result<Vec<Track>> {
        let target_ms = u64::from(minutes) * 60_000;
        let estimate = (f64::from(minutes) / AVERAGE_TRACK_MINUTES).ceil() as u32;
        params.limit = Some(estimate.clamp(1, MAX_RECOMMENDATION_LIMIT));

        let mut collected = TrackAccumulator::default();
        collected.extend_up_to(self.provider.recommendations(&params)?, MAX_DURATION_FILL_TRACKS);

        while collected.total_duration_ms() < target_ms
            && collected.len() < MAX_DURATION_FILL_TRACKS
        {
            params.seed_artists.shuffle(&mut self.rng);
            params.seed_tracks.shuffle(&mut self.rng);

            let batch = self.provider.recommendations(&params)?;
            let added = collected.extend_up_to(batch, MAX_DURATION_FILL_TRACKS);
            log::debug!(
                "duration fill: +{added} tracks, {}/{} ms",
                collected.total_duration_ms(),
                target_ms
            );
            if added == 0 {
                break;
            }
        }

        Ok(trim_to_duration(collected.into_tracks(), target_ms))
    }
}

/// Keep tracks until their running duration reaches `target_ms`
pub fn trim_to_duration(tracks: Vec<Track>, target_ms: u64) -> Vec<Track> {
    let mut total = 0;
    tracks
        .into_iter()
        .take_while(|track| {
            let keep = total < target_ms;
            total += track.duration_ms;
            keep
        })
        .collect()
}
