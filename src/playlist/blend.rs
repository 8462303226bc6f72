use anyhow::Result;
use rand::Rng;

use super::generator::{GeneratedPlaylist, PlaylistGenerator, TrackAccumulator, resolve_count};
use super::PlaylistKind;
use crate::error::ResolutionError;
use crate::intent::{AudioTargets, MAX_RECOMMENDATION_LIMIT, RecommendationParams};
use crate::models::{Artist, SearchKind};

/// Value the listener's averages are pulled towards when blending
pub const BLEND_NEUTRAL: f64 = 0.6;

const GENRES_PER_ARTIST: usize = 3;
const MAX_GENRE_SEEDS: usize = 2;
const MAX_BLEND_ARTIST_SEEDS: usize = 2;

/// Mix the listener's taste with one or more named artists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendRequest {
    pub artists: Vec<String>,
    pub count: Option<u32>,
}

impl<R: Rng> PlaylistGenerator<'_, R> {
    pub fn blend(&mut self, request: &BlendRequest) -> Result<GeneratedPlaylist> {
        let found = self.find_artists(&request.artists)?;
        if found.is_empty() {
            return Err(ResolutionError::ArtistsNotFound(request.artists.clone()).into());
        }

        let blend_genres = collect_genres(&found);
        let overlap = overlapping_genres(self.profile.genre_names(), &blend_genres);
        log::debug!("blend genres {blend_genres:?}, shared with your taste: {overlap:?}");

        let allowed = self.provider.available_genre_seeds()?;
        let seed_genres = choose_genre_seeds(&overlap, &blend_genres, &allowed);

        let mut seed_artists: Vec<String> = found
            .iter()
            .take(MAX_BLEND_ARTIST_SEEDS)
            .map(|artist| artist.id.clone())
            .collect();
        if let Some(own) = self.profile.top_artist_ids.first() {
            seed_artists.push(own.clone());
        }

        let count = resolve_count(request.count);
        let params = RecommendationParams {
            seed_artists,
            seed_genres,
            limit: Some(count.min(MAX_RECOMMENDATION_LIMIT)),
            targets: self.blended_targets(),
            ..RecommendationParams::default()
        };

        let mut collected = TrackAccumulator::default();
        collected.extend(self.provider.recommendations(&params)?);
        let mut tracks = collected.into_tracks();
        tracks.truncate(count as usize);

        Ok(GeneratedPlaylist {
            kind: PlaylistKind::Blend {
                artists: found.into_iter().map(|artist| artist.name).collect(),
            },
            tracks,
        })
    }

    fn find_artists(&self, names: &[String]) -> Result<Vec<Artist>> {
        let mut found = Vec::new();
        for name in names {
            match self.provider.search(name, SearchKind::Artist, 1)?.artists.into_iter().next() {
                Some(artist) => found.push(artist),
                None => log::warn!("no artist found for '{name}'"),
            }
        }
        Ok(found)
    }

    /// Halfway between the listener's averages and the neutral point
    fn blended_targets(&self) -> AudioTargets {
        let midpoint = |average: f64| {
            if self.profile.is_empty() {
                BLEND_NEUTRAL
            } else {
                (average + BLEND_NEUTRAL) / 2.0
            }
        };
        let averages = self.profile.avg_features;

        AudioTargets {
            energy: Some(midpoint(averages.energy)),
            valence: Some(midpoint(averages.valence)),
            danceability: Some(midpoint(averages.danceability)),
            ..AudioTargets::NONE
        }
    }
}

/// Up to three genres per artist, deduplicated, in artist order
fn collect_genres(artists: &[Artist]) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for genre in artists
        .iter()
        .flat_map(|artist| artist.genres.iter().take(GENRES_PER_ARTIST))
    {
        if !genres.contains(genre) {
            genres.push(genre.clone());
        }
    }
    genres
}

/// Blend genres that relate to one of the listener's genres by substring, either way round
pub fn overlapping_genres<'p>(
    user_genres: impl Iterator<Item = &'p str>,
    blend_genres: &[String],
) -> Vec<String> {
    let user_genres: Vec<&str> = user_genres.collect();
    blend_genres
        .iter()
        .filter(|genre| {
            user_genres
                .iter()
                .any(|user| user.contains(genre.as_str()) || genre.contains(user))
        })
        .cloned()
        .collect()
}

/// Shared genres first, then the rest of the blend genres, limited to valid seeds
pub fn choose_genre_seeds(overlap: &[String], blend_genres: &[String], allowed: &[String]) -> Vec<String> {
    let mut seeds: Vec<String> = Vec::new();
    for genre in overlap.iter().chain(blend_genres) {
        if seeds.len() == MAX_GENRE_SEEDS {
            break;
        }
        if allowed.contains(genre) && !seeds.contains(genre) {
            seeds.push(genre.clone());
        }
    }
    seeds
}
