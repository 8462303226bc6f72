use anyhow::Result;
use rand::Rng;

use super::generator::{GeneratedPlaylist, PlaylistGenerator, TrackAccumulator, resolve_count};
use super::PlaylistKind;
use crate::error::ResolutionError;
use crate::intent::{AudioTargets, MAX_RECOMMENDATION_LIMIT, RecommendationParams};
use crate::models::Track;

const DEEP_CUT_MAX_POPULARITY: u32 = 40;
/// Candidates at or above this popularity are not deep cuts
const DEEP_CUT_POPULARITY_CEILING: u32 = 50;
const SUPPLEMENTAL_MAX_POPULARITY: u32 = 50;
const POPULAR_MIN_POPULARITY: u32 = 50;
const GENRE_HINT_COUNT: usize = 10;
const MIN_FUZZY_TOKEN_LEN: usize = 3;

/// Explore one genre, by default its lesser-known corners
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeepDiveRequest {
    pub genre: String,
    pub count: Option<u32>,
    pub popular: bool,
}

/// Match a free-form genre name against the catalog's genre seeds.
///
/// Tries an exact match, then substring containment either way, then any
/// shared token after splitting on hyphens and spaces.
pub fn resolve_genre(requested: &str, allowed: &[String]) -> Option<String> {
    let wanted = requested.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    if let Some(genre) = allowed.iter().find(|genre| **genre == wanted) {
        return Some(genre.clone());
    }

    if let Some(genre) = allowed
        .iter()
        .find(|genre| genre.contains(wanted.as_str()) || wanted.contains(genre.as_str()))
    {
        return Some(genre.clone());
    }

    let wanted_tokens = tokens(&wanted);
    allowed
        .iter()
        .find(|genre| {
            tokens(genre).iter().any(|token| {
                wanted_tokens
                    .iter()
                    .any(|part| part.contains(token) || token.contains(part))
            })
        })
        .cloned()
}

fn tokens(genre: &str) -> Vec<&str> {
    genre
        .split(['-', ' '])
        .filter(|token| token.len() >= MIN_FUZZY_TOKEN_LEN)
        .collect()
}

impl<R: Rng> PlaylistGenerator<'_, R> {
    pub fn deep_dive(&mut self, request: &DeepDiveRequest) -> Result<GeneratedPlaylist> {
        let allowed = self.provider.available_genre_seeds()?;
        let genre = resolve_genre(&request.genre, &allowed).ok_or_else(|| {
            ResolutionError::GenreNotFound {
                requested: request.genre.clone(),
                available: allowed.iter().take(GENRE_HINT_COUNT).cloned().collect(),
            }
        })?;
        log::info!("deep dive into '{genre}' (requested '{}')", request.genre);

        let count = resolve_count(request.count);
        let tracks = if request.popular {
            self.genre_essentials(&genre, count)?
        } else {
            self.genre_deep_cuts(&genre, count)?
        };

        Ok(GeneratedPlaylist {
            kind: PlaylistKind::DeepDive {
                genre,
                deep_cuts: !request.popular,
            },
            tracks,
        })
    }

    fn genre_deep_cuts(&mut self, genre: &str, count: u32) -> Result<Vec<Track>> {
        let averages = self.profile.avg_features;
        let targets = if self.profile.is_empty() {
            AudioTargets::NONE
        } else {
            AudioTargets {
                energy: Some(averages.energy),
                valence: Some(averages.valence),
                ..AudioTargets::NONE
            }
        };

        let params = RecommendationParams {
            seed_genres: vec![genre.to_string()],
            seed_artists: self.profile.top_artist_ids.iter().take(1).cloned().collect(),
            limit: Some(MAX_RECOMMENDATION_LIMIT),
            max_popularity: Some(DEEP_CUT_MAX_POPULARITY),
            targets,
            ..RecommendationParams::default()
        };

        let mut candidates: Vec<_> = self
            .provider
            .recommendations(&params)?
            .into_iter()
            .filter(|track| track.popularity < DEEP_CUT_POPULARITY_CEILING)
            .collect();
        candidates.sort_by_key(|track| track.popularity);

        let mut collected = TrackAccumulator::default();
        collected.extend(candidates);

        if collected.len() < count as usize {
            let relaxed = RecommendationParams {
                seed_genres: vec![genre.to_string()],
                limit: Some(MAX_RECOMMENDATION_LIMIT),
                max_popularity: Some(SUPPLEMENTAL_MAX_POPULARITY),
                ..RecommendationParams::default()
            };
            let added = collected.extend(self.provider.recommendations(&relaxed)?);
            log::debug!("deep dive supplemental fetch added {added} tracks");
        }

        let mut tracks = collected.into_tracks();
        tracks.truncate(count as usize);
        Ok(tracks)
    }

    fn genre_essentials(&mut self, genre: &str, count: u32) -> Result<Vec<Track>> {
        let params = RecommendationParams {
            seed_genres: vec![genre.to_string()],
            limit: Some(count.min(MAX_RECOMMENDATION_LIMIT)),
            min_popularity: Some(POPULAR_MIN_POPULARITY),
            ..RecommendationParams::default()
        };

        let mut collected = TrackAccumulator::default();
        collected.extend(self.provider.recommendations(&params)?);
        let mut tracks = collected.into_tracks();
        tracks.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        tracks.truncate(count as usize);
        Ok(tracks)
    }
}
