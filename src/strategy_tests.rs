// End-to-end strategy runs against a mocked catalog
// Covers seeding, target shaping and the bounded fetch loops of each mode

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::ResolutionError;
use crate::intent::{Mood, RecommendationParams};
use crate::models::{Artist, SearchKind, SearchResults, Track};
use crate::playlist::{
    BlendRequest, DeepDiveRequest, GenerationRequest, PlaylistGenerator, PlaylistKind,
    StandardRequest, Theme, TimeMachineRequest,
};
use crate::profile::{FeatureAverages, GenreWeight, TasteProfile};
use crate::provider::MockMusicProvider;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn track(id: &str, popularity: u32, duration_ms: u64) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {id}"),
            uri: format!("spotify:track:{id}"),
            popularity,
            duration_ms,
            ..Track::default()
        }
    }

    fn tracks(prefix: &str, n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| track(&format!("{prefix}{i}"), 50, 200_000))
            .collect()
    }

    fn profile() -> TasteProfile {
        TasteProfile {
            top_genres: vec![
                GenreWeight {
                    genre: "indie rock".to_string(),
                    weight: 12,
                },
                GenreWeight {
                    genre: "rock".to_string(),
                    weight: 7,
                },
            ],
            avg_features: FeatureAverages {
                danceability: 0.6,
                energy: 0.4,
                valence: 0.8,
                acousticness: 0.3,
                instrumentalness: 0.1,
                tempo: 118.0,
                loudness: -7.0,
            },
            top_artist_ids: vec!["a1".into(), "a2".into(), "a3".into()],
            top_artist_names: vec!["One".into(), "Two".into(), "Three".into()],
            top_track_ids: vec!["t1".into(), "t2".into(), "t3".into()],
            tracks_analyzed: 10,
            ..TasteProfile::default()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn artist(id: &str, name: &str, genres: &[&str]) -> Artist {
        Artist {
            id: id.to_string(),
            name: name.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            popularity: 60,
        }
    }

    #[test]
    fn test_duration_fill_stops_after_one_empty_round() {
        let repeated = tracks("r", 5);
        let mut provider = MockMusicProvider::new();
        provider
            .expect_recommendations()
            .times(2)
            .returning(move |_| Ok(repeated.clone()));

        let profile = profile();
        let request = StandardRequest {
            duration_minutes: Some(60),
            ..StandardRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .generate(&GenerationRequest::Standard(request))
            .unwrap();

        assert_eq!(generated.tracks.len(), 5);
    }

    #[test]
    fn test_duration_fill_caps_at_one_hundred_tracks() {
        // every round brings 20 unseen tracks; 10 hours would need 180 of them
        let mut round = 0;
        let mut provider = MockMusicProvider::new();
        provider
            .expect_recommendations()
            .times(5)
            .returning(move |_| {
                round += 1;
                Ok(tracks(&format!("round{round}-"), 20))
            });

        let profile = profile();
        let request = StandardRequest {
            duration_minutes: Some(600),
            ..StandardRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .standard(&request)
            .unwrap();

        assert_eq!(generated.tracks.len(), 100);
    }

    #[test]
    fn test_duration_fill_sizes_first_query_and_trims() {
        // 30 minutes at 3.5 minutes per track -> 9 requested
        let mut provider = MockMusicProvider::new();
        provider
            .expect_recommendations()
            .withf(|params| params.limit == Some(9))
            .times(1)
            .returning(|_| Ok(tracks("d", 12)));

        let profile = profile();
        let request = StandardRequest {
            duration_minutes: Some(30),
            ..StandardRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .standard(&request)
            .unwrap();

        // 200 s tracks: nine reach 30 minutes exactly
        assert_eq!(generated.tracks.len(), 9);
    }

    #[test]
    fn test_standard_seeds_from_profile_and_applies_mood() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.seed_artists.len() == 2
                    && params.seed_tracks.len() == 2
                    && params.seed_artists.iter().all(|id| id.starts_with('a'))
                    && params.seed_tracks.iter().all(|id| id.starts_with('t'))
                    && params.seed_genres.is_empty()
                    && params.limit == Some(10)
                    && params.targets.energy == Some(0.7)
                    && params.targets.valence == Some(0.8)
                    && params.targets.danceability == Some(0.7)
                    && params.max_popularity.is_none()
            })
            .times(1)
            .returning(|_| Ok(tracks("s", 15)));

        let profile = profile();
        let request = StandardRequest {
            mood: Some(Mood::Happy),
            count: Some(10),
            ..StandardRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .standard(&request)
            .unwrap();

        assert_eq!(generated.tracks.len(), 10);
        assert_eq!(
            generated.kind,
            PlaylistKind::Standard {
                theme: Theme::Mood(Mood::Happy)
            }
        );
    }

    #[test]
    fn test_vibe_targets_are_completed_from_profile_averages() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.targets.energy == Some(0.3)
                    && params.targets.valence == Some(0.7)
                    && params.targets.acousticness == Some(0.4)
                    && params.targets.danceability == Some(0.6)
            })
            .times(1)
            .returning(|_| Ok(tracks("v", 30)));

        let profile = profile();
        let request = StandardRequest {
            vibe: Some("chill sunday morning coffee".to_string()),
            ..StandardRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .standard(&request)
            .unwrap();

        assert_eq!(generated.tracks.len(), 30);
        assert_eq!(
            generated.kind,
            PlaylistKind::Standard {
                theme: Theme::Vibe("chill sunday morning coffee".to_string())
            }
        );
    }

    #[test]
    fn test_empty_profile_leaves_targets_untouched() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.targets.is_empty() && !params.has_seeds()
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let profile = TasteProfile::default();
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .standard(&StandardRequest::default())
            .unwrap();

        assert!(generated.tracks.is_empty());
        assert_eq!(generated.kind, PlaylistKind::Standard { theme: Theme::Mix });
    }

    #[test]
    fn test_discovery_caps_popularity_and_adds_profile_genre() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_available_genre_seeds()
            .times(1)
            .returning(|| Ok(vec!["pop".to_string(), "rock".to_string()]));
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.max_popularity == Some(50)
                    && params.seed_genres == ["rock"]
                    && params.seed_artists.len() == 1
                    && params.seed_tracks.len() == 1
            })
            .times(1)
            .returning(|_| Ok(tracks("x", 30)));

        let profile = profile();
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .generate(&GenerationRequest::Discovery(StandardRequest::default()))
            .unwrap();

        assert_eq!(generated.kind, PlaylistKind::Discovery);
    }

    #[test]
    fn test_based_on_artist_becomes_the_only_seed() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_search()
            .withf(|query, kind, _| query == "Portishead" && *kind == SearchKind::Artist)
            .times(1)
            .returning(|_, _, _| {
                Ok(SearchResults {
                    artists: vec![artist("ar9", "Portishead", &["trip hop"])],
                    tracks: Vec::new(),
                })
            });
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.seed_artists == ["ar9"] && params.seed_tracks.is_empty()
            })
            .times(1)
            .returning(|_| Ok(tracks("b", 30)));

        let profile = profile();
        // a bare name is looked up as an artist
        let request = StandardRequest {
            based_on: Some("Portishead".to_string()),
            ..StandardRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .standard(&request)
            .unwrap();

        assert_eq!(
            generated.kind,
            PlaylistKind::Standard {
                theme: Theme::BasedOn("Portishead".to_string())
            }
        );
    }

    #[test]
    fn test_unmatched_based_on_falls_back_to_profile_seeds() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_search()
            .withf(|query, kind, _| query == "Nobody Famous" && *kind == SearchKind::Track)
            .returning(|_, _, _| Ok(SearchResults::default()));
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.seed_artists.len() == 2 && params.seed_tracks.len() == 2
            })
            .times(1)
            .returning(|_| Ok(tracks("f", 30)));

        let profile = profile();
        let request = StandardRequest {
            based_on: Some("track:Nobody Famous".to_string()),
            ..StandardRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .standard(&request)
            .unwrap();

        assert_eq!(generated.kind, PlaylistKind::Standard { theme: Theme::Mix });
    }

    #[test]
    fn test_blend_fails_when_no_artist_resolves() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_search()
            .returning(|_, _, _| Ok(SearchResults::default()));
        provider.expect_recommendations().never();

        let profile = profile();
        let request = BlendRequest {
            artists: vec!["Nobody".to_string(), "Also Nobody".to_string()],
            count: None,
        };
        let err = PlaylistGenerator::new(&provider, &profile, rng())
            .blend(&request)
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ResolutionError>(),
            Some(&ResolutionError::ArtistsNotFound(vec![
                "Nobody".to_string(),
                "Also Nobody".to_string()
            ]))
        );
    }

    #[test]
    fn test_blend_seeds_targets_and_shared_genres() {
        let mut provider = MockMusicProvider::new();
        provider.expect_search().returning(|query, _, _| {
            let found = match query {
                "Slowdive" => vec![artist("sd", "Slowdive", &["rock", "shoegaze"])],
                "Beach House" => vec![artist("bh", "Beach House", &["dream pop"])],
                _ => Vec::new(),
            };
            Ok(SearchResults {
                artists: found,
                tracks: Vec::new(),
            })
        });
        provider.expect_available_genre_seeds().returning(|| {
            Ok(vec![
                "rock".to_string(),
                "shoegaze".to_string(),
                "dream-pop".to_string(),
            ])
        });
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.seed_artists == ["sd", "bh", "a1"]
                    && params.seed_genres == ["rock", "shoegaze"]
                    && params.limit == Some(20)
            })
            .times(1)
            .returning(|params| {
                assert_relative_eq!(params.targets.energy.unwrap(), 0.5);
                assert_relative_eq!(params.targets.valence.unwrap(), 0.7);
                assert_relative_eq!(params.targets.danceability.unwrap(), 0.6);
                Ok(tracks("bl", 25))
            });

        let profile = profile();
        let request = BlendRequest {
            artists: vec![
                "Slowdive".to_string(),
                "Unknown Band".to_string(),
                "Beach House".to_string(),
            ],
            count: Some(20),
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .blend(&request)
            .unwrap();

        assert_eq!(generated.tracks.len(), 20);
        assert_eq!(
            generated.kind,
            PlaylistKind::Blend {
                artists: vec!["Slowdive".to_string(), "Beach House".to_string()]
            }
        );
    }

    #[test]
    fn test_blend_with_empty_profile_targets_neutral_point() {
        let mut provider = MockMusicProvider::new();
        provider.expect_search().returning(|_, _, _| {
            Ok(SearchResults {
                artists: vec![artist("x", "X", &[])],
                tracks: Vec::new(),
            })
        });
        provider
            .expect_available_genre_seeds()
            .returning(|| Ok(Vec::new()));
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.seed_artists == ["x"]
                    && params.seed_genres.is_empty()
                    && params.targets.energy == Some(0.6)
                    && params.targets.valence == Some(0.6)
                    && params.targets.danceability == Some(0.6)
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let profile = TasteProfile::default();
        let request = BlendRequest {
            artists: vec!["X".to_string()],
            count: None,
        };
        assert!(
            PlaylistGenerator::new(&provider, &profile, rng())
                .blend(&request)
                .is_ok()
        );
    }

    #[test]
    fn test_time_machine_spreads_across_high_school_years() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_tracks_by_year()
            .withf(|year, limit| (1995..=1999).contains(year) && *limit == 22)
            .times(5)
            .returning(|year, limit| {
                // same chart-topper every year, only the first year may keep it
                let mut found = vec![track("evergreen", 100, 200_000)];
                found.extend((0..limit).map(|i| track(&format!("{year}-{i}"), i, 200_000)));
                Ok(found)
            });

        let profile = profile();
        let request = TimeMachineRequest {
            birth_year: Some(1981),
            count: Some(10),
            ..TimeMachineRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .time_machine_at(&request, 2026)
            .unwrap();

        assert_eq!(generated.tracks.len(), 10);
        let evergreen = generated
            .tracks
            .iter()
            .filter(|t| t.id == "evergreen")
            .count();
        assert_eq!(evergreen, 1);
        for year in 1996..=1999 {
            let from_year = generated
                .tracks
                .iter()
                .filter(|t| t.id.starts_with(&year.to_string()))
                .count();
            assert_eq!(from_year, 2, "year {year}");
        }
        assert_eq!(
            generated.kind,
            PlaylistKind::TimeMachine {
                first_year: 1995,
                last_year: 1999,
                from_birth_year: true
            }
        );
    }

    #[test]
    fn test_time_machine_single_year_takes_most_popular() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_tracks_by_year()
            .withf(|year, limit| *year == 1987 && *limit == 23)
            .times(1)
            .returning(|_, limit| {
                Ok((0..limit)
                    .map(|i| track(&format!("y{i}"), i, 200_000))
                    .collect())
            });

        let profile = profile();
        let request = TimeMachineRequest {
            year: Some(1987),
            count: Some(3),
            ..TimeMachineRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .time_machine_at(&request, 2026)
            .unwrap();

        let mut ids: Vec<&str> = generated.tracks.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["y20", "y21", "y22"]);
    }

    #[test]
    fn test_time_machine_huge_count_saturates_fetch_limit() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_tracks_by_year()
            .withf(|year, limit| *year == 2001 && *limit == u32::MAX)
            .times(1)
            .returning(|_, _| Ok(tracks("h", 4)));

        let profile = profile();
        let request = TimeMachineRequest {
            year: Some(2001),
            count: Some(u32::MAX),
            ..TimeMachineRequest::default()
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .time_machine_at(&request, 2026)
            .unwrap();

        assert_eq!(generated.tracks.len(), 4);
    }

    #[test]
    fn test_time_machine_rejects_ancient_birth_year() {
        let mut provider = MockMusicProvider::new();
        provider.expect_tracks_by_year().never();

        let profile = profile();
        let request = TimeMachineRequest {
            birth_year: Some(1800),
            ..TimeMachineRequest::default()
        };
        let err = PlaylistGenerator::new(&provider, &profile, rng())
            .generate(&GenerationRequest::TimeMachine(request))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ResolutionError>(),
            Some(ResolutionError::NoValidYears { .. })
        ));
    }

    #[test]
    fn test_deep_cuts_filter_sort_and_supplement() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_available_genre_seeds()
            .returning(|| Ok(vec!["soul".to_string(), "synth-pop".to_string()]));
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.max_popularity == Some(40)
                    && params.seed_genres == ["synth-pop"]
                    && params.seed_artists == ["a1"]
                    && params.limit == Some(100)
                    && params.targets.energy == Some(0.4)
                    && params.targets.valence == Some(0.8)
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    track("p45", 45, 200_000),
                    track("p10", 10, 200_000),
                    track("p60", 60, 200_000),
                    track("p30", 30, 200_000),
                ])
            });
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.max_popularity == Some(50)
                    && params.seed_artists.is_empty()
                    && params.targets.is_empty()
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    track("p10", 10, 200_000),
                    track("s20", 20, 200_000),
                    track("s5", 5, 200_000),
                ])
            });

        let profile = profile();
        let request = DeepDiveRequest {
            genre: "synthwave".to_string(),
            count: Some(5),
            popular: false,
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .deep_dive(&request)
            .unwrap();

        let ids: Vec<&str> = generated.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["p10", "p30", "p45", "s20", "s5"]);
        assert_eq!(
            generated.kind,
            PlaylistKind::DeepDive {
                genre: "synth-pop".to_string(),
                deep_cuts: true
            }
        );
    }

    #[test]
    fn test_deep_cuts_skip_supplement_when_enough() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_available_genre_seeds()
            .returning(|| Ok(vec!["jazz".to_string()]));
        provider
            .expect_recommendations()
            .times(1)
            .returning(|_| {
                Ok((0..10)
                    .map(|i| track(&format!("j{i}"), 40 - i, 200_000))
                    .collect())
            });

        let profile = profile();
        let request = DeepDiveRequest {
            genre: "jazz".to_string(),
            count: Some(4),
            popular: false,
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .deep_dive(&request)
            .unwrap();

        let popularity: Vec<u32> = generated.tracks.iter().map(|t| t.popularity).collect();
        assert_eq!(popularity, vec![31, 32, 33, 34]);
    }

    #[test]
    fn test_essentials_sorted_most_popular_first() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_available_genre_seeds()
            .returning(|| Ok(vec!["house".to_string()]));
        provider
            .expect_recommendations()
            .withf(|params: &RecommendationParams| {
                params.min_popularity == Some(50) && params.limit == Some(3)
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    track("h1", 55, 200_000),
                    track("h2", 90, 200_000),
                    track("h3", 70, 200_000),
                ])
            });

        let profile = profile();
        let request = DeepDiveRequest {
            genre: "House".to_string(),
            count: Some(3),
            popular: true,
        };
        let generated = PlaylistGenerator::new(&provider, &profile, rng())
            .deep_dive(&request)
            .unwrap();

        let ids: Vec<&str> = generated.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["h2", "h3", "h1"]);
        assert_eq!(
            generated.kind,
            PlaylistKind::DeepDive {
                genre: "house".to_string(),
                deep_cuts: false
            }
        );
    }

    #[test]
    fn test_unknown_genre_lists_ten_available() {
        let mut provider = MockMusicProvider::new();
        provider.expect_available_genre_seeds().returning(|| {
            Ok((0..15).map(|i| format!("genre{i}")).collect())
        });
        provider.expect_recommendations().never();

        let profile = profile();
        let request = DeepDiveRequest {
            genre: "vaporwave".to_string(),
            ..DeepDiveRequest::default()
        };
        let err = PlaylistGenerator::new(&provider, &profile, rng())
            .deep_dive(&request)
            .unwrap_err();

        match err.downcast_ref::<ResolutionError>() {
            Some(ResolutionError::GenreNotFound {
                requested,
                available,
            }) => {
                assert_eq!(requested, "vaporwave");
                assert_eq!(available.len(), 10);
                assert_eq!(available[0], "genre0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
