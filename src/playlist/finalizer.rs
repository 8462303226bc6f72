use anyhow::Result;

use super::utils::{ToTitleCase, truncate_words};
use super::{GeneratedPlaylist, PlaylistKind, Theme};
use crate::models::{CreatedPlaylist, Track};
use crate::provider::MusicProvider;

const MAX_VIBE_NAME_CHARS: usize = 40;

/// Caller supplied overrides for the finished playlist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub public: bool,
}

/// A named playlist ready to be uploaded (or printed in debug mode)
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub tracks: Vec<Track>,
}

impl PlaylistDraft {
    pub fn uris(&self) -> Vec<String> {
        self.tracks.iter().map(|track| track.uri.clone()).collect()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().map(|track| track.duration_ms).sum()
    }
}

/// Names generated playlists and hands them to the catalog
pub struct PlaylistFinalizer;

impl PlaylistFinalizer {
    pub fn draft(generated: GeneratedPlaylist, options: &PlaylistOptions) -> PlaylistDraft {
        let name = options
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Self::default_name(&generated.kind));

        let base_description = options
            .description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Self::default_description(&generated.kind));

        PlaylistDraft {
            name,
            description: format!(
                "{base_description} · {}",
                track_count_label(generated.tracks.len())
            ),
            public: options.public,
            tracks: generated.tracks,
        }
    }

    pub fn default_name(kind: &PlaylistKind) -> String {
        match kind {
            PlaylistKind::Standard { theme } => match theme {
                Theme::BasedOn(name) => format!("Based on {name}"),
                Theme::Vibe(text) => format!("Vibe: {}", truncate_words(text, MAX_VIBE_NAME_CHARS)),
                Theme::Mood(mood) => format!("{} Mood", mood.label().to_title_case()),
                Theme::Activity(activity) => format!("{} Session", activity.label().to_title_case()),
                Theme::TimeOfDay(time) => format!("{} Mix", time.label().to_title_case()),
                Theme::Mix => "Your Mix".to_string(),
            },
            PlaylistKind::Discovery => "Discover Weekly Mix".to_string(),
            PlaylistKind::Blend { artists } => format!("Blend: You + {}", artists.join(" & ")),
            PlaylistKind::TimeMachine {
                first_year,
                last_year,
                from_birth_year,
            } => {
                if *from_birth_year {
                    format!("High School Hits ({first_year}-{last_year})")
                } else if first_year == last_year {
                    format!("Time Machine: {first_year}")
                } else {
                    format!("Time Machine: {first_year}-{last_year}")
                }
            }
            PlaylistKind::DeepDive { genre, deep_cuts } => {
                let genre = genre.to_title_case();
                if *deep_cuts {
                    format!("{genre} Deep Cuts")
                } else {
                    format!("{genre} Essentials")
                }
            }
        }
    }

    pub fn default_description(kind: &PlaylistKind) -> String {
        match kind {
            PlaylistKind::Standard { theme } => match theme {
                Theme::BasedOn(name) => format!("Recommendations seeded from {name}"),
                Theme::Vibe(text) => format!("Built from the vibe \"{}\"", text.trim()),
                Theme::Mood(mood) => format!("Tracks for a {} mood, tuned to your taste", mood.label()),
                Theme::Activity(activity) => {
                    format!("Your soundtrack for {}, tuned to your taste", activity.label())
                }
                Theme::TimeOfDay(time) => {
                    format!("Music for the {}, tuned to your taste", time.label())
                }
                Theme::Mix => "A mix built from your listening history".to_string(),
            },
            PlaylistKind::Discovery => {
                "Lesser-known tracks close to what you already love".to_string()
            }
            PlaylistKind::Blend { artists } => {
                format!("Your taste blended with {}", artists.join(", "))
            }
            PlaylistKind::TimeMachine {
                first_year,
                last_year,
                ..
            } => {
                if first_year == last_year {
                    format!("The biggest tracks of {first_year}")
                } else {
                    format!("The biggest tracks of {first_year}-{last_year}")
                }
            }
            PlaylistKind::DeepDive { genre, deep_cuts } => {
                if *deep_cuts {
                    format!("Hidden gems from {genre}, least popular first")
                } else {
                    format!("The most popular tracks in {genre}")
                }
            }
        }
    }

    /// Create the playlist for the current user and add every track. No rollback if adding fails.
    pub fn publish(provider: &dyn MusicProvider, draft: &PlaylistDraft) -> Result<CreatedPlaylist> {
        let owner = provider.current_user_id()?;
        let playlist = provider.create_playlist(&owner, &draft.name, &draft.description, draft.public)?;
        log::info!("created playlist '{}' ({})", playlist.name, playlist.id);

        let uris = draft.uris();
        if !uris.is_empty() {
            provider.add_tracks(&playlist.id, &uris)?;
        }
        Ok(playlist)
    }
}

fn track_count_label(count: usize) -> String {
    if count == 1 {
        "1 track".to_string()
    } else {
        format!("{count} tracks")
    }
}
