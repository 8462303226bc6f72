use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

mod client;
mod config;
mod error;
mod intent;
mod models;
mod playlist;
mod profile;
mod provider;

#[cfg(test)]
mod strategy_tests;

use crate::client::SpotifyClient;
use crate::config::load_config;
use crate::intent::{Activity, Mood, TimeOfDay};
use crate::playlist::utils::format_duration_ms;
use crate::playlist::{
    BlendRequest, DeepDiveRequest, GenerationRequest, PlaylistDraft, PlaylistFinalizer,
    PlaylistGenerator, PlaylistOptions, StandardRequest, TimeMachineRequest,
};
use crate::profile::{HistoryAggregator, TasteProfile, TasteProfileBuilder};

#[derive(Parser)]
#[command(name = "taste-playlist-generator")]
#[command(about = "Builds playlists from your listening history and what you're in the mood for")]
#[command(version)]
struct Cli {
    /// Enable debug mode - print the playlist instead of creating it
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Quiet mode - reduce output verbosity
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    /// Seed the random generator for reproducible picks
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Make the created playlist public
    #[arg(long, global = true)]
    public: bool,

    /// Playlist name, replaces the generated one
    #[arg(long, global = true)]
    name: Option<String>,

    /// Playlist description, replaces the generated one
    #[arg(long, global = true)]
    description: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Playlist from a mood, activity, time of day and/or free-text vibe
    Generate {
        #[command(flatten)]
        intent: IntentArgs,

        /// Anchor on an artist or track ("artist:NAME", "track:NAME" or a bare artist name)
        #[arg(long)]
        based_on: Option<String>,

        /// Favour lesser-known tracks
        #[arg(long)]
        discover: bool,
    },
    /// Lesser-known tracks close to your taste
    Discover {
        #[command(flatten)]
        intent: IntentArgs,
    },
    /// Blend your taste with one or more artists
    Blend {
        #[arg(required = true)]
        artists: Vec<String>,

        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
    /// Hits from a year, or from your high school years
    TimeMachine {
        #[arg(long)]
        year: Option<u32>,

        #[arg(long)]
        birth_year: Option<u32>,

        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
    /// Explore one genre, deep cuts by default
    DeepDive {
        genre: String,

        /// The genre's most popular tracks instead of deep cuts
        #[arg(long)]
        popular: bool,

        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
    /// Print your taste profile
    Profile {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct IntentArgs {
    #[arg(long, value_enum)]
    mood: Option<Mood>,

    #[arg(long, value_enum)]
    activity: Option<Activity>,

    #[arg(long = "time", value_enum)]
    time_of_day: Option<TimeOfDay>,

    /// Free-text description, e.g. "rainy sunday morning coffee"
    #[arg(long)]
    vibe: Option<String>,

    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Target length in minutes, overrides --count
    #[arg(long = "duration")]
    duration_minutes: Option<u32>,
}

impl IntentArgs {
    fn into_request(self, based_on: Option<String>, discover: bool) -> StandardRequest {
        StandardRequest {
            mood: self.mood,
            activity: self.activity,
            time_of_day: self.time_of_day,
            vibe: self.vibe,
            based_on,
            discover,
            count: self.count,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// Progress lines for the terminal, silenced by `--quiet`
struct Output {
    quiet: bool,
}

impl Output {
    fn line(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{message}");
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let out = Output { quiet: cli.quiet };

    // Load configuration from .env
    let config = load_config()?;
    if config.refresh_credentials().is_none() {
        log::debug!("no refresh credentials, an expired access token will be fatal");
    }
    let client = SpotifyClient::new(config);

    out.line("Analyzing your listening history...");
    let history = HistoryAggregator::collect(&client)?;
    let profile = TasteProfileBuilder::build(&history);
    out.line(format!(
        "✓ Profile built from {} tracks ({} genres)",
        profile.tracks_analyzed,
        profile.top_genres.len()
    ));

    let request = match cli.command {
        Command::Profile { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_profile(&profile);
            }
            return Ok(());
        }
        Command::Generate {
            intent,
            based_on,
            discover,
        } => GenerationRequest::Standard(intent.into_request(based_on, discover)),
        Command::Discover { intent } => {
            GenerationRequest::Discovery(intent.into_request(None, true))
        }
        Command::Blend { artists, count } => {
            GenerationRequest::Blend(BlendRequest { artists, count })
        }
        Command::TimeMachine {
            year,
            birth_year,
            count,
        } => GenerationRequest::TimeMachine(TimeMachineRequest {
            year,
            birth_year,
            count,
        }),
        Command::DeepDive {
            genre,
            popular,
            count,
        } => GenerationRequest::DeepDive(DeepDiveRequest {
            genre,
            count,
            popular,
        }),
    };

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    out.line("\nGenerating playlist...");
    let generated = PlaylistGenerator::new(&client, &profile, rng).generate(&request)?;

    let options = PlaylistOptions {
        name: cli.name,
        description: cli.description,
        public: cli.public,
    };
    let draft = PlaylistFinalizer::draft(generated, &options);

    out.line(format!("\n{}", draft.name));
    out.line("=".repeat(draft.name.chars().count()));
    out.line(format!(
        "   Tracks: {} | Duration: {}",
        draft.tracks.len(),
        format_duration_ms(draft.total_duration_ms())
    ));

    if draft.tracks.is_empty() {
        eprintln!("✗ No tracks found for this request - nothing to create.");
        return Err(anyhow::anyhow!("Playlist generation returned no tracks"));
    }

    if cli.debug {
        println!("\n🔍 DEBUG MODE: '{}' (would create via API)", draft.name);
        print_tracks(&draft);
        return Ok(());
    }

    out.line(format!("\n🎵 Creating playlist '{}'...", draft.name));
    match PlaylistFinalizer::publish(&client, &draft) {
        Ok(created) => {
            out.line(format!(
                "✓ Created '{}' with {} tracks ({})",
                created.name,
                draft.tracks.len(),
                created.uri
            ));
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Failed to create playlist '{}': {e}", draft.name);
            Err(e)
        }
    }
}

fn print_tracks(draft: &PlaylistDraft) {
    println!("   {}", draft.description);
    for (i, track) in draft.tracks.iter().enumerate() {
        let artists: Vec<&str> = track.artists.iter().map(|a| a.name.as_str()).collect();
        let year = track
            .album
            .as_ref()
            .and_then(|album| album.release_date.as_deref())
            .and_then(|date| date.get(..4))
            .map(|year| format!(" [{year}]"))
            .unwrap_or_default();
        println!(
            "     {}. \"{}\" by {}{} {} | Pop: {}",
            i + 1,
            track.name,
            artists.join(", "),
            year,
            format_duration_ms(track.duration_ms),
            track.popularity
        );
    }
}

fn print_profile(profile: &TasteProfile) {
    println!("\n=== TASTE PROFILE ===");
    println!("Tracks analyzed: {}", profile.tracks_analyzed);

    if !profile.top_genres.is_empty() {
        let genres: Vec<String> = profile
            .top_genres
            .iter()
            .take(10)
            .map(|g| format!("{} ({})", g.genre, g.weight))
            .collect();
        println!("\n📊 Top Genres: {}", genres.join(", "));
    }

    if !profile.top_artist_names.is_empty() {
        println!("🎤 Top Artists: {}", profile.top_artist_names.join(", "));
    }

    if profile.is_empty() {
        println!("\nNo audio features available - averages skipped.");
        return;
    }

    let avg = &profile.avg_features;
    println!("\nAverages:");
    println!(
        "   Danceability: {:.2} | Energy: {:.2} | Valence: {:.2}",
        avg.danceability, avg.energy, avg.valence
    );
    println!(
        "   Acousticness: {:.2} | Instrumentalness: {:.2}",
        avg.acousticness, avg.instrumentalness
    );
    println!("   Tempo: {:.0} BPM | Loudness: {:.1} dB", avg.tempo, avg.loudness);

    let ranges = &profile.feature_ranges;
    println!("\nRanges:");
    println!(
        "   Danceability: {:.2}-{:.2} | Energy: {:.2}-{:.2}",
        ranges.danceability.min, ranges.danceability.max, ranges.energy.min, ranges.energy.max
    );
    println!(
        "   Valence: {:.2}-{:.2} | Tempo: {:.0}-{:.0} BPM",
        ranges.valence.min, ranges.valence.max, ranges.tempo.min, ranges.tempo.max
    );

    let patterns = &profile.listening_patterns;
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    println!("\nPatterns:");
    println!(
        "   Major key: {} | High energy: {} | Acoustic: {}",
        yes_no(patterns.prefers_major_key),
        yes_no(patterns.prefers_high_energy),
        yes_no(patterns.prefers_acoustic)
    );
    println!("   Average popularity: {:.0}", patterns.average_popularity);
}
