use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use log::{error, info};

mod auth;
mod client;
mod config;
mod error;
mod models;
mod playlist;


use crate::auth::{FileTokenStore, StaticToken, TokenSupply};
use crate::client::{CatalogService, SearchKind, SearchQuery, SpotifyClient};
use crate::config::{Config, load_config};
use crate::error::PlaylistError;
use crate::models::ResolvedTrack;
use crate::playlist::utils::render_curve;
use crate::playlist::{
    ActivityLevel, GeneratedPlaylist, GenerationRequest, PlaylistAssembler, PlaylistDraft,
    PlaylistGenerator, ProgressionShape, SeedItem, SeedKind, SeedRequest, generate_slots,
    validate_duration,
};

#[derive(Parser)]
#[command(name = "tempo-playlist")]
#[command(about = "Tempo-progression workout playlists for Spotify")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug mode - print playlist details to stdout instead of saving
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Quiet mode - reduce output verbosity
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the Spotify sign-in URL (PKCE)
    Authorize,
    /// Finish sign-in with the code or the full redirect URL
    Login {
        /// Authorization code, or the URL Spotify redirected to
        code: String,
    },
    /// Forget the stored access token
    Logout,
    /// Show the signed-in Spotify user
    Whoami,
    /// Search artists and tracks to use as seeds
    Search {
        query: String,
        /// Only search this kind (repeatable); both by default
        #[arg(long = "kind", value_enum)]
        kinds: Vec<KindArg>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Show the tempo plan for a workout without contacting Spotify
    Slots {
        #[command(flatten)]
        workout: WorkoutArgs,
        /// Print the slots as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a tempo-progression playlist from recommendations
    Generate {
        #[command(flatten)]
        workout: WorkoutArgs,
        /// Artist seed id or URI (up to 5)
        #[arg(short = 'a', long = "artist")]
        artists: Vec<String>,
        /// Track seed id or URI (up to 5)
        #[arg(short = 't', long = "track")]
        tracks: Vec<String>,
        /// Playlist name (defaults to a name derived from the workout)
        #[arg(long)]
        name: Option<String>,
    },
    /// Build a plain playlist from the seeds' tracks
    Seeds {
        /// Artist seed as ID=Name; the name is what gets searched
        #[arg(short = 'a', long = "artist")]
        artists: Vec<String>,
        /// Track seed id or URI
        #[arg(short = 't', long = "track")]
        tracks: Vec<String>,
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(clap::Args)]
struct WorkoutArgs {
    /// Workout length in minutes (5-180)
    #[arg(short = 'm', long = "minutes")]
    duration_minutes: f64,
    #[arg(long, value_enum, default_value = "high")]
    activity: ActivityLevel,
    #[arg(long, value_enum, default_value = "linear")]
    progression: ProgressionShape,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum KindArg {
    Artist,
    Track,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args) {
        error!("{e:#}");
        if let Some(playlist_error) = e.downcast_ref::<PlaylistError>() {
            if playlist_error.needs_sign_in() {
                eprintln!("Run `tempo-playlist authorize` and then `tempo-playlist login <code>`.");
            }
        }
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config()?;

    match args.command {
        Command::Authorize => authorize(&config),
        Command::Login { code } => login(&config, &code),
        Command::Logout => {
            let store = FileTokenStore::new(&config.token_file);
            if store.clear()? {
                println!("✓ Signed out ({} removed)", store.path().display());
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }
        Command::Whoami => {
            let client = spotify_client(&config);
            let user = client.current_user()?;
            println!(
                "{} ({}) | market: {}",
                user.display_name.as_deref().unwrap_or(&user.id),
                user.email.as_deref().unwrap_or("no email"),
                user.country.as_deref().unwrap_or("unknown")
            );
            Ok(())
        }
        Command::Search {
            query,
            kinds,
            limit,
        } => search(&config, query, kinds, limit),
        Command::Slots { workout, json } => {
            validate_duration(workout.duration_minutes)?;
            let profile = workout.activity.profile();
            let slots = generate_slots(workout.duration_minutes, &profile, workout.progression);
            if json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else {
                println!(
                    "{} · {} · {} tracks ({}-{} BPM)",
                    profile.label,
                    workout.progression.label(),
                    slots.len(),
                    profile.bpm_min,
                    profile.bpm_max
                );
                for line in render_curve(&slots) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        Command::Generate {
            workout,
            artists,
            tracks,
            name,
        } => {
            let request = GenerationRequest {
                duration_minutes: workout.duration_minutes,
                activity: workout.activity,
                progression: workout.progression,
                seed_artists: artists,
                seed_tracks: tracks,
            };
            let client = spotify_client(&config);
            let generator = PlaylistGenerator::new(&client, config.default_market.as_str());
            println!("Requesting one recommendation per tempo slot...");
            let playlist = generator.generate_workout(&request)?;
            finish(&client, playlist, name, args.debug)
        }
        Command::Seeds {
            artists,
            tracks,
            name,
        } => {
            let request = SeedRequest {
                seed_artists: artists
                    .iter()
                    .map(|raw| SeedItem::parse(raw, SeedKind::Artist))
                    .collect(),
                seed_tracks: tracks,
            };
            let client = spotify_client(&config);
            let generator = PlaylistGenerator::new(&client, config.default_market.as_str());
            let playlist = generator.generate_from_seeds(&request)?;
            finish(&client, playlist, name, args.debug)
        }
    }
}

fn spotify_client(config: &Config) -> SpotifyClient {
    let tokens: Box<dyn TokenSupply> = match &config.access_token {
        Some(token) => Box::new(StaticToken(Some(token.clone()))),
        None => Box::new(FileTokenStore::new(&config.token_file)),
    };
    SpotifyClient::new(config, tokens)
}

fn authorize(config: &Config) -> Result<()> {
    let (client_id, _) = config.client_credentials()?;
    let store = FileTokenStore::new(&config.token_file);

    let verifier = auth::generate_code_verifier();
    store.save_verifier(&verifier)?;
    let url = auth::build_authorize_url(
        &config.accounts_base_url,
        client_id,
        &config.redirect_uri,
        &auth::code_challenge(&verifier),
    );

    println!("Open this URL in your browser and approve access:\n\n{url}\n");
    println!(
        "Then run `tempo-playlist login <URL>` with the address you were redirected to ({}...).",
        config.redirect_uri
    );
    Ok(())
}

fn login(config: &Config, input: &str) -> Result<()> {
    let (client_id, client_secret) = config.client_credentials()?;
    let store = FileTokenStore::new(&config.token_file);

    let code = auth::extract_code(input)?;
    let verifier = store
        .take_verifier()?
        .ok_or_else(|| anyhow!("No pending sign-in. Run `tempo-playlist authorize` first."))?;

    let client = spotify_client(config);
    let token = auth::exchange_code_for_token(
        client.agent(),
        &config.accounts_base_url,
        client_id,
        client_secret,
        &config.redirect_uri,
        &code,
        &verifier,
    )
    .context("Sign-in failed")?;
    store.save(&token)?;

    println!("✓ Signed in");
    Ok(())
}

fn search(config: &Config, query: String, kinds: Vec<KindArg>, limit: u32) -> Result<()> {
    if query.trim().is_empty() {
        return Err(PlaylistError::validation("search query is empty").into());
    }
    let kinds = if kinds.is_empty() {
        vec![SearchKind::Artist, SearchKind::Track]
    } else {
        kinds
            .into_iter()
            .map(|kind| match kind {
                KindArg::Artist => SearchKind::Artist,
                KindArg::Track => SearchKind::Track,
            })
            .collect()
    };

    let client = spotify_client(config);
    let results = client.search(&SearchQuery {
        query,
        kinds,
        limit,
        market: None,
    })?;

    if !results.artists.is_empty() {
        println!("Artists:");
        for artist in &results.artists {
            println!("  {}  (--artist '{}={}')", artist.name, artist.id, artist.name);
        }
    }
    if !results.tracks.is_empty() {
        println!("Tracks:");
        for track in &results.tracks {
            println!(
                "  \"{}\" by {}  (--track {})",
                track.name,
                track.artist_display(),
                track.id
            );
        }
    }
    if results.artists.is_empty() && results.tracks.is_empty() {
        println!("No results.");
    }
    Ok(())
}

/// Print the playlist, then save it unless running in debug mode
fn finish(
    client: &SpotifyClient,
    playlist: GeneratedPlaylist,
    name: Option<String>,
    debug: bool,
) -> Result<()> {
    let name = name.unwrap_or_else(|| playlist.name.clone());
    print_playlist(&name, &playlist);

    if debug {
        println!("\n🔍 DEBUG MODE: playlist '{name}' not saved");
        return Ok(());
    }

    info!("Saving playlist '{name}' with {} tracks", playlist.tracks.len());
    let draft = PlaylistDraft {
        name: name.clone(),
        description: playlist.description.clone(),
    };
    let created = PlaylistAssembler::new(client).assemble(&draft, &playlist.tracks)?;
    println!("\n✓ Saved playlist '{}': {}", name, created.url);
    Ok(())
}

fn print_playlist(name: &str, playlist: &GeneratedPlaylist) {
    println!("\n{name}");
    println!("{}", "=".repeat(name.chars().count()));

    let metadata = &playlist.metadata;
    println!(
        "Tracks: {} | Duration: {} | Unique Artists: {}",
        metadata.total_tracks,
        metadata.duration_display(),
        metadata.artist_count
    );
    if let (Some((low, high)), Some(avg)) = (metadata.bpm_range, metadata.average_target_bpm) {
        println!("BPM Range: {low}-{high} | Avg Target BPM: {avg:.1}");
    }

    for (i, track) in playlist.tracks.iter().enumerate() {
        let tempo = playlist
            .slots
            .get(i)
            .map(|slot| format!(" [{} BPM, {}-{}]", slot.target_bpm, slot.min_bpm, slot.max_bpm))
            .unwrap_or_default();
        println!("{:>4}. {}{}", i + 1, describe(track), tempo);
    }
}

fn describe(track: &ResolvedTrack) -> String {
    let secs = track.duration_ms / 1000;
    format!(
        "\"{}\" by {} {}:{:02}",
        track.name,
        track.artist_display(),
        secs / 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments_parse() {
        let args = Args::try_parse_from([
            "tempo-playlist",
            "generate",
            "--minutes",
            "45",
            "--activity",
            "yoga",
            "--progression",
            "hiit",
            "-a",
            "spotify:artist:abc",
            "--debug",
        ])
        .unwrap();
        assert!(args.debug);
        match args.command {
            Command::Generate {
                workout, artists, ..
            } => {
                assert_eq!(workout.duration_minutes, 45.0);
                assert_eq!(workout.activity, ActivityLevel::Relaxed);
                assert_eq!(workout.progression, ProgressionShape::Interval);
                assert_eq!(artists, vec!["spotify:artist:abc".to_string()]);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_slots_defaults() {
        let args = Args::try_parse_from(["tempo-playlist", "slots", "-m", "30"]).unwrap();
        match args.command {
            Command::Slots { workout, json } => {
                assert!(!json);
                assert_eq!(workout.activity, ActivityLevel::High);
                assert_eq!(workout.progression, ProgressionShape::Linear);
            }
            _ => panic!("expected slots"),
        }
    }
}
