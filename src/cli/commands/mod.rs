//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `library`: listing and seeding the SQLite library
//! - `play`: a simulated playback session driven by the engine
//! - `settings`: showing and initializing the config file

mod library;
mod play;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::db;
use crate::player::RepeatMode;

pub use library::{cmd_list, cmd_seed};
pub use play::{PlayArgs, cmd_play};
pub use settings::cmd_config;

/// Soundify playback engine CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List tracks and playlists in the library
    List {
        /// Database path (defaults to the configured library)
        #[arg(long, env = "SOUNDIFY_DB")]
        db: Option<PathBuf>,
    },
    /// Fill the library with a small demo catalog
    Seed {
        /// Database path (defaults to the configured library)
        #[arg(long, env = "SOUNDIFY_DB")]
        db: Option<PathBuf>,
    },
    /// Simulate a playback session
    Play {
        /// Play a stored playlist
        #[arg(long, conflicts_with_all = ["artist", "track", "search"])]
        playlist: Option<i64>,
        /// Play every upload of one user
        #[arg(long, conflicts_with_all = ["track", "search"])]
        artist: Option<i64>,
        /// Play an explicit list of track IDs
        #[arg(long = "track", num_args = 1.., conflicts_with = "search")]
        track: Vec<i64>,
        /// Play tracks whose title contains this text
        #[arg(long)]
        search: Option<String>,
        /// Position in the context to start from
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Start with shuffle enabled
        #[arg(long)]
        shuffle: bool,
        /// Repeat mode (defaults to the configured one)
        #[arg(long, value_enum)]
        repeat: Option<RepeatArg>,
        /// How long to run the session, in seconds
        #[arg(long, default_value_t = 30)]
        seconds: u64,
        /// Print each state snapshot as JSON
        #[arg(long)]
        json: bool,
        /// Database path (defaults to the configured library)
        #[arg(long, env = "SOUNDIFY_DB")]
        db: Option<PathBuf>,
    },
    /// Show the config file location and effective settings
    Config {
        /// Write the effective settings to the config file if it doesn't exist
        #[arg(long)]
        init: bool,
    },
}

/// Repeat mode as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RepeatArg {
    Off,
    All,
    One,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::One => RepeatMode::One,
        }
    }
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = crate::config::load();

    match &cli.command {
        Commands::List { db } => cmd_list(&rt, &config, db.as_deref()),
        Commands::Seed { db } => cmd_seed(&rt, &config, db.as_deref()),
        Commands::Play {
            playlist,
            artist,
            track,
            search,
            start,
            shuffle,
            repeat,
            seconds,
            json,
            db,
        } => cmd_play(
            &rt,
            &config,
            PlayArgs {
                playlist: *playlist,
                artist: *artist,
                track_ids: track.clone(),
                search: search.clone(),
                start: *start,
                shuffle: *shuffle,
                repeat: repeat.map(RepeatMode::from),
                seconds: *seconds,
                json: *json,
                db: db.clone(),
            },
        ),
        Commands::Config { init } => cmd_config(&rt, &config, *init),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Open the library database: explicit path, then config, then the default file.
pub(crate) async fn open_db(config: &Config, db_path: Option<&Path>) -> anyhow::Result<SqlitePool> {
    let path = db_path.or(config.library.database.as_deref());
    let url = db::db_url(path);
    tracing::debug!(target: "cli", url = %url, "Opening library");
    let pool = db::init_db(&url).await?;
    Ok(pool)
}
