//! Simulated playback session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use sqlx::SqlitePool;
use tokio::runtime::Runtime;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::open_db;
use crate::config::Config;
use crate::db;
use crate::library::SqliteLibrary;
use crate::model::Track;
use crate::player::{
    CurrentPlaybackState, NavigationContext, PlaybackEngine, PlaybackEvent, PlaybackPhase,
    QueueSummary, RepeatMode, TokioClock,
};

/// Options for [`cmd_play`].
#[derive(Debug, Clone, Default)]
pub struct PlayArgs {
    pub playlist: Option<i64>,
    pub artist: Option<i64>,
    pub track_ids: Vec<i64>,
    pub search: Option<String>,
    pub start: usize,
    pub shuffle: bool,
    pub repeat: Option<RepeatMode>,
    pub seconds: u64,
    pub json: bool,
    pub db: Option<PathBuf>,
}

/// Run the engine against the library for a fixed time, printing state
pub fn cmd_play(rt: &Runtime, config: &Config, args: PlayArgs) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_db(config, args.db.as_deref()).await?;
        let (target, context) = build_context(&pool, &args).await?;

        let mut playback = config.playback.clone();
        if let Some(mode) = args.repeat {
            playback.default_repeat = mode;
        }
        playback.shuffle_on_start |= args.shuffle;

        let library = Arc::new(
            SqliteLibrary::new(pool)
                .with_delay(Duration::from_millis(config.library.lookup_delay_ms)),
        );
        let clock = Arc::new(TokioClock::new(playback.fallback_duration_ms));
        let engine = PlaybackEngine::spawn(library, clock, playback);
        let mut events = engine.subscribe_events();

        println!("{} \"{}\"", context.action_text(), context.label());
        engine
            .play_song_with_context(&target, context)
            .await
            .context("starting playback")?;

        let deadline = tokio::time::sleep(Duration::from_secs(args.seconds));
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(deadline, interrupt);

        let mut summary = engine.queue_summary();
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = &mut interrupt => {
                    println!("Interrupted");
                    break;
                }
                event = events.recv() => match event {
                    Ok(PlaybackEvent::StateChanged(state)) => {
                        print_state(&state, &summary, args.json)?;
                        if state.phase == PlaybackPhase::Stopped {
                            println!("Queue finished");
                            break;
                        }
                    }
                    Ok(PlaybackEvent::QueueChanged(next)) => summary = next,
                    Ok(PlaybackEvent::Error(message)) => eprintln!("Playback error: {}", message),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "cli", skipped, "Event feed lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        let stats = engine.ticker_stats();
        info!(target: "cli", tickers = stats.started, "Session ended");
        engine.shutdown().await?;
        Ok(())
    })
}

/// Pick the context and the track to start from.
async fn build_context(
    pool: &SqlitePool,
    args: &PlayArgs,
) -> anyhow::Result<(Track, NavigationContext)> {
    let context = if let Some(playlist_id) = args.playlist {
        let playlist = db::get_playlist(pool, playlist_id)
            .await?
            .ok_or_else(|| anyhow!("Playlist {} not found", playlist_id))?;
        let ids = db::get_playlist_track_ids(pool, playlist_id).await?;
        NavigationContext::from_playlist(playlist_id, playlist.name, ids, args.start)
    } else if let Some(uploader_id) = args.artist {
        let tracks = db::get_tracks_by_uploader(pool, uploader_id).await?;
        let name = tracks
            .first()
            .map(|t| t.display_artist().to_string())
            .unwrap_or_else(|| format!("User {}", uploader_id));
        let ids = tracks.iter().map(|t| t.id).collect();
        NavigationContext::from_artist(uploader_id, name, ids, args.start)
    } else if let Some(query) = &args.search {
        let needle = query.to_lowercase();
        let ids = db::get_all_tracks(pool)
            .await?
            .into_iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .map(|t| t.id)
            .collect();
        NavigationContext::from_search(query.clone(), ids, args.start)
    } else if !args.track_ids.is_empty() {
        NavigationContext::from_general("Selected tracks", args.track_ids.clone(), args.start)
    } else {
        let ids = db::get_all_tracks(pool)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        NavigationContext::from_general("All tracks", ids, args.start)
    };

    if context.is_empty() {
        bail!("Nothing to play in \"{}\"", context.label());
    }
    let Some(target_id) = context.current_track_id() else {
        bail!(
            "Start position {} is past the end of \"{}\" ({} tracks)",
            args.start,
            context.label(),
            context.len()
        );
    };
    let target = db::get_track_by_id(pool, target_id)
        .await?
        .ok_or_else(|| anyhow!("Track {} not found", target_id))?;
    Ok((target, context))
}

fn print_state(
    state: &CurrentPlaybackState,
    summary: &QueueSummary,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(state)?);
        return Ok(());
    }

    let Some(track) = &state.current_track else {
        println!("[{:?}]", state.phase);
        return Ok(());
    };
    let mut line = format!(
        "[{:<7}] {} / {}  {} - {}",
        format!("{:?}", state.phase),
        state.position_str(),
        state.duration_str(),
        track.title,
        track.display_artist()
    );
    let position = summary.position_text();
    if !position.is_empty() {
        line.push_str(&format!("  ({})", position));
    }
    if let Some(error) = &state.last_error {
        line.push_str(&format!("  error: {}", error));
    }
    println!("{}", line);
    Ok(())
}
