//! Library listing and seeding commands.

use std::path::Path;
use tokio::runtime::Runtime;
use tracing::info;

use super::open_db;
use crate::config::Config;
use crate::db::{self, NewTrack};
use crate::player::format_duration_ms;

/// Demo uploads: (title, uploader id, uploader name, genre, seconds).
const DEMO_TRACKS: &[(&str, i64, &str, &str, i64)] = &[
    ("Harbor Lights", 1, "Mara Quill", "ambient", 12),
    ("Low Tide", 1, "Mara Quill", "ambient", 9),
    ("Salt & Static", 1, "Mara Quill", "ambient", 15),
    ("Concrete Bloom", 2, "Dex Ortega", "hip-hop", 8),
    ("Night Bus", 2, "Dex Ortega", "hip-hop", 11),
    ("Paper Kites", 3, "The Understudies", "indie", 10),
    ("Second Act", 3, "The Understudies", "indie", 7),
    ("Curtain Call", 3, "The Understudies", "indie", 13),
];

/// List all tracks and playlists in the database
pub fn cmd_list(rt: &Runtime, config: &Config, db_path: Option<&Path>) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_db(config, db_path).await?;

        let tracks = db::get_all_tracks(&pool).await?;
        if tracks.is_empty() {
            println!("Library is empty. Run `soundify-engine seed` to add demo tracks.");
            return Ok(());
        }

        println!("Tracks:");
        for track in &tracks {
            let duration = track
                .known_duration_ms()
                .map(format_duration_ms)
                .unwrap_or_else(|| "?:??".to_string());
            println!(
                "  {:>4}  {:<24} {:<20} {}",
                track.id,
                track.title,
                track.display_artist(),
                duration
            );
        }

        let playlists = db::get_all_playlists(&pool).await?;
        if !playlists.is_empty() {
            println!("\nPlaylists:");
            for playlist in playlists {
                let ids = db::get_playlist_track_ids(&pool, playlist.id).await?;
                println!("  {:>4}  {} ({} tracks)", playlist.id, playlist.name, ids.len());
            }
        }
        Ok(())
    })
}

/// Insert the demo catalog and two playlists
pub fn cmd_seed(rt: &Runtime, config: &Config, db_path: Option<&Path>) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_db(config, db_path).await?;

        let mut ids = Vec::with_capacity(DEMO_TRACKS.len());
        for &(title, uploader_id, uploader_name, genre, seconds) in DEMO_TRACKS {
            let track = NewTrack {
                uploader_id: Some(uploader_id),
                uploader_name: Some(uploader_name.to_string()),
                genre: Some(genre.to_string()),
                duration_ms: Some(seconds * 1000),
                ..NewTrack::new(title)
            };
            ids.push(db::insert_track(&pool, &track).await?);
        }

        let mixtape = db::create_playlist(&pool, "Late Night Mixtape", Some(1)).await?;
        for &index in &[4, 1, 6, 0] {
            db::add_to_playlist(&pool, mixtape, ids[index]).await?;
        }
        let everything = db::create_playlist(&pool, "Everything", None).await?;
        for &id in &ids {
            db::add_to_playlist(&pool, everything, id).await?;
        }

        info!(target: "cli", tracks = ids.len(), "Seeded demo catalog");
        println!(
            "Added {} tracks and playlists {} (Late Night Mixtape) and {} (Everything).",
            ids.len(),
            mixtape,
            everything
        );
        Ok(())
    })
}
