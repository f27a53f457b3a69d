//! Core data models read from the library store.
//!
//! Defines [`Track`] and [`Playlist`]. These are derived from SQLx for
//! database mapping and are read-only to the playback engine.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `tracks` - Uploaded songs with optional duration
//! - `playlists` - Named playlists with an owner
//! - `playlist_tracks` - Ordered playlist membership

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Identifier of a track in the library store.
pub type TrackId = i64;

/// A track (uploaded song) in the library.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Track {
    /// Database ID (auto-generated)
    pub id: TrackId,
    /// Track title
    pub title: String,
    /// Uploading user (the "artist" of a social upload)
    pub uploader_id: Option<i64>,
    /// Cached display name of the uploader
    pub uploader_name: Option<String>,
    /// Genre tag
    pub genre: Option<String>,
    /// Duration in milliseconds (unknown until loaded)
    pub duration_ms: Option<i64>,
    /// Location of the audio payload
    pub audio_url: Option<String>,
}

impl Track {
    /// Create a track with only an id, title and duration.
    pub fn new(id: TrackId, title: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            id,
            title: title.into(),
            uploader_id: None,
            uploader_name: None,
            genre: None,
            duration_ms: Some(duration_ms),
            audio_url: None,
        }
    }

    /// Known duration, if the store has one.
    pub fn known_duration_ms(&self) -> Option<u64> {
        self.duration_ms
            .and_then(|d| u64::try_from(d).ok())
            .filter(|d| *d > 0)
    }

    /// Display artist.
    pub fn display_artist(&self) -> &str {
        self.uploader_name.as_deref().unwrap_or("Unknown Artist")
    }
}

/// A playlist in the library.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Playlist {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Playlist name
    pub name: String,
    /// Owning user
    pub owner_id: Option<i64>,
}
