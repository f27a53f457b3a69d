//! Test utilities and fixtures for soundify-engine tests.
//!
//! This module provides common test helpers, mock factories, and
//! database utilities to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{mock_tracks, mock_library};
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_something() {
//!     let tracks = mock_tracks(3);
//!     let library = mock_library(&tracks);
//!     // ... test logic
//! }
//! ```

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::library::MemoryLibrary;
use crate::model::Track;
use crate::player::NavigationContext;

/// Creates a temporary database for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = crate::db::db_url(Some(&db_path));

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Creates a mock track with the given ID and duration.
pub fn mock_track(id: i64, duration_ms: i64) -> Arc<Track> {
    Arc::new(Track {
        uploader_id: Some(100),
        uploader_name: Some("Test Artist".to_string()),
        ..Track::new(id, format!("Track {}", id), duration_ms)
    })
}

/// Creates `n` mock tracks with IDs `1..=n`, three minutes each.
pub fn mock_tracks(n: usize) -> Vec<Arc<Track>> {
    (1..=n as i64).map(|id| mock_track(id, 180_000)).collect()
}

/// A general context over `tracks`, labelled "Test Context".
pub fn mock_context(tracks: &[Arc<Track>]) -> NavigationContext {
    NavigationContext::from_general("Test Context", tracks.iter().map(|t| t.id).collect(), 0)
}

/// An in-memory library holding `tracks`.
pub fn mock_library(tracks: &[Arc<Track>]) -> Arc<MemoryLibrary> {
    let library = MemoryLibrary::new();
    for track in tracks {
        library.insert((**track).clone());
    }
    Arc::new(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        let tracks = crate::db::get_all_tracks(&pool).await.unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_mock_tracks_ids_and_durations() {
        let tracks = mock_tracks(3);
        let ids: Vec<_> = tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(tracks[0].known_duration_ms(), Some(180_000));
        assert_eq!(tracks[2].title, "Track 3");
    }

    #[test]
    fn test_mock_context() {
        let ctx = mock_context(&mock_tracks(4));
        assert_eq!(ctx.label(), "Test Context");
        assert_eq!(ctx.track_ids(), &[1, 2, 3, 4]);
        assert_eq!(ctx.start_index(), 0);
    }

    #[test]
    fn test_mock_library_holds_tracks() {
        let library = mock_library(&mock_tracks(5));
        assert_eq!(library.len(), 5);
    }
}
