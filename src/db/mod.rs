//! Database module for the track and playlist library.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Provides async operations for:
//! - Track insertion and lookup
//! - Playlists with ordered membership
//! - Uploader catalogs (the "artist" context)
//!
//! # Example
//!
//! ```ignore
//! use soundify_engine::db::{init_db, get_playlist_tracks};
//!
//! let pool = init_db("sqlite:soundify.db").await?;
//! let tracks = get_playlist_tracks(&pool, 1).await?;
//! ```

use crate::model::{Playlist, Track};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "soundify.db";

const TRACK_COLUMNS: &str = "id, title, uploader_id, uploader_name, genre, duration_ms, audio_url";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Fields for a track that hasn't been stored yet.
#[derive(Debug, Clone, Default)]
pub struct NewTrack {
    pub title: String,
    pub uploader_id: Option<i64>,
    pub uploader_name: Option<String>,
    pub genre: Option<String>,
    /// Duration in milliseconds, if known
    pub duration_ms: Option<i64>,
    pub audio_url: Option<String>,
}

impl NewTrack {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Insert a track and return its new ID.
pub async fn insert_track(pool: &SqlitePool, track: &NewTrack) -> sqlx::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO tracks (title, uploader_id, uploader_name, genre, duration_ms, audio_url)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&track.title)
    .bind(track.uploader_id)
    .bind(&track.uploader_name)
    .bind(&track.genre)
    .bind(track.duration_ms)
    .bind(&track.audio_url)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get all tracks, ordered by ID.
pub async fn get_all_tracks(pool: &SqlitePool) -> sqlx::Result<Vec<Track>> {
    sqlx::query_as::<_, Track>(&format!("SELECT {TRACK_COLUMNS} FROM tracks ORDER BY id"))
        .fetch_all(pool)
        .await
}

/// Get a track by its database ID.
pub async fn get_track_by_id(pool: &SqlitePool, track_id: i64) -> sqlx::Result<Option<Track>> {
    sqlx::query_as::<_, Track>(&format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?"))
        .bind(track_id)
        .fetch_optional(pool)
        .await
}

/// Get every track uploaded by one user, oldest first.
pub async fn get_tracks_by_uploader(
    pool: &SqlitePool,
    uploader_id: i64,
) -> sqlx::Result<Vec<Track>> {
    sqlx::query_as::<_, Track>(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE uploader_id = ? ORDER BY id"
    ))
    .bind(uploader_id)
    .fetch_all(pool)
    .await
}

/// Create an empty playlist and return its ID.
pub async fn create_playlist(
    pool: &SqlitePool,
    name: &str,
    owner_id: Option<i64>,
) -> sqlx::Result<i64> {
    let result = sqlx::query("INSERT INTO playlists (name, owner_id) VALUES (?, ?)")
        .bind(name)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Append a track to the end of a playlist.
///
/// Adding a track that is already in the playlist is a no-op.
pub async fn add_to_playlist(
    pool: &SqlitePool,
    playlist_id: i64,
    track_id: i64,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO playlist_tracks (playlist_id, track_id, position)
        SELECT ?, ?, COALESCE(MAX(position) + 1, 0)
        FROM playlist_tracks WHERE playlist_id = ?
        "#,
    )
    .bind(playlist_id)
    .bind(track_id)
    .bind(playlist_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_playlist(pool: &SqlitePool, playlist_id: i64) -> sqlx::Result<Option<Playlist>> {
    sqlx::query_as::<_, Playlist>("SELECT id, name, owner_id FROM playlists WHERE id = ?")
        .bind(playlist_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_all_playlists(pool: &SqlitePool) -> sqlx::Result<Vec<Playlist>> {
    sqlx::query_as::<_, Playlist>("SELECT id, name, owner_id FROM playlists ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Tracks of a playlist in playlist order.
pub async fn get_playlist_tracks(pool: &SqlitePool, playlist_id: i64) -> sqlx::Result<Vec<Track>> {
    sqlx::query_as::<_, Track>(
        r#"
        SELECT t.id, t.title, t.uploader_id, t.uploader_name, t.genre, t.duration_ms, t.audio_url
        FROM playlist_tracks pt
        JOIN tracks t ON t.id = pt.track_id
        WHERE pt.playlist_id = ?
        ORDER BY pt.position
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await
}

/// Track IDs of a playlist in playlist order.
pub async fn get_playlist_track_ids(pool: &SqlitePool, playlist_id: i64) -> sqlx::Result<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT track_id FROM playlist_tracks WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_db;

    fn uploaded(title: &str, uploader_id: i64, duration_ms: i64) -> NewTrack {
        NewTrack {
            uploader_id: Some(uploader_id),
            uploader_name: Some(format!("User {}", uploader_id)),
            duration_ms: Some(duration_ms),
            ..NewTrack::new(title)
        }
    }

    #[tokio::test]
    async fn test_init_db_creates_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = db_url(Some(&db_path));

        let pool = init_db(&db_url).await.expect("Failed to init db");
        assert!(db_path.exists());

        let tracks = get_all_tracks(&pool).await.expect("Failed to query tracks");
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_db_url_default() {
        assert_eq!(db_url(None), "sqlite:soundify.db");
    }

    #[tokio::test]
    async fn test_track_insertion_and_lookup() {
        let (pool, _dir) = temp_db().await;

        let id = insert_track(&pool, &uploaded("Song", 7, 185_000)).await.unwrap();
        assert!(id > 0);

        let track = get_track_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(track.title, "Song");
        assert_eq!(track.uploader_id, Some(7));
        assert_eq!(track.known_duration_ms(), Some(185_000));

        assert!(get_track_by_id(&pool, id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tracks_by_uploader() {
        let (pool, _dir) = temp_db().await;
        let a = insert_track(&pool, &uploaded("A", 1, 1000)).await.unwrap();
        insert_track(&pool, &uploaded("B", 2, 1000)).await.unwrap();
        let c = insert_track(&pool, &uploaded("C", 1, 1000)).await.unwrap();

        let ids: Vec<_> = get_tracks_by_uploader(&pool, 1)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[tokio::test]
    async fn test_playlist_keeps_insertion_order() {
        let (pool, _dir) = temp_db().await;
        let a = insert_track(&pool, &NewTrack::new("A")).await.unwrap();
        let b = insert_track(&pool, &NewTrack::new("B")).await.unwrap();
        let c = insert_track(&pool, &NewTrack::new("C")).await.unwrap();

        let playlist = create_playlist(&pool, "Road Trip", Some(1)).await.unwrap();
        add_to_playlist(&pool, playlist, c).await.unwrap();
        add_to_playlist(&pool, playlist, a).await.unwrap();
        add_to_playlist(&pool, playlist, b).await.unwrap();
        // Duplicate is ignored
        add_to_playlist(&pool, playlist, a).await.unwrap();

        assert_eq!(get_playlist_track_ids(&pool, playlist).await.unwrap(), vec![c, a, b]);

        let titles: Vec<_> = get_playlist_tracks(&pool, playlist)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["C", "A", "B"]);

        let stored = get_playlist(&pool, playlist).await.unwrap().unwrap();
        assert_eq!(stored.name, "Road Trip");
        assert_eq!(get_all_playlists(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_playlist_is_empty() {
        let (pool, _dir) = temp_db().await;
        assert!(get_playlist(&pool, 42).await.unwrap().is_none());
        assert!(get_playlist_track_ids(&pool, 42).await.unwrap().is_empty());
    }
}
