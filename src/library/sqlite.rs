//! Library backed by the SQLite store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{TrackLookup, resolve_each};
use crate::db;
use crate::error::{Error, Result, ResultExt};
use crate::model::{Track, TrackId};
use crate::player::{ContextKind, NavigationContext};

/// [`TrackLookup`] over the `tracks` and `playlist_tracks` tables.
#[derive(Debug, Clone)]
pub struct SqliteLibrary {
    pool: SqlitePool,
    lookup_delay: Duration,
}

impl SqliteLibrary {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            lookup_delay: Duration::ZERO,
        }
    }

    /// Add artificial latency to every context resolution.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TrackLookup for SqliteLibrary {
    async fn resolve_track(&self, id: TrackId) -> Result<Arc<Track>> {
        db::get_track_by_id(&self.pool, id)
            .await
            .with_context(format!("loading track {}", id))?
            .map(Arc::new)
            .ok_or(Error::TrackNotFound(id))
    }

    async fn resolve_context_tracks(&self, context: &NavigationContext) -> Result<Vec<Arc<Track>>> {
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }

        let stored = match (context.kind(), context.source_id()) {
            (ContextKind::Playlist, Some(playlist_id)) => db::get_playlist_tracks(&self.pool, playlist_id)
                .await
                .with_context(format!("loading playlist {}", playlist_id))?,
            (ContextKind::Artist, Some(uploader_id)) => db::get_tracks_by_uploader(&self.pool, uploader_id)
                .await
                .with_context(format!("loading uploads of user {}", uploader_id))?,
            _ => Vec::new(),
        };

        if !stored.is_empty() {
            tracing::debug!(
                target: "library",
                tracks = stored.len(),
                "Resolved \"{}\" from store",
                context.label()
            );
            return Ok(stored.into_iter().map(Arc::new).collect());
        }

        Ok(resolve_each(self, context.track_ids()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewTrack, add_to_playlist, create_playlist, insert_track};
    use crate::test_utils::temp_db;

    #[tokio::test]
    async fn test_resolve_track_from_store() {
        let (pool, _dir) = temp_db().await;
        let id = insert_track(&pool, &NewTrack::new("Stored")).await.unwrap();
        let library = SqliteLibrary::new(pool);

        assert_eq!(library.resolve_track(id).await.unwrap().title, "Stored");
        assert!(matches!(
            library.resolve_track(id + 1).await,
            Err(Error::TrackNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_playlist_context_in_playlist_order() {
        let (pool, _dir) = temp_db().await;
        let a = insert_track(&pool, &NewTrack::new("A")).await.unwrap();
        let b = insert_track(&pool, &NewTrack::new("B")).await.unwrap();
        let playlist = create_playlist(&pool, "Mine", None).await.unwrap();
        add_to_playlist(&pool, playlist, b).await.unwrap();
        add_to_playlist(&pool, playlist, a).await.unwrap();

        let library = SqliteLibrary::new(pool);
        let ctx = NavigationContext::from_playlist(playlist, "Mine", vec![], 0);
        let ids: Vec<_> = library
            .resolve_context_tracks(&ctx)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn test_search_context_resolves_ids() {
        let (pool, _dir) = temp_db().await;
        let a = insert_track(&pool, &NewTrack::new("Alpha")).await.unwrap();
        let library = SqliteLibrary::new(pool);

        let ctx = NavigationContext::from_search("alp", vec![a, 999], 0);
        let tracks = library.resolve_context_tracks(&ctx).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "Alpha");
    }
}
