//! In-memory library for tests and demos.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::TrackLookup;
use crate::error::{Error, Result};
use crate::model::{Track, TrackId};
use crate::player::{ContextKind, NavigationContext};

/// Library held in memory, with an optional artificial lookup delay.
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    tracks: RwLock<HashMap<TrackId, Arc<Track>>>,
    playlists: RwLock<HashMap<i64, Vec<TrackId>>>,
    lookup_delay: Duration,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library whose lookups each take `delay` (simulates a slow store).
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            lookup_delay: delay,
            ..Self::default()
        }
    }

    /// Add or replace a track.
    pub fn insert(&self, track: Track) -> Arc<Track> {
        let track = Arc::new(track);
        self.tracks.write().insert(track.id, track.clone());
        track
    }

    pub fn remove(&self, id: TrackId) -> Option<Arc<Track>> {
        self.tracks.write().remove(&id)
    }

    /// Register a playlist by its ordered track IDs.
    pub fn add_playlist(&self, playlist_id: i64, track_ids: Vec<TrackId>) {
        self.playlists.write().insert(playlist_id, track_ids);
    }

    pub fn len(&self) -> usize {
        self.tracks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.read().is_empty()
    }

    /// Tracks uploaded by one user, ordered by ID.
    pub fn tracks_by_uploader(&self, uploader_id: i64) -> Vec<Arc<Track>> {
        let mut tracks: Vec<_> = self
            .tracks
            .read()
            .values()
            .filter(|t| t.uploader_id == Some(uploader_id))
            .cloned()
            .collect();
        tracks.sort_by_key(|t| t.id);
        tracks
    }

    fn lookup_ids(&self, ids: &[TrackId]) -> Vec<Arc<Track>> {
        let tracks = self.tracks.read();
        ids.iter().filter_map(|id| tracks.get(id).cloned()).collect()
    }

    async fn simulate_latency(&self) {
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }
    }
}

#[async_trait]
impl TrackLookup for MemoryLibrary {
    async fn resolve_track(&self, id: TrackId) -> Result<Arc<Track>> {
        self.simulate_latency().await;
        let track = self.tracks.read().get(&id).cloned();
        track.ok_or(Error::TrackNotFound(id))
    }

    async fn resolve_context_tracks(&self, context: &NavigationContext) -> Result<Vec<Arc<Track>>> {
        self.simulate_latency().await;

        match (context.kind(), context.source_id()) {
            (ContextKind::Playlist, Some(playlist_id)) => {
                let ids = self.playlists.read().get(&playlist_id).cloned();
                if let Some(ids) = ids {
                    return Ok(self.lookup_ids(&ids));
                }
            }
            (ContextKind::Artist, Some(uploader_id)) => {
                let tracks = self.tracks_by_uploader(uploader_id);
                if !tracks.is_empty() {
                    return Ok(tracks);
                }
            }
            _ => {}
        }

        Ok(self.lookup_ids(context.track_ids()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by(id: TrackId, uploader: i64) -> Track {
        Track {
            uploader_id: Some(uploader),
            ..Track::new(id, format!("Track {}", id), 1000)
        }
    }

    #[tokio::test]
    async fn test_resolve_track() {
        let library = MemoryLibrary::new();
        library.insert(Track::new(1, "One", 1000));

        assert_eq!(library.resolve_track(1).await.unwrap().title, "One");
        assert!(matches!(
            library.resolve_track(2).await,
            Err(Error::TrackNotFound(2))
        ));
    }

    #[tokio::test]
    async fn test_general_context_skips_missing() {
        let library = MemoryLibrary::new();
        library.insert(Track::new(1, "One", 1000));
        library.insert(Track::new(3, "Three", 1000));

        let ctx = NavigationContext::from_general("Mixed", vec![3, 2, 1], 0);
        let ids: Vec<_> = library
            .resolve_context_tracks(&ctx)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_playlist_context_uses_stored_order() {
        let library = MemoryLibrary::new();
        for id in 1..=3 {
            library.insert(Track::new(id, format!("T{}", id), 1000));
        }
        library.add_playlist(9, vec![2, 3, 1]);

        // Stale IDs on the context are ignored in favour of the stored playlist
        let ctx = NavigationContext::from_playlist(9, "Nine", vec![1], 0);
        let ids: Vec<_> = library
            .resolve_context_tracks(&ctx)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_artist_context_uses_uploader_catalog() {
        let library = MemoryLibrary::new();
        library.insert(by(5, 1));
        library.insert(by(2, 1));
        library.insert(by(3, 2));

        let ctx = NavigationContext::from_artist(1, "User 1", vec![], 0);
        let ids: Vec<_> = library
            .resolve_context_tracks(&ctx)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![2, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_delay() {
        let library = MemoryLibrary::with_delay(Duration::from_millis(250));
        library.insert(Track::new(1, "One", 1000));

        let start = tokio::time::Instant::now();
        library.resolve_track(1).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }
}
