//! Track lookup collaborators used by the playback engine.
//!
//! The engine never touches storage directly. It asks a [`TrackLookup`]
//! to turn track IDs and navigation contexts into [`Track`]s, on the
//! caller's task and before any engine state changes.

mod memory;
mod sqlite;

pub use memory::MemoryLibrary;
pub use sqlite::SqliteLibrary;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Track, TrackId};
use crate::player::NavigationContext;

/// Resolves track identities into full track records.
#[async_trait]
pub trait TrackLookup: Send + Sync {
    /// Look up a single track.
    async fn resolve_track(&self, id: TrackId) -> Result<Arc<Track>>;

    /// Resolve every track of a context, in context order.
    ///
    /// Tracks that fail to resolve are skipped. An empty result is not an
    /// error here; the engine decides what an empty context means.
    async fn resolve_context_tracks(&self, context: &NavigationContext) -> Result<Vec<Arc<Track>>> {
        Ok(resolve_each(self, context.track_ids()).await)
    }
}

/// Resolve IDs one at a time, logging and skipping failures.
pub async fn resolve_each<L>(lookup: &L, ids: &[TrackId]) -> Vec<Arc<Track>>
where
    L: TrackLookup + ?Sized,
{
    let mut tracks = Vec::with_capacity(ids.len());
    for &id in ids {
        match lookup.resolve_track(id).await {
            Ok(track) => tracks.push(track),
            Err(e) => {
                tracing::warn!(target: "library", track_id = id, "Skipping track: {}", e);
            }
        }
    }
    tracks
}
