//! Navigation context: where a queue came from.

use serde::{Deserialize, Serialize};

use crate::model::TrackId;

/// Origin of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContextKind {
    /// A user playlist
    Playlist,
    /// An uploader's catalog
    Artist,
    /// A search result set
    Search,
    /// Home, browse, recommendations
    #[default]
    General,
}

impl ContextKind {
    /// Label for the "go back to source" action.
    pub fn action_text(self) -> &'static str {
        match self {
            ContextKind::Playlist => "View Playlist",
            ContextKind::Artist => "View Artist Profile",
            ContextKind::Search => "Back to Search Results",
            ContextKind::General => "Back to Browse",
        }
    }
}

/// Describes the origin of a queue and its ordered track ids.
///
/// Immutable once built. Installing a new context always produces a new
/// queue; the `moved_to_*` helpers return fresh contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationContext {
    kind: ContextKind,
    source_id: Option<i64>,
    track_ids: Vec<TrackId>,
    start_index: usize,
    search_query: Option<String>,
    label: String,
}

impl NavigationContext {
    /// Context for a playlist.
    pub fn from_playlist(
        playlist_id: i64,
        name: impl Into<String>,
        track_ids: Vec<TrackId>,
        start_index: usize,
    ) -> Self {
        Self {
            kind: ContextKind::Playlist,
            source_id: Some(playlist_id),
            track_ids,
            start_index,
            search_query: None,
            label: name.into(),
        }
    }

    /// Context for an uploader's catalog.
    pub fn from_artist(
        artist_id: i64,
        name: impl Into<String>,
        track_ids: Vec<TrackId>,
        start_index: usize,
    ) -> Self {
        Self {
            kind: ContextKind::Artist,
            source_id: Some(artist_id),
            track_ids,
            start_index,
            search_query: None,
            label: name.into(),
        }
    }

    /// Context for a search result set.
    pub fn from_search(query: impl Into<String>, track_ids: Vec<TrackId>, start_index: usize) -> Self {
        let query = query.into();
        Self {
            kind: ContextKind::Search,
            source_id: None,
            track_ids,
            start_index,
            label: format!("Search results: \"{}\"", query),
            search_query: Some(query),
        }
    }

    /// Context for general browsing.
    pub fn from_general(label: impl Into<String>, track_ids: Vec<TrackId>, start_index: usize) -> Self {
        Self {
            kind: ContextKind::General,
            source_id: None,
            track_ids,
            start_index,
            search_query: None,
            label: label.into(),
        }
    }

    /// Context holding exactly one track.
    pub fn single_track(track_id: TrackId, title: &str) -> Self {
        Self::from_general(format!("Single Song: {}", title), vec![track_id], 0)
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn source_id(&self) -> Option<i64> {
        self.source_id
    }

    pub fn track_ids(&self) -> &[TrackId] {
        &self.track_ids
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.track_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }

    /// Id at the starting offset, if in range.
    pub fn current_track_id(&self) -> Option<TrackId> {
        self.track_ids.get(self.start_index).copied()
    }

    pub fn has_previous(&self) -> bool {
        self.start_index > 0 && !self.track_ids.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.start_index + 1 < self.track_ids.len()
    }

    /// Id just before the starting offset.
    pub fn previous_track_id(&self) -> Option<TrackId> {
        if self.has_previous() {
            self.track_ids.get(self.start_index - 1).copied()
        } else {
            None
        }
    }

    /// Id just after the starting offset.
    pub fn next_track_id(&self) -> Option<TrackId> {
        if self.has_next() {
            self.track_ids.get(self.start_index + 1).copied()
        } else {
            None
        }
    }

    /// Human readable position, e.g. "3 of 10 songs".
    pub fn position_text(&self) -> String {
        if self.track_ids.is_empty() {
            String::new()
        } else {
            format!("{} of {} songs", self.start_index + 1, self.track_ids.len())
        }
    }

    /// Label for the "go back to source" action.
    pub fn action_text(&self) -> &'static str {
        self.kind.action_text()
    }

    /// A copy of this context starting one track later (or `self` at the end).
    pub fn moved_to_next(&self) -> Self {
        let mut moved = self.clone();
        if self.has_next() {
            moved.start_index += 1;
        }
        moved
    }

    /// A copy of this context starting one track earlier (or `self` at the start).
    pub fn moved_to_previous(&self) -> Self {
        let mut moved = self.clone();
        if self.has_previous() {
            moved.start_index -= 1;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_context_label() {
        let ctx = NavigationContext::from_search("lofi", vec![1, 2], 0);
        assert_eq!(ctx.kind(), ContextKind::Search);
        assert_eq!(ctx.label(), "Search results: \"lofi\"");
        assert_eq!(ctx.search_query(), Some("lofi"));
        assert_eq!(ctx.source_id(), None);
    }

    #[test]
    fn test_playlist_context_navigation() {
        let ctx = NavigationContext::from_playlist(7, "Road trip", vec![10, 11, 12], 1);
        assert_eq!(ctx.source_id(), Some(7));
        assert_eq!(ctx.current_track_id(), Some(11));
        assert_eq!(ctx.previous_track_id(), Some(10));
        assert_eq!(ctx.next_track_id(), Some(12));
        assert_eq!(ctx.position_text(), "2 of 3 songs");
        assert_eq!(ctx.action_text(), "View Playlist");
    }

    #[test]
    fn test_moved_contexts_do_not_mutate_original() {
        let ctx = NavigationContext::from_artist(3, "dj", vec![1, 2], 0);
        let next = ctx.moved_to_next();
        assert_eq!(next.start_index(), 1);
        assert_eq!(ctx.start_index(), 0);

        // Already at the end
        assert_eq!(next.moved_to_next().start_index(), 1);
        assert_eq!(ctx.moved_to_previous().start_index(), 0);
    }

    #[test]
    fn test_single_track_context() {
        let ctx = NavigationContext::single_track(42, "Intro");
        assert_eq!(ctx.label(), "Single Song: Intro");
        assert_eq!(ctx.track_ids(), &[42]);
        assert!(!ctx.has_next());
        assert!(!ctx.has_previous());
    }

    #[test]
    fn test_empty_context_position_text() {
        let ctx = NavigationContext::from_general("Home", vec![], 0);
        assert!(ctx.is_empty());
        assert_eq!(ctx.position_text(), "");
        assert_eq!(ctx.current_track_id(), None);
    }
}
