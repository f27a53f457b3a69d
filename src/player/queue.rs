//! Play queue management.
//!
//! The queue keeps the canonical order it was built from (`base_order`)
//! and, while shuffle is enabled, a permutation over it (`shuffle_order`).
//! `current` always indexes the *active* order: the permutation when
//! shuffling, the base order otherwise.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::context::{ContextKind, NavigationContext};
use crate::error::{Error, Result};
use crate::model::{Track, TrackId};

/// Repeat mode for the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    /// Repeat entire queue
    All,
    /// Repeat current track
    One,
}

impl RepeatMode {
    /// The mode that follows this one in the UI cycle.
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Queue-level information published to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    /// Position of the current track in the active order
    pub current_index: Option<usize>,
    /// Number of tracks in the queue
    pub total: usize,
    /// Whether "next" would produce a track
    pub has_next: bool,
    /// Whether "previous" would produce a track
    pub has_previous: bool,
    /// Display title of the active context
    pub title: String,
    /// Origin of the queue
    pub context_kind: ContextKind,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
}

impl Default for QueueSummary {
    fn default() -> Self {
        Self {
            current_index: None,
            total: 0,
            has_next: false,
            has_previous: false,
            title: "Queue".to_string(),
            context_kind: ContextKind::General,
            shuffle_enabled: false,
            repeat_mode: RepeatMode::Off,
        }
    }
}

impl QueueSummary {
    /// Human readable position, e.g. "2 of 5 songs".
    pub fn position_text(&self) -> String {
        match self.current_index {
            Some(index) if self.total > 0 => format!("{} of {} songs", index + 1, self.total),
            _ => String::new(),
        }
    }

    /// Label for the "go back to source" action.
    pub fn action_text(&self) -> &'static str {
        self.context_kind.action_text()
    }
}

/// The play queue with current position tracking.
#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    /// Canonical order, as resolved from the context
    base_order: Vec<Arc<Track>>,
    /// Shuffled indices into `base_order` (empty unless shuffling)
    shuffle_order: Vec<usize>,
    /// Position in the active order
    current: usize,
    /// Shuffle mode enabled
    shuffle: bool,
    /// Repeat mode
    repeat: RepeatMode,
    /// Where the queue came from
    context: Option<NavigationContext>,
}

impl PlaybackQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if queue is empty.
    pub fn is_empty(&self) -> bool {
        self.base_order.is_empty()
    }

    /// Get queue length.
    pub fn len(&self) -> usize {
        self.base_order.len()
    }

    /// Install a fresh track list.
    ///
    /// Rebuilds the shuffle permutation when shuffling and resets the
    /// current position to the start of the active order. Fails with
    /// [`Error::EmptyQueue`] (leaving the queue untouched) when `tracks`
    /// is empty.
    pub fn set_queue(&mut self, tracks: Vec<Arc<Track>>, context: NavigationContext) -> Result<()> {
        if tracks.is_empty() {
            return Err(Error::EmptyQueue);
        }

        self.base_order = tracks;
        self.context = Some(context);
        self.current = 0;
        if self.shuffle {
            self.shuffle_order = random_permutation(self.base_order.len());
        } else {
            self.shuffle_order.clear();
        }
        Ok(())
    }

    /// Remove every track and forget the context.
    pub fn clear(&mut self) {
        self.base_order.clear();
        self.shuffle_order.clear();
        self.current = 0;
        self.context = None;
    }

    /// Map a position in the active order to a base index.
    fn base_index(&self, position: usize) -> Option<usize> {
        if self.shuffle {
            self.shuffle_order.get(position).copied()
        } else if position < self.base_order.len() {
            Some(position)
        } else {
            None
        }
    }

    fn track_at(&self, position: usize) -> Option<Arc<Track>> {
        self.base_index(position)
            .and_then(|i| self.base_order.get(i))
            .cloned()
    }

    /// Get current position in the active order.
    pub fn current_index(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    /// Get current track.
    pub fn current(&self) -> Option<Arc<Track>> {
        if self.is_empty() {
            return None;
        }
        self.track_at(self.current)
    }

    /// Tracks in the active order.
    pub fn tracks(&self) -> Vec<Arc<Track>> {
        (0..self.len()).filter_map(|p| self.track_at(p)).collect()
    }

    /// Tracks in the canonical order.
    pub fn base_tracks(&self) -> &[Arc<Track>] {
        &self.base_order
    }

    /// The context the queue was built from.
    pub fn context(&self) -> Option<&NavigationContext> {
        self.context.as_ref()
    }

    /// Whether "next" would produce a track under the current repeat mode.
    pub fn has_next(&self) -> bool {
        !self.is_empty() && (self.repeat != RepeatMode::Off || self.current + 1 < self.len())
    }

    /// Whether "previous" would produce a track under the current repeat mode.
    pub fn has_previous(&self) -> bool {
        !self.is_empty() && (self.repeat != RepeatMode::Off || self.current > 0)
    }

    /// Jump to the first track in the active order with the given id.
    ///
    /// Leaves the position unchanged when the id is not queued.
    pub fn jump_to_song(&mut self, track_id: TrackId) -> Option<Arc<Track>> {
        let position = (0..self.len())
            .find(|&p| self.track_at(p).is_some_and(|t| t.id == track_id))?;
        self.current = position;
        self.current()
    }

    /// Jump to a specific position in the active order.
    pub fn jump_to(&mut self, position: usize) -> Option<Arc<Track>> {
        if position < self.len() {
            self.current = position;
            self.current()
        } else {
            None
        }
    }

    /// Advance to next track and return it.
    ///
    /// Returns `None` at the end of the queue with repeat off; the
    /// position then stays on the last track.
    pub fn next_song(&mut self) -> Option<Arc<Track>> {
        if self.is_empty() {
            return None;
        }

        match self.repeat {
            RepeatMode::One => {}
            RepeatMode::All => {
                self.current = (self.current + 1) % self.len();
            }
            RepeatMode::Off => {
                if self.current + 1 >= self.len() {
                    return None; // End of queue
                }
                self.current += 1;
            }
        }

        self.current()
    }

    /// Go to previous track and return it.
    pub fn previous_song(&mut self) -> Option<Arc<Track>> {
        if self.is_empty() {
            return None;
        }

        match self.repeat {
            RepeatMode::One => {}
            RepeatMode::All => {
                self.current = if self.current == 0 {
                    self.len() - 1
                } else {
                    self.current - 1
                };
            }
            RepeatMode::Off => {
                if self.current == 0 {
                    return None; // Start of queue
                }
                self.current -= 1;
            }
        }

        self.current()
    }

    /// Add a track to the end of the queue.
    ///
    /// While shuffling, the track lands at a random position among the
    /// not-yet-played entries, never at or before the current one.
    pub fn add_song(&mut self, track: Arc<Track>) {
        let new_index = self.base_order.len();
        self.base_order.push(track);
        if self.shuffle {
            self.insert_into_shuffle(new_index);
        }
    }

    /// Insert a track into the canonical order at `position`.
    ///
    /// The current track stays current.
    pub fn insert_song(&mut self, position: usize, track: Arc<Track>) -> Result<()> {
        let len = self.len();
        if position > len {
            return Err(Error::InvalidPosition { position, len });
        }

        self.base_order.insert(position, track);
        if self.shuffle {
            for idx in &mut self.shuffle_order {
                if *idx >= position {
                    *idx += 1;
                }
            }
            self.insert_into_shuffle(position);
        } else if len > 0 && position <= self.current {
            self.current += 1;
        }
        Ok(())
    }

    /// Place a base index into the unplayed tail of the shuffle order.
    fn insert_into_shuffle(&mut self, base_index: usize) {
        let insert_pos = if self.shuffle_order.is_empty() {
            0
        } else {
            rand::rng().random_range(self.current + 1..=self.shuffle_order.len())
        };
        self.shuffle_order.insert(insert_pos, base_index);
    }

    /// Remove the track at a position in the active order.
    ///
    /// Removing the current track slides the following one into its
    /// place (clamped to the last track). The caller decides whether
    /// playback moves on.
    pub fn remove_song(&mut self, position: usize) -> Option<Arc<Track>> {
        let len = self.len();
        let base_idx = self.base_index(position)?;

        if self.shuffle {
            self.shuffle_order.remove(position);
            // Decrement all indices greater than the removed one
            for idx in &mut self.shuffle_order {
                if *idx > base_idx {
                    *idx -= 1;
                }
            }
        }
        let removed = self.base_order.remove(base_idx);

        if position < self.current {
            self.current -= 1;
        }
        let new_len = len - 1;
        if new_len == 0 {
            self.current = 0;
            self.shuffle_order.clear();
        } else if self.current >= new_len {
            self.current = new_len - 1;
        }

        Some(removed)
    }

    /// Move a track from one position to another in the active order.
    ///
    /// While shuffling only the shuffle sequence changes. Returns `false`
    /// when either position is out of range.
    pub fn move_song(&mut self, from: usize, to: usize) -> bool {
        let len = self.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }

        if self.shuffle {
            let idx = self.shuffle_order.remove(from);
            self.shuffle_order.insert(to, idx);
        } else {
            let track = self.base_order.remove(from);
            self.base_order.insert(to, track);
        }

        // Adjust current position so the same track stays current
        let pos = self.current;
        if from == pos {
            self.current = to;
        } else if from < pos && to >= pos {
            self.current -= 1;
        } else if from > pos && to <= pos {
            self.current += 1;
        }
        true
    }

    /// Flip shuffle mode.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.set_shuffle(!self.shuffle);
        self.shuffle
    }

    /// Set shuffle mode.
    ///
    /// The current track stays current: turning shuffle on puts it first
    /// in a fresh permutation, turning it off restores its base position.
    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.shuffle == enabled {
            return;
        }

        let current_base = self.current_index().and_then(|p| self.base_index(p));
        self.shuffle = enabled;

        if enabled {
            let mut order = random_permutation(self.len());
            if let Some(current_idx) = current_base
                && let Some(pos) = order.iter().position(|&i| i == current_idx)
            {
                order.remove(pos);
                order.insert(0, current_idx);
            }
            self.shuffle_order = order;
            self.current = 0;
        } else {
            self.shuffle_order.clear();
            self.current = current_base.unwrap_or(0);
        }
    }

    /// Move the current track to the front of the shuffle order so the
    /// whole permutation is still ahead of it. No-op when not shuffling.
    pub fn anchor_current(&mut self) {
        if !self.shuffle || self.current >= self.shuffle_order.len() {
            return;
        }
        let idx = self.shuffle_order.remove(self.current);
        self.shuffle_order.insert(0, idx);
        self.current = 0;
    }

    /// Get shuffle mode.
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Cycle repeat mode: Off → All → One → Off.
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    /// Set repeat mode.
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Get repeat mode.
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    /// Summary for queue observers.
    pub fn summary(&self) -> QueueSummary {
        let (title, context_kind) = match &self.context {
            Some(ctx) => (ctx.label().to_string(), ctx.kind()),
            None => ("Queue".to_string(), ContextKind::General),
        };
        QueueSummary {
            current_index: self.current_index(),
            total: self.len(),
            has_next: self.has_next(),
            has_previous: self.has_previous(),
            title,
            context_kind,
            shuffle_enabled: self.shuffle,
            repeat_mode: self.repeat,
        }
    }
}

/// Shuffle `0..len` using Fisher-Yates.
fn random_permutation(len: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = rand::rng();
    indices.shuffle(&mut rng);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_context, mock_tracks};

    fn make_queue(n: usize) -> PlaybackQueue {
        let tracks = mock_tracks(n);
        let ctx = mock_context(&tracks);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(tracks, ctx).unwrap();
        queue
    }

    fn current_id(queue: &PlaybackQueue) -> TrackId {
        queue.current().unwrap().id
    }

    #[test]
    fn test_queue_basic() {
        let mut queue = make_queue(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(current_id(&queue), 1);

        assert_eq!(queue.next_song().unwrap().id, 2);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.previous_song().unwrap().id, 1);
    }

    #[test]
    fn test_set_queue_rejects_empty() {
        let mut queue = make_queue(2);
        let result = queue.set_queue(vec![], NavigationContext::from_general("x", vec![], 0));
        assert!(matches!(result, Err(Error::EmptyQueue)));
        // Unchanged
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.context().unwrap().label(), "Test Context");
    }

    #[test]
    fn test_queue_repeat_all_wraps() {
        let mut queue = make_queue(2);
        queue.set_repeat_mode(RepeatMode::All);

        queue.next_song(); // 2
        assert_eq!(queue.next_song().unwrap().id, 1); // wraps
        assert_eq!(queue.previous_song().unwrap().id, 2); // wraps backwards
    }

    #[test]
    fn test_queue_repeat_one_stays() {
        let mut queue = make_queue(2);
        queue.set_repeat_mode(RepeatMode::One);

        assert_eq!(queue.next_song().unwrap().id, 1);
        assert_eq!(queue.previous_song().unwrap().id, 1);
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn test_queue_repeat_off_exhausts() {
        let mut queue = make_queue(2);
        queue.next_song();
        assert!(queue.next_song().is_none());
        assert_eq!(queue.current_index(), Some(1));

        queue.jump_to(0);
        assert!(queue.previous_song().is_none());
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn test_jump_to_song_by_id() {
        let mut queue = make_queue(4);
        assert_eq!(queue.jump_to_song(3).unwrap().id, 3);
        assert_eq!(queue.current_index(), Some(2));

        // Unknown id leaves the position alone
        assert!(queue.jump_to_song(99).is_none());
        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn test_anchor_current_puts_track_first() {
        let mut queue = make_queue(6);
        queue.set_shuffle(true);
        queue.jump_to(4);
        let id = current_id(&queue);

        queue.anchor_current();
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(current_id(&queue), id);
        assert_eq!(queue.len(), 6);

        let mut ids: Vec<_> = queue.tracks().iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_jump_to_song_in_shuffle_uses_active_order() {
        let mut queue = make_queue(6);
        queue.set_shuffle(true);
        let track = queue.jump_to_song(4).unwrap();
        assert_eq!(track.id, 4);
        let pos = queue.current_index().unwrap();
        assert_eq!(queue.tracks()[pos].id, 4);
    }

    #[test]
    fn test_shuffle_keeps_current_track() {
        let mut queue = make_queue(5);
        queue.jump_to(2);
        assert_eq!(current_id(&queue), 3);

        queue.set_shuffle(true);
        assert_eq!(current_id(&queue), 3);
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(queue.shuffle_order[0], 2); // Current track is first in shuffle

        queue.set_shuffle(false);
        assert_eq!(current_id(&queue), 3);
        assert_eq!(queue.current_index(), Some(2));
        assert!(queue.shuffle_order.is_empty());
    }

    #[test]
    fn test_shuffle_visits_all_tracks() {
        let mut queue = make_queue(10);
        queue.set_shuffle(true);

        let mut visited = std::collections::HashSet::new();
        visited.insert(current_id(&queue));
        while let Some(track) = queue.next_song() {
            visited.insert(track.id);
        }

        assert_eq!(visited.len(), 10);
    }

    #[test]
    fn test_add_song_appends() {
        let mut queue = make_queue(2);
        queue.add_song(Arc::new(Track::new(10, "New", 1000)));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.tracks()[2].id, 10);
        assert_eq!(current_id(&queue), 1);
    }

    #[test]
    fn test_add_song_in_shuffle_lands_after_current() {
        for _ in 0..20 {
            let mut queue = make_queue(6);
            queue.set_shuffle(true);
            queue.next_song();
            queue.next_song();
            let before = queue.current_index().unwrap();

            queue.add_song(Arc::new(Track::new(100, "Late", 1000)));
            let pos = queue.tracks().iter().position(|t| t.id == 100).unwrap();
            assert!(pos > before, "added at {} with current {}", pos, before);
            assert_eq!(queue.current_index(), Some(before));
        }
    }

    #[test]
    fn test_insert_song_keeps_current() {
        let mut queue = make_queue(3);
        queue.jump_to(1);
        queue.insert_song(0, Arc::new(Track::new(50, "Front", 1000))).unwrap();
        assert_eq!(current_id(&queue), 2);
        assert_eq!(queue.current_index(), Some(2));

        let err = queue.insert_song(10, Arc::new(Track::new(51, "Far", 1000)));
        assert!(matches!(err, Err(Error::InvalidPosition { position: 10, len: 4 })));
    }

    #[test]
    fn test_remove_before_current_shifts_index() {
        let mut queue = make_queue(4);
        queue.jump_to(2);
        assert_eq!(queue.remove_song(0).unwrap().id, 1);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(current_id(&queue), 3);
    }

    #[test]
    fn test_remove_current_slides_next_in() {
        let mut queue = make_queue(3);
        queue.jump_to(1);
        queue.remove_song(1);
        assert_eq!(current_id(&queue), 3);
    }

    #[test]
    fn test_remove_last_current_clamps() {
        let mut queue = make_queue(3);
        queue.jump_to(2);
        queue.remove_song(2);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(current_id(&queue), 2);
    }

    #[test]
    fn test_remove_only_track_empties_queue() {
        let mut queue = make_queue(1);
        queue.remove_song(0);
        assert!(queue.is_empty());
        assert!(queue.current().is_none());
        assert!(queue.remove_song(0).is_none());
    }

    #[test]
    fn test_remove_in_shuffle_keeps_permutation() {
        let mut queue = make_queue(5);
        queue.set_shuffle(true);
        let removed = queue.remove_song(3).unwrap();
        assert_eq!(queue.len(), 4);

        let mut order = queue.shuffle_order.clone();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert!(queue.tracks().iter().all(|t| t.id != removed.id));
    }

    #[test]
    fn test_move_preserves_current_playing() {
        let mut queue = make_queue(3);
        queue.jump_to(1);

        // Move the currently playing track up
        assert!(queue.move_song(1, 0));
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(current_id(&queue), 2);

        // Move another track across the current one
        assert!(queue.move_song(2, 0));
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(current_id(&queue), 2);

        assert!(!queue.move_song(0, 5));
    }

    #[test]
    fn test_move_in_shuffle_mode() {
        let mut queue = make_queue(3);
        queue.set_shuffle(true);

        let orig_first = queue.shuffle_order[0];
        let orig_second = queue.shuffle_order[1];

        assert!(queue.move_song(1, 0));
        assert_eq!(queue.shuffle_order[0], orig_second);
        assert_eq!(queue.shuffle_order[1], orig_first);

        // The underlying order should NOT be changed
        let base: Vec<_> = queue.base_tracks().iter().map(|t| t.id).collect();
        assert_eq!(base, vec![1, 2, 3]);
    }

    #[test]
    fn test_cycle_repeat() {
        let mut queue = PlaybackQueue::new();
        assert_eq!(queue.cycle_repeat_mode(), RepeatMode::All);
        assert_eq!(queue.cycle_repeat_mode(), RepeatMode::One);
        assert_eq!(queue.cycle_repeat_mode(), RepeatMode::Off);
    }

    #[test]
    fn test_summary() {
        let mut queue = make_queue(3);
        let summary = queue.summary();
        assert_eq!(summary.title, "Test Context");
        assert_eq!(summary.position_text(), "1 of 3 songs");
        assert!(summary.has_next);
        assert!(!summary.has_previous);

        queue.set_repeat_mode(RepeatMode::All);
        assert!(queue.summary().has_previous);

        let empty = PlaybackQueue::new().summary();
        assert_eq!(empty, QueueSummary::default());
        assert_eq!(empty.position_text(), "");
    }
}
