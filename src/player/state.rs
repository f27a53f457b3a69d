//! Playback phase, observable state snapshot, and transition rules.

use std::sync::Arc;

use serde::Serialize;

use super::queue::RepeatMode;
use crate::error::{Error, Result};
use crate::model::Track;

/// Current playback phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackPhase {
    /// Nothing loaded yet
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
    Error,
}

/// Snapshot of everything observers need to render the player.
///
/// Replaced as a whole on every engine mutation, so observers never see a
/// mix of old and new fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentPlaybackState {
    pub phase: PlaybackPhase,
    /// Track being played (if any)
    pub current_track: Option<Arc<Track>>,
    /// Position within the current track
    pub position_ms: u64,
    /// Resolved duration of the current track
    pub duration_ms: u64,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
    /// Position of the current track in the active queue order
    pub queue_index: Option<usize>,
    /// Message of the failure that moved the phase to `Error`
    pub last_error: Option<String>,
}

impl CurrentPlaybackState {
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.phase == PlaybackPhase::Paused
    }

    pub fn has_error(&self) -> bool {
        self.phase == PlaybackPhase::Error
    }

    /// Whether a track is loaded far enough to seek within it.
    pub fn is_loaded(&self) -> bool {
        self.current_track.is_some()
            && matches!(
                self.phase,
                PlaybackPhase::Playing | PlaybackPhase::Paused | PlaybackPhase::Loading
            )
    }

    /// Get position as a percentage (0 - 100).
    pub fn progress_percent(&self) -> u8 {
        if self.duration_ms == 0 {
            0
        } else {
            (self.position_ms.min(self.duration_ms) * 100 / self.duration_ms) as u8
        }
    }

    /// Format position as M:SS.
    pub fn position_str(&self) -> String {
        format_duration_ms(self.position_ms)
    }

    /// Format duration as M:SS.
    pub fn duration_str(&self) -> String {
        format_duration_ms(self.duration_ms)
    }
}

/// Format milliseconds as M:SS or H:MM:SS.
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Finite state machine over [`CurrentPlaybackState`].
///
/// Every rejected event returns an error and leaves the state untouched.
/// Ticker start/stop is the engine's job; the machine only reports which
/// phase it ended in.
#[derive(Debug, Clone, Default)]
pub struct PlaybackStateMachine {
    state: CurrentPlaybackState,
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &CurrentPlaybackState {
        &self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase
    }

    /// Start loading `track`.
    ///
    /// Accepted from any phase; the engine cancels the ticker before
    /// switching tracks mid-playback.
    pub fn play(&mut self, track: Option<Arc<Track>>) -> Result<()> {
        let track = track.ok_or(Error::NoTrackAvailable)?;
        self.state.phase = PlaybackPhase::Loading;
        self.state.current_track = Some(track);
        self.state.position_ms = 0;
        self.state.duration_ms = 0;
        self.state.last_error = None;
        Ok(())
    }

    /// Loading finished with a resolved duration.
    pub fn loaded(&mut self, duration_ms: u64) -> Result<()> {
        if self.state.phase != PlaybackPhase::Loading {
            return Err(Error::transition(self.state.phase, "finish loading"));
        }
        self.state.phase = PlaybackPhase::Playing;
        self.state.duration_ms = duration_ms;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.state.phase != PlaybackPhase::Playing {
            return Err(Error::transition(self.state.phase, "pause"));
        }
        self.state.phase = PlaybackPhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state.phase != PlaybackPhase::Paused {
            return Err(Error::transition(self.state.phase, "resume"));
        }
        self.state.phase = PlaybackPhase::Playing;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        match self.state.phase {
            PlaybackPhase::Playing | PlaybackPhase::Paused | PlaybackPhase::Loading => {
                self.state.phase = PlaybackPhase::Stopped;
                self.state.position_ms = 0;
                Ok(())
            }
            from => Err(Error::transition(from, "stop")),
        }
    }

    /// Move the position within the loaded track.
    ///
    /// With nothing loaded every position is out of range.
    pub fn seek(&mut self, position_ms: i64) -> Result<()> {
        if !self.state.is_loaded() {
            return Err(Error::InvalidSeek {
                position_ms,
                duration_ms: 0,
            });
        }
        let duration_ms = self.state.duration_ms;
        match u64::try_from(position_ms) {
            Ok(pos) if pos <= duration_ms => {
                self.state.position_ms = pos;
                Ok(())
            }
            _ => Err(Error::InvalidSeek {
                position_ms,
                duration_ms,
            }),
        }
    }

    /// Record a failure.
    pub fn error(&mut self, message: impl Into<String>) {
        self.state.phase = PlaybackPhase::Error;
        self.state.last_error = Some(message.into());
    }

    /// Advance the position while playing.
    ///
    /// Clamps to the duration and returns `true` once the track is
    /// finished. Ignored outside `Playing`.
    pub fn advance(&mut self, elapsed_ms: u64) -> bool {
        if self.state.phase != PlaybackPhase::Playing {
            return false;
        }
        let duration = self.state.duration_ms;
        self.state.position_ms = self.state.position_ms.saturating_add(elapsed_ms).min(duration);
        self.state.position_ms >= duration
    }

    /// Point at a track without starting it (queue setup, stopped skips).
    pub fn set_current(&mut self, track: Option<Arc<Track>>, queue_index: Option<usize>) {
        let same_track = match (&track, &self.state.current_track) {
            (Some(new), Some(old)) => new.id == old.id,
            _ => false,
        };
        if !same_track {
            self.state.duration_ms = 0;
        }
        self.state.current_track = track;
        self.state.queue_index = queue_index;
        self.state.position_ms = 0;
    }

    /// Forget the current track (queue emptied).
    pub fn clear_track(&mut self) {
        self.set_current(None, None);
    }

    pub fn set_queue_index(&mut self, queue_index: Option<usize>) {
        self.state.queue_index = queue_index;
    }

    /// Mirror the queue's shuffle and repeat flags.
    pub fn set_modes(&mut self, shuffle_enabled: bool, repeat_mode: RepeatMode) {
        self.state.shuffle_enabled = shuffle_enabled;
        self.state.repeat_mode = repeat_mode;
    }
}
