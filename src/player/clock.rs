//! Time source and duration resolution for simulated playback.
//!
//! Playback is driven by a ticker rather than an audio device, so "how
//! much time passed" and "how long is this track" both come from a
//! [`PlaybackClock`]. Tests swap in [`ManualClock`] or run the engine
//! under tokio's paused clock with [`TokioClock`].

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::model::{Track, TrackId};

/// Duration assumed for tracks whose length the store doesn't know.
pub const DEFAULT_FALLBACK_DURATION_MS: u64 = 180_000;

/// Capability used by the engine to measure elapsed time and resolve
/// track durations.
pub trait PlaybackClock: Send + Sync {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> u64;

    /// Duration of a track as the output backend would report it.
    ///
    /// Fails when the backend cannot load the track.
    fn resolve_duration_ms(&self, track: &Track) -> Result<u64>;
}

/// Clock backed by `tokio::time::Instant`.
///
/// Under `#[tokio::test(start_paused = true)]` it follows the paused
/// runtime clock, which makes ticker tests deterministic.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
    fallback_duration_ms: u64,
}

impl TokioClock {
    pub fn new(fallback_duration_ms: u64) -> Self {
        Self {
            origin: tokio::time::Instant::now(),
            fallback_duration_ms,
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_DURATION_MS)
    }
}

impl PlaybackClock for TokioClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn resolve_duration_ms(&self, track: &Track) -> Result<u64> {
        Ok(track.known_duration_ms().unwrap_or(self.fallback_duration_ms))
    }
}

/// Hand-driven clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<u64>,
    durations: Mutex<HashMap<TrackId, u64>>,
    unplayable: Mutex<HashSet<TrackId>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, ms: u64) {
        *self.now.lock() += ms;
    }

    /// Override the duration reported for one track.
    pub fn set_duration(&self, track_id: TrackId, ms: u64) {
        self.durations.lock().insert(track_id, ms);
    }

    /// Make loading this track fail.
    pub fn set_unplayable(&self, track_id: TrackId) {
        self.unplayable.lock().insert(track_id);
    }
}

impl PlaybackClock for ManualClock {
    fn now_ms(&self) -> u64 {
        *self.now.lock()
    }

    fn resolve_duration_ms(&self, track: &Track) -> Result<u64> {
        if self.unplayable.lock().contains(&track.id) {
            return Err(Error::resolution(format!(
                "No playable audio for track {}",
                track.id
            )));
        }
        if let Some(ms) = self.durations.lock().get(&track.id) {
            return Ok(*ms);
        }
        Ok(track
            .known_duration_ms()
            .unwrap_or(DEFAULT_FALLBACK_DURATION_MS))
    }
}
