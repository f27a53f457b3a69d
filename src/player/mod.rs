//! Simulated playback engine: queue, state machine and ticker.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    EngineHandle (any task)                      │
//! │   Resolves contexts via TrackLookup, sends commands, observes   │
//! └────────────────────────────┬────────────────────────────────────┘
//!                              │ mpsc mailbox + oneshot replies
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  PlaybackEngine (actor task)                    │
//! │    Owns PlaybackQueue, PlaybackStateMachine and the Ticker      │
//! └────────────────────────────┬────────────────────────────────────┘
//!                              │ watch + broadcast
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Observers                               │
//! │        CurrentPlaybackState snapshots, PlaybackEvent feed       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
mod context;
mod engine;
mod queue;
mod state;
mod ticker;

pub use clock::{DEFAULT_FALLBACK_DURATION_MS, ManualClock, PlaybackClock, TokioClock};
pub use context::{ContextKind, NavigationContext};
pub use engine::{EngineHandle, PlaybackEngine, PlaybackEvent};
pub use queue::{PlaybackQueue, QueueSummary, RepeatMode};
pub use state::{CurrentPlaybackState, PlaybackPhase, PlaybackStateMachine, format_duration_ms};
pub use ticker::TickerCounts;
