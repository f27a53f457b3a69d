//! Engine-wide error types.
//!
//! Library modules return [`Error`] via `thiserror`, while the CLI and
//! `main` use `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - Validation failures ([`Error::EmptyQueue`], [`Error::InvalidSeek`],
//!   [`Error::InvalidTransition`], ...) are returned to the caller and
//!   leave engine state untouched.
//! - Failures during an in-flight transition are additionally recorded on
//!   the playback state (phase `Error`, `last_error` set).
//!
//! # Example
//!
//! ```ignore
//! use soundify_engine::error::{Error, Result, ResultExt};
//!
//! async fn start(handle: &EngineHandle) -> Result<()> {
//!     handle.seek_to(0).await.with_context("restarting track")?;
//!     Ok(())
//! }
//! ```

use crate::player::PlaybackPhase;

/// Engine-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level engine error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A queue was requested with no resolvable tracks
    #[error("Queue is empty")]
    EmptyQueue,

    /// Playback was requested with no current track
    #[error("No track available to play")]
    NoTrackAvailable,

    /// Seek target outside the loaded track
    #[error("Invalid seek to {position_ms}ms (duration {duration_ms}ms)")]
    InvalidSeek { position_ms: i64, duration_ms: u64 },

    /// Operation not valid for the current playback phase
    #[error("Cannot {event} while {from:?}")]
    InvalidTransition {
        from: PlaybackPhase,
        event: &'static str,
    },

    /// Position outside the active queue order
    #[error("Queue position {position} out of range (queue has {len} tracks)")]
    InvalidPosition { position: usize, len: usize },

    /// Lookup collaborator has no such track
    #[error("Track not found: {0}")]
    TrackNotFound(i64),

    /// Lookup collaborator produced no usable tracks for a context
    #[error("Track resolution failed: {0}")]
    TrackResolution(String),

    /// The engine task has shut down
    #[error("Playback engine is not running")]
    EngineClosed,

    /// Library database error
    #[error("Database error: {0}")]
    Database(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an invalid transition error.
    pub fn transition(from: PlaybackPhase, event: &'static str) -> Self {
        Self::InvalidTransition { from, event }
    }

    /// Create a track resolution error.
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::TrackResolution(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error is a caller-side validation failure.
    ///
    /// Validation failures never change engine state.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::EmptyQueue
            | Self::NoTrackAvailable
            | Self::InvalidSeek { .. }
            | Self::InvalidTransition { .. }
            | Self::InvalidPosition { .. } => true,
            Self::WithContext { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::from(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidSeek {
            position_ms: -100,
            duration_ms: 3000,
        };
        let msg = err.to_string();
        assert!(msg.contains("-100ms"));
        assert!(msg.contains("3000ms"));
    }

    #[test]
    fn test_transition_display() {
        let err = Error::transition(PlaybackPhase::Idle, "pause");
        assert_eq!(err.to_string(), "Cannot pause while Idle");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::resolution("no tracks").context("while opening playlist");
        let msg = err.to_string();
        assert!(msg.contains("while opening playlist"));
        assert!(msg.contains("no tracks"));
    }

    #[test]
    fn test_validation_classification() {
        assert!(Error::EmptyQueue.is_validation());
        assert!(Error::NoTrackAvailable.context("ctx").is_validation());
        assert!(!Error::resolution("x").is_validation());
        assert!(!Error::EngineClosed.is_validation());
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::EmptyQueue);
        let with_ctx = result.with_context("additional context");
        assert!(
            with_ctx
                .unwrap_err()
                .to_string()
                .contains("additional context")
        );
    }
}
