//! Soundify playback engine.
//!
//! A simulated music playback engine for a social audio app: a play queue
//! with shuffle and repeat, a playback state machine advanced by a
//! periodic ticker, and context-aware navigation over playlists, uploader
//! catalogs and search results. Observers follow the engine through
//! state snapshots and an event feed.
//!
//! The binary (`soundify-engine`) wraps the engine in a small CLI backed
//! by an SQLite library.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod model;
pub mod player;
#[cfg(test)]
pub mod test_utils;
