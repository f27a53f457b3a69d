//! Command-line interface for soundify-engine.
//!
//! This module provides CLI commands for inspecting and seeding the
//! library and for running a simulated playback session.

mod commands;

pub use commands::{Cli, Commands, RepeatArg, run_command};
