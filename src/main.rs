//! Soundify engine - simulated playback sessions from the command line.

use clap::Parser;
use soundify_engine::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("soundify_engine=info".parse()?)
                .add_directive("engine=info".parse()?),
        )
        .init();

    cli::run_command(&args)
}
