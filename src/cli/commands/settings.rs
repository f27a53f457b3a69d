//! Config inspection command.

use tokio::runtime::Runtime;

use crate::config::{self, Config, ConfigError};

/// Print the config file location and the effective settings
pub fn cmd_config(rt: &Runtime, config: &Config, init: bool) -> anyhow::Result<()> {
    let path = config::config_path();
    match &path {
        Some(p) if p.exists() => println!("Config file: {}", p.display()),
        Some(p) => println!("Config file: {} (not created, using defaults)", p.display()),
        None => println!("Config file: unavailable (no config directory)"),
    }

    if init {
        match path {
            Some(p) if p.exists() => println!("Config file already exists, leaving it unchanged."),
            Some(p) => {
                rt.block_on(config::save_async(config.clone(), p.clone()))?;
                println!("Wrote {}", p.display());
            }
            None => return Err(ConfigError::NoConfigDir.into()),
        }
    }

    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
