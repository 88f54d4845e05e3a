//! CLI commands.

use anyhow::{Context, Result};
use std::path::Path;
use tinytest_core::Config;

pub mod debug;
pub mod list;
pub mod run;

/// Loads the explicit config file, or ./tinytest.toml when none was given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file {} not found", path.display());
            }
            Config::load(path)
        }
        None => Config::load_from_dir(Path::new(".")),
    };
    config.context("Failed to load configuration")
}
