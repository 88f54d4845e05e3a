//! List registered tests.

use super::load_config;
use crate::suite;
use anyhow::Result;
use console::style;
use std::path::Path;
use tinytest_core::{NoopBreakpoint, TestMode};

/// Print every registered test in registration order.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let harness = suite::build(config, NoopBreakpoint)?;

    println!(
        "{}",
        style(format!("{} registered tests:", harness.registry().len())).bold()
    );
    for test in harness.registry().iter() {
        let mode = match test.mode() {
            TestMode::Sync => "",
            TestMode::Async => " (async)",
        };
        println!(
            "  {} › {}{}",
            style(test.group_path().join(" › ")).dim(),
            test.short_name(),
            style(mode).cyan()
        );
    }
    Ok(())
}
