//! Full run of the self-check suite.

use super::load_config;
use crate::reporter::{ConsoleReporter, OutputFormat};
use crate::suite;
use anyhow::Result;
use std::path::Path;
use std::rc::Rc;
use tinytest_core::NoopBreakpoint;

/// Run every registered test and print the report stream.
pub fn run(config_path: Option<&Path>, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let config = load_config(config_path)?;
    let harness = suite::build(config, NoopBreakpoint)?;

    let reporter = Rc::new(ConsoleReporter::new(format));
    let sink = Rc::clone(&reporter);
    let completed = harness.run_all_to_completion(move |envelope| sink.report(&envelope));

    if !reporter.finish(completed) {
        anyhow::bail!("Some tests did not pass");
    }
    Ok(())
}
