//! Debug-to-failure replay.

use super::load_config;
use crate::reporter::{ConsoleReporter, OutputFormat};
use crate::suite;
use anyhow::Result;
use console::{style, Term};
use std::io::IsTerminal;
use std::path::Path;
use std::rc::Rc;
use tinytest_core::{Breakpoint, Cookie, TinytestError};
use tracing::warn;

/// Pauses on the terminal until Enter is pressed.
///
/// Returns immediately when stdin is not a terminal.
pub struct TerminalBreakpoint;

impl Breakpoint for TerminalBreakpoint {
    fn trigger(&self, cookie: &Cookie) {
        let term = Term::stderr();
        let banner = format!(
            "{} {} at failure #{}",
            style("breakpoint").yellow().bold(),
            cookie.name,
            cookie.offset
        );
        if let Err(e) = term.write_line(&banner) {
            warn!("Failed to write breakpoint banner: {}", e);
        }
        if !std::io::stdin().is_terminal() {
            return;
        }
        let prompt = format!(
            "  Attach a debugger to pid {} now, then press Enter to continue",
            std::process::id()
        );
        if let Err(e) = term.write_line(&prompt) {
            warn!("Failed to write breakpoint prompt: {}", e);
        }
        if let Err(e) = term.read_line() {
            warn!("Failed to read from terminal: {}", e);
        }
    }
}

/// Replay the test named by `cookie` up to its recorded failure.
pub fn run(config_path: Option<&Path>, cookie: &str, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let cookie = parse_cookie(cookie)?;
    let config = load_config(config_path)?;
    let harness = suite::build(config, TerminalBreakpoint)?;

    let reporter = Rc::new(ConsoleReporter::new(format));
    let sink = Rc::clone(&reporter);
    let completed = harness
        .debug_one_to_completion(&cookie, move |envelope| sink.report(&envelope))
        .map_err(|e| {
            if let Some(hint) = e.recovery_suggestion() {
                eprintln!("{} {}", style("hint:").cyan(), hint);
            }
            e
        })?;

    reporter.finish(completed);
    Ok(())
}

fn parse_cookie(raw: &str) -> Result<Cookie, TinytestError> {
    serde_json::from_str(raw).map_err(|e| TinytestError::InvalidCookie(e.to_string()))
}
