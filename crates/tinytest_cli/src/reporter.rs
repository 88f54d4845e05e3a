//! Console rendering of the report stream.

use anyhow::Result;
use console::style;
use std::cell::RefCell;
use tinytest_core::{Envelope, Event, RunSummary};
use tracing::warn;

/// How envelopes are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown format '{}'. Use 'pretty' or 'json'.", other),
        }
    }
}

/// Prints envelopes as they arrive and keeps a running summary.
pub struct ConsoleReporter {
    format: OutputFormat,
    summary: RefCell<RunSummary>,
}

impl ConsoleReporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            summary: RefCell::new(RunSummary::new()),
        }
    }

    pub fn report(&self, envelope: &Envelope) {
        self.summary.borrow_mut().observe(envelope);
        match self.format {
            OutputFormat::Json => match serde_json::to_string(envelope) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize envelope: {}", e),
            },
            OutputFormat::Pretty => {
                for event in &envelope.events {
                    self.print_event(envelope, event);
                }
            }
        }
    }

    fn print_event(&self, envelope: &Envelope, event: &Event) {
        let title = format!("{} › {}", envelope.group_path.join(" › "), envelope.test);
        match event {
            Event::Ok { .. } => {}
            Event::Fail { details, cookie } => {
                println!("  {} {} #{}", style("×").red(), style(&title).red(), cookie.offset);
                println!("    {}", serde_json::Value::Object(details.clone()));
                if let Ok(cookie) = serde_json::to_string(cookie) {
                    println!(
                        "    {} tinytest debug --cookie '{}'",
                        style("→").cyan(),
                        cookie
                    );
                }
            }
            Event::ExpectedFail { cookie, .. } => {
                println!(
                    "  {} {} #{} (expected)",
                    style("~").yellow(),
                    title,
                    cookie.offset
                );
            }
            Event::Exception { details } => {
                println!("{} {}", style("!").red().bold(), style(&title).red().bold());
                println!("    {}", details.message);
                for line in details.stack.lines().take(12) {
                    println!("    {}", style(line).dim());
                }
            }
            Event::Finish { time_ms } => {
                let failed = self
                    .summary
                    .borrow()
                    .records()
                    .iter()
                    .any(|record| {
                        record.test == envelope.test
                            && record.group_path == envelope.group_path
                            && !record.failures.is_empty()
                    });
                let mark = if failed {
                    style("✗").red()
                } else {
                    style("✓").green()
                };
                println!("{} {} {}", mark, title, style(format!("({}ms)", time_ms)).dim());
            }
        }
    }

    /// Prints the totals line. Returns true when every test passed.
    pub fn finish(&self, completed: bool) -> bool {
        let summary = self.summary.borrow();
        if self.format == OutputFormat::Pretty {
            println!();
            let line = summary.line();
            if summary.has_failures() || !completed {
                println!("{}", style(line).yellow().bold());
            } else {
                println!("{} {}", style("✓").green(), style(line).green());
            }
        }
        if !completed {
            warn!("Run did not complete; an async test never signalled completion");
        }
        completed && !summary.has_failures()
    }
}
