use super::assertions::Assertion;
use super::runner::{self, Mode, Registration, Report};
use tinytest_core::{Config, Cookie, Done, Harness, Recorder};

/// Fluent DSL for building test scenarios
pub struct Scenario {
    name: String,
    config: Config,
    registrations: Vec<Registration>,
    mode: Mode,
    assertions: Vec<Assertion>,
}

impl Scenario {
    /// Create a new scenario with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config: Config::default(),
            registrations: Vec::new(),
            mode: Mode::RunAll,
            assertions: Vec::new(),
        }
    }

    // ===== Setup =====

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Register a synchronous case
    pub fn sync_case<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&Recorder) -> anyhow::Result<()> + 'static,
    {
        let name = name.to_string();
        self.registrations.push(Box::new(move |harness: &mut Harness| harness.add(name, body)));
        self
    }

    /// Register an asynchronous case
    pub fn async_case<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(Recorder, Done) -> anyhow::Result<()> + 'static,
    {
        let name = name.to_string();
        self.registrations
            .push(Box::new(move |harness: &mut Harness| harness.add_async(name, body)));
        self
    }

    /// Drive `debug_one` with this cookie instead of `run_all`
    pub fn replay(mut self, cookie: Cookie) -> Self {
        self.mode = Mode::Replay(cookie);
        self
    }

    // ===== Assertions =====

    pub fn expect_completed(mut self) -> Self {
        self.assertions.push(Assertion::Completed);
        self
    }

    pub fn expect_not_completed(mut self) -> Self {
        self.assertions.push(Assertion::NotCompleted);
        self
    }

    /// Assert the exact event kinds reported for one test
    pub fn expect_events(mut self, test: &str, kinds: &[&'static str]) -> Self {
        self.assertions.push(Assertion::EventKinds {
            test: test.to_string(),
            kinds: kinds.to_vec(),
        });
        self
    }

    pub fn expect_failure_offsets(mut self, test: &str, offsets: &[usize]) -> Self {
        self.assertions.push(Assertion::FailureOffsets {
            test: test.to_string(),
            offsets: offsets.to_vec(),
        });
        self
    }

    pub fn expect_exception_containing(mut self, test: &str, text: &str) -> Self {
        self.assertions.push(Assertion::ExceptionContains {
            test: test.to_string(),
            text: text.to_string(),
        });
        self
    }

    pub fn expect_one_terminal_per_test(mut self) -> Self {
        self.assertions.push(Assertion::OneTerminalPerTest);
        self
    }

    pub fn expect_live_order(mut self, tests: &[&str]) -> Self {
        self.assertions.push(Assertion::LiveOrder(
            tests.iter().map(|t| t.to_string()).collect(),
        ));
        self
    }

    pub fn expect_announced(mut self, tests: &[&str]) -> Self {
        self.assertions.push(Assertion::Announced(
            tests.iter().map(|t| t.to_string()).collect(),
        ));
        self
    }

    pub fn expect_breakpoints(mut self, offsets: &[usize]) -> Self {
        self.assertions.push(Assertion::BreakpointOffsets(offsets.to_vec()));
        self
    }

    pub fn expect_breakpoint_inline(mut self) -> Self {
        self.assertions.push(Assertion::BreakpointInline);
        self
    }

    // ===== Execution =====

    /// Execute the scenario and evaluate every assertion in order
    pub fn run(self) -> ScenarioResult {
        let report = match runner::execute(self.config, self.registrations, &self.mode) {
            Ok(report) => report,
            Err(e) => {
                return ScenarioResult {
                    name: self.name,
                    success: false,
                    failed_assertion: None,
                    error: Some(format!("Failed to execute: {:?}", e)),
                    report: None,
                }
            }
        };

        for (index, assertion) in self.assertions.iter().enumerate() {
            if let Err(e) = assertion.check(&report) {
                return ScenarioResult {
                    name: self.name,
                    success: false,
                    failed_assertion: Some(index),
                    error: Some(format!("{:?}", e)),
                    report: Some(report),
                };
            }
        }

        ScenarioResult {
            name: self.name,
            success: true,
            failed_assertion: None,
            error: None,
            report: Some(report),
        }
    }
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub failed_assertion: Option<usize>,
    pub error: Option<String>,
    pub report: Option<Report>,
}

impl ScenarioResult {
    /// Unwrap the result, panicking if it failed
    pub fn unwrap(self) -> Report {
        self.expect("scenario failed")
    }

    /// Expect the result to be successful
    pub fn expect(self, msg: &str) -> Report {
        match (self.success, self.report) {
            (true, Some(report)) => report,
            (_, report) => panic!(
                "{}: Scenario '{}' failed at assertion {}: {}\nreport: {:#?}",
                msg,
                self.name,
                self.failed_assertion.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string()),
                report
            ),
        }
    }
}
