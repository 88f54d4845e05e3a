//! Append-only registry of test cases.

use crate::config::NamingConfig;
use crate::error::{Result, TinytestError};
use crate::recorder::Recorder;
use crate::run::{ReportSink, RunEnv, TestRun};
use crate::test_case::{Done, TestCase};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Test cases keyed by unique name, in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    naming: NamingConfig,
    tests: HashMap<String, Rc<TestCase>>,
    ordered: Vec<Rc<TestCase>>,
}

impl Registry {
    /// Creates an empty registry with the default naming scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that builds names with `naming`.
    pub fn with_naming(naming: NamingConfig) -> Self {
        Self {
            naming,
            ..Self::default()
        }
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Adds a test case. Fails, leaving the registry unchanged, if the name is taken.
    pub fn add_case(&mut self, test: TestCase) -> Result<()> {
        if self.tests.contains_key(test.name()) {
            return Err(TinytestError::DuplicateTest {
                name: test.name().to_string(),
            });
        }
        debug!(test = %test.name(), mode = ?test.mode(), "registered test case");
        let test = Rc::new(test);
        self.tests.insert(test.name().to_string(), Rc::clone(&test));
        self.ordered.push(test);
        Ok(())
    }

    /// Registers a synchronous test case.
    pub fn add<F>(&mut self, name: impl Into<String>, body: F) -> Result<()>
    where
        F: Fn(&Recorder) -> anyhow::Result<()> + 'static,
    {
        let test = TestCase::new_sync(name, &self.naming, body);
        self.add_case(test)
    }

    /// Registers an asynchronous test case.
    pub fn add_async<F>(&mut self, name: impl Into<String>, body: F) -> Result<()>
    where
        F: Fn(Recorder, Done) -> anyhow::Result<()> + 'static,
    {
        let test = TestCase::new_async(name, &self.naming, body);
        self.add_case(test)
    }

    /// Looks up a test case by its full name.
    pub fn get(&self, name: &str) -> Option<&Rc<TestCase>> {
        self.tests.get(name)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Test cases in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<TestCase>> {
        self.ordered.iter()
    }

    /// Creates a run over the test cases registered so far.
    pub fn create_run(&self, on_report: ReportSink, env: RunEnv) -> TestRun {
        TestRun::new(self.ordered.clone(), on_report, env)
    }
}
