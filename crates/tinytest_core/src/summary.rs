//! Folding a report stream into per-test outcomes.

use crate::types::{Cookie, Envelope, Event, ExceptionDetails};
use std::collections::HashMap;

/// Where a test stands in the report stream seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    /// Announced or partially reported; no terminal event yet.
    Pending,
    /// Finished with no unexpected failures.
    Passed,
    /// Finished with at least one `fail` event.
    Failed,
    /// Ended with an `exception` event.
    Raised,
}

/// Everything reported for one test.
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub group_path: Vec<String>,
    pub test: String,
    pub oks: usize,
    pub failures: Vec<Cookie>,
    pub expected_failures: usize,
    pub exception: Option<ExceptionDetails>,
    pub time_ms: Option<u64>,
}

impl TestRecord {
    fn new(group_path: Vec<String>, test: String) -> Self {
        Self {
            group_path,
            test,
            oks: 0,
            failures: Vec::new(),
            expected_failures: 0,
            exception: None,
            time_ms: None,
        }
    }

    pub fn outcome(&self) -> TestOutcome {
        if self.exception.is_some() {
            TestOutcome::Raised
        } else if self.time_ms.is_none() {
            TestOutcome::Pending
        } else if self.failures.is_empty() {
            TestOutcome::Passed
        } else {
            TestOutcome::Failed
        }
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::Ok { .. } => self.oks += 1,
            Event::Fail { cookie, .. } => self.failures.push(cookie.clone()),
            Event::ExpectedFail { .. } => self.expected_failures += 1,
            Event::Exception { details } => self.exception = Some(details.clone()),
            Event::Finish { time_ms } => self.time_ms = Some(*time_ms),
        }
    }
}

/// Per-test records in first-seen order.
#[derive(Debug, Default)]
pub struct RunSummary {
    records: Vec<TestRecord>,
    index: HashMap<(Vec<String>, String), usize>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one envelope into the summary.
    pub fn observe(&mut self, envelope: &Envelope) {
        let key = (envelope.group_path.clone(), envelope.test.clone());
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.records
                    .push(TestRecord::new(key.0.clone(), key.1.clone()));
                self.index.insert(key, self.records.len() - 1);
                self.records.len() - 1
            }
        };
        for event in &envelope.events {
            self.records[slot].observe(event);
        }
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn count(&self, outcome: TestOutcome) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome() == outcome)
            .count()
    }

    /// True if any test failed, raised or never finished.
    pub fn has_failures(&self) -> bool {
        self.records
            .iter()
            .any(|record| record.outcome() != TestOutcome::Passed)
    }

    /// Cookies of every unexpected failure, usable for replay.
    pub fn failure_cookies(&self) -> impl Iterator<Item = &Cookie> {
        self.records
            .iter()
            .flat_map(|record| record.failures.iter())
    }

    /// Short human-readable totals line.
    pub fn line(&self) -> String {
        let mut parts = Vec::new();
        for (outcome, label) in [
            (TestOutcome::Passed, "passed"),
            (TestOutcome::Failed, "failed"),
            (TestOutcome::Raised, "raised"),
            (TestOutcome::Pending, "incomplete"),
        ] {
            let n = self.count(outcome);
            if n > 0 {
                parts.push(format!("{} {}", n, label));
            }
        }
        if parts.is_empty() {
            "no tests".to_string()
        } else {
            parts.join(", ")
        }
    }
}
