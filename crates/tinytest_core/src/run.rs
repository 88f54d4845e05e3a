//! Run orchestration: sequential execution and debug-to-failure replay.
//!
//! A [`TestRun`] owns an ordered snapshot of test cases. It runs them one at
//! a time, wraps every event in an [`Envelope`] carrying the owning test's
//! identity, and synthesizes the terminal `finish`/`exception` event for each
//! case.

use crate::breakpoint::{Breakpoint, NoopBreakpoint};
use crate::config::{Config, ExpectedFailurePolicy};
use crate::error::{Result, TinytestError};
use crate::scheduler::Scheduler;
use crate::test_case::{RunHooks, TestCase};
use crate::types::{Cookie, Envelope, Event, ExceptionDetails};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Receives every envelope of a run, in order.
pub type ReportSink = Rc<dyn Fn(Envelope)>;

type Continuation = Box<dyn FnOnce()>;

/// Collaborators shared by every test case of a run.
#[derive(Clone)]
pub struct RunEnv {
    pub(crate) scheduler: Rc<dyn Scheduler>,
    pub(crate) breakpoint: Rc<dyn Breakpoint>,
    pub(crate) attach_threshold: Duration,
    pub(crate) expected_failure_policy: ExpectedFailurePolicy,
}

impl RunEnv {
    /// Environment with a no-op breakpoint and default settings.
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        let config = Config::default();
        Self {
            scheduler,
            breakpoint: Rc::new(NoopBreakpoint),
            attach_threshold: config.debug.attach_threshold(),
            expected_failure_policy: config.assertions.expected_failure_policy,
        }
    }

    /// Replaces the breakpoint collaborator.
    pub fn with_breakpoint(mut self, breakpoint: Rc<dyn Breakpoint>) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    /// Applies the debug and assertion sections of `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.attach_threshold = config.debug.attach_threshold();
        self.expected_failure_policy = config.assertions.expected_failure_policy;
        self
    }
}

/// A run over an immutable snapshot of test cases.
pub struct TestRun {
    state: Rc<RunState>,
}

struct RunState {
    tests: Vec<Rc<TestCase>>,
    on_report: ReportSink,
    env: RunEnv,
}

impl TestRun {
    /// Creates a run and announces every test with an empty envelope.
    pub(crate) fn new(tests: Vec<Rc<TestCase>>, on_report: ReportSink, env: RunEnv) -> Self {
        let state = Rc::new(RunState {
            tests,
            on_report,
            env,
        });
        for test in &state.tests {
            state.announce(test);
        }
        Self { state }
    }

    /// Number of test cases in the snapshot.
    pub fn len(&self) -> usize {
        self.state.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.tests.is_empty()
    }

    /// Runs every test case in order, one at a time, then calls `on_complete`.
    pub fn run<F>(&self, on_complete: F)
    where
        F: FnOnce() + 'static,
    {
        info!(tests = self.len(), "starting run");
        let pending: VecDeque<Rc<TestCase>> = self.state.tests.iter().cloned().collect();
        run_next(Rc::clone(&self.state), pending, Box::new(on_complete));
    }

    /// Replays the test named by `cookie`, stopping at the failure at `cookie.offset`.
    pub fn debug<F>(&self, cookie: &Cookie, on_complete: F) -> Result<()>
    where
        F: FnOnce() + 'static,
    {
        let test = self
            .state
            .tests
            .iter()
            .find(|test| test.name() == cookie.name)
            .cloned()
            .ok_or_else(|| TinytestError::NoSuchTest {
                name: cookie.name.clone(),
            })?;

        info!(test = %cookie.name, offset = cookie.offset, "replaying to failure");
        run_one(&self.state, test, Some(cookie.offset), Box::new(on_complete));
        Ok(())
    }
}

impl RunState {
    fn announce(&self, test: &TestCase) {
        (self.on_report)(Envelope {
            group_path: test.group_path().to_vec(),
            test: test.short_name().to_string(),
            events: Vec::new(),
        });
    }

    fn report(&self, test: &TestCase, event: Event) {
        (self.on_report)(Envelope {
            group_path: test.group_path().to_vec(),
            test: test.short_name().to_string(),
            events: vec![event],
        });
    }
}

fn run_next(state: Rc<RunState>, mut pending: VecDeque<Rc<TestCase>>, on_complete: Continuation) {
    match pending.pop_front() {
        Some(test) => {
            let next_state = Rc::clone(&state);
            run_one(
                &state,
                test,
                None,
                Box::new(move || run_next(next_state, pending, on_complete)),
            );
        }
        None => {
            info!("run complete");
            on_complete();
        }
    }
}

/// Runs one test case; `next` is called after its terminal event.
fn run_one(
    state: &Rc<RunState>,
    test: Rc<TestCase>,
    stop_at_offset: Option<usize>,
    next: Continuation,
) {
    debug!(test = %test.name(), mode = ?test.mode(), "starting test case");
    let started = Instant::now();
    let terminated = Rc::new(Cell::new(false));
    let next = Rc::new(RefCell::new(Some(next)));

    let on_event = {
        let state = Rc::clone(state);
        let test = Rc::clone(&test);
        let terminated = Rc::clone(&terminated);
        Rc::new(move |event: Event| {
            if terminated.get() {
                warn!(
                    test = %test.name(),
                    kind = event.kind(),
                    "dropping event reported after the test case ended"
                );
                return;
            }
            state.report(&test, event);
        })
    };

    let on_complete = {
        let state = Rc::clone(state);
        let test = Rc::clone(&test);
        let terminated = Rc::clone(&terminated);
        let next = Rc::clone(&next);
        Rc::new(move || {
            if terminated.replace(true) {
                warn!(
                    test = %test.name(),
                    "ignoring completion reported after the test case ended"
                );
                return;
            }
            let time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            debug!(test = %test.name(), time_ms, "test case finished");
            state.report(&test, Event::Finish { time_ms });
            continue_with(&next);
        })
    };

    let on_exception = {
        let state = Rc::clone(state);
        let test = Rc::clone(&test);
        Rc::new(move |details: ExceptionDetails| {
            if terminated.replace(true) {
                warn!(
                    test = %test.name(),
                    message = %details.message,
                    "ignoring exception reported after the test case ended"
                );
                return;
            }
            debug!(test = %test.name(), message = %details.message, "test case raised");
            state.report(&test, Event::Exception { details });
            continue_with(&next);
        })
    };

    test.run(
        &state.env,
        RunHooks {
            on_event,
            on_complete,
            on_exception,
        },
        stop_at_offset,
    );
}

fn continue_with(next: &RefCell<Option<Continuation>>) {
    let next = next.borrow_mut().take();
    if let Some(next) = next {
        next();
    }
}
