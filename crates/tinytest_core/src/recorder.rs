//! Assertion recording for one execution of one test case.
//!
//! A [`Recorder`] is handed to every test body. Each assertion emits exactly
//! one event and never raises; failures carry a [`Cookie`] so the run can be
//! replayed up to that point later.

use crate::config::ExpectedFailurePolicy;
use crate::fault;
use crate::run::RunEnv;
use crate::scheduler::Scheduler;
use crate::test_case::TestCase;
use crate::types::{Cookie, Details, Event, ExceptionDetails, RunId};
use crate::value::{HasLength, Value};
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::cell::Cell;
use std::fmt::Display;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, warn};

pub(crate) type EventSink = Rc<dyn Fn(Event)>;
pub(crate) type ExceptionSink = Rc<dyn Fn(ExceptionDetails)>;

/// Records assertion outcomes as events.
///
/// Cloning yields another handle to the same recorder, so async bodies can
/// move it into deferred callbacks.
#[derive(Clone)]
pub struct Recorder {
    inner: Rc<RecorderState>,
}

struct RecorderState {
    test: Rc<TestCase>,
    on_event: EventSink,
    on_exception: ExceptionSink,
    env: RunEnv,
    /// One-shot: applies to the next assertion outcome only.
    expecting_failure: Cell<bool>,
    fail_count: Cell<usize>,
    stop_at_offset: Cell<Option<usize>>,
    run_id: RunId,
}

impl Recorder {
    pub(crate) fn new(
        test: Rc<TestCase>,
        on_event: EventSink,
        on_exception: ExceptionSink,
        env: RunEnv,
        stop_at_offset: Option<usize>,
    ) -> Self {
        let run_id = RunId::generate();
        debug!(test = %test.name(), %run_id, ?stop_at_offset, "created recorder");
        Self {
            inner: Rc::new(RecorderState {
                test,
                on_event,
                on_exception,
                env,
                expecting_failure: Cell::new(false),
                fail_count: Cell::new(0),
                stop_at_offset: Cell::new(stop_at_offset),
                run_id,
            }),
        }
    }

    /// Unique identifier of this execution, for the test body's own use.
    pub fn run_id(&self) -> RunId {
        self.inner.run_id
    }

    /// Full name of the test being executed.
    pub fn test_name(&self) -> &str {
        self.inner.test.name()
    }

    /// Number of `fail`/`expected_fail` events emitted so far in this execution.
    pub fn failure_count(&self) -> usize {
        self.inner.fail_count.get()
    }

    /// Runs `task` on a later turn of the run's scheduler.
    ///
    /// A panic inside `task` ends the test case with an `exception` event,
    /// the same as a panic in the body itself.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        let on_exception = Rc::clone(&self.inner.on_exception);
        self.inner.env.scheduler.schedule(Box::new(move || {
            if let Err(fault) = fault::contain(task) {
                on_exception(ExceptionDetails::from_panic(fault));
            }
        }));
    }

    /// Records a passing outcome.
    pub fn ok(&self, details: Option<Details>) {
        let mut details = details;
        if self.inner.expecting_failure.replace(false) {
            match self.inner.env.expected_failure_policy {
                ExpectedFailurePolicy::Permissive => {
                    details
                        .get_or_insert_with(Details::new)
                        .insert("was_expecting_failure".to_string(), json!(true));
                }
                ExpectedFailurePolicy::Strict => {
                    let mut details = details.unwrap_or_default();
                    details.insert("type".to_string(), json!("expected_fail_missing"));
                    self.record_failure(details, false);
                    return;
                }
            }
        }
        self.emit(Event::Ok { details });
    }

    /// Marks the next assertion outcome as an expected failure.
    pub fn expect_fail(&self) {
        self.inner.expecting_failure.set(true);
    }

    /// Records a failing outcome.
    pub fn fail(&self, details: Details) {
        let expected = self.inner.expecting_failure.replace(false);
        self.record_failure(details, expected);
    }

    /// Reports an error caught inside an async callback.
    ///
    /// The body should then neither complete its `Done` token nor return an
    /// error itself.
    pub fn exception(&self, error: anyhow::Error) {
        (self.inner.on_exception)(ExceptionDetails::from_error(&error));
    }

    fn emit(&self, event: Event) {
        (self.inner.on_event)(event);
    }

    fn record_failure(&self, details: Details, expected: bool) {
        let offset = self.inner.fail_count.get();
        let cookie = self.inner.test.cookie(offset);
        let event = if expected {
            Event::ExpectedFail {
                details,
                cookie: cookie.clone(),
            }
        } else {
            Event::Fail {
                details,
                cookie: cookie.clone(),
            }
        };
        self.emit(event);
        self.inner.fail_count.set(offset + 1);

        if self.inner.stop_at_offset.get() == Some(offset) {
            self.inner.stop_at_offset.set(None);
            self.request_break(&cookie);
        }
    }

    fn request_break(&self, cookie: &Cookie) {
        let started = Instant::now();
        self.inner.env.breakpoint.trigger(cookie);
        let waited = started.elapsed();
        if waited < self.inner.env.attach_threshold {
            warn!(
                test = %cookie.name,
                offset = cookie.offset,
                waited_ms = waited.as_millis() as u64,
                "breakpoint returned immediately; attach a debugger to use debug-to-failure"
            );
        }
    }

    // ===== Convenience assertions =====

    /// Passes if both values are structurally equal.
    pub fn equal<A, E>(&self, actual: &A, expected: &E)
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        self.compare_serialized(actual, expected, None, false);
    }

    /// [`Recorder::equal`] with a message attached to the failure.
    pub fn equal_msg<A, E>(&self, actual: &A, expected: &E, message: &str)
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        self.compare_serialized(actual, expected, Some(message), false);
    }

    /// Passes if the values differ structurally.
    pub fn not_equal<A, E>(&self, actual: &A, expected: &E)
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        self.compare_serialized(actual, expected, None, true);
    }

    /// [`Recorder::not_equal`] with a message attached to the failure.
    pub fn not_equal_msg<A, E>(&self, actual: &A, expected: &E, message: &str)
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        self.compare_serialized(actual, expected, Some(message), true);
    }

    /// Equality on canonical values; the only way to compare opaque references.
    pub fn equal_values(&self, actual: &Value, expected: &Value) {
        self.compare(actual, expected, None, false);
    }

    /// Inequality on canonical values.
    pub fn not_equal_values(&self, actual: &Value, expected: &Value) {
        self.compare(actual, expected, None, true);
    }

    fn compare_serialized<A, E>(&self, actual: &A, expected: &E, message: Option<&str>, not: bool)
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        match (Value::from_serialize(actual), Value::from_serialize(expected)) {
            (Ok(actual), Ok(expected)) => self.compare(&actual, &expected, message, not),
            (Err(e), _) | (_, Err(e)) => {
                let mut details = detail_map(json!({
                    "type": "assert_equal",
                    "error": format!("value is not serializable: {}", e),
                    "not": not,
                }));
                if let Some(message) = message {
                    details.insert("message".to_string(), json!(message));
                }
                self.fail(details);
            }
        }
    }

    fn compare(&self, actual: &Value, expected: &Value, message: Option<&str>, not: bool) {
        let matched = actual.deep_eq(expected);
        if matched == not {
            let mut details = detail_map(json!({
                "type": "assert_equal",
                "expected": expected.render(),
                "actual": actual.render(),
                "not": not,
            }));
            if let Some(message) = message {
                details.insert("message".to_string(), json!(message));
            }
            self.fail(details);
        } else {
            self.ok(None);
        }
    }

    /// Passes if `obj` is a `T`.
    pub fn instance_of<T: Any>(&self, obj: &dyn Any) {
        if obj.is::<T>() {
            self.ok(None);
        } else {
            self.fail(detail_map(json!({
                "type": "instanceOf",
                "expected": std::any::type_name::<T>(),
            })));
        }
    }

    /// Passes if `obj` has exactly `expected` elements.
    pub fn length<L: HasLength + ?Sized>(&self, obj: &L, expected: usize) {
        let actual = obj.length();
        if actual == expected {
            self.ok(None);
        } else {
            self.fail(detail_map(json!({
                "type": "length",
                "expected": expected,
                "actual": actual,
            })));
        }
    }

    /// Passes if `f` returns an error or panics.
    pub fn throws<T, E, F>(&self, f: F)
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        let message = match fault::contain(f) {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(fault) => Some(fault.message),
        };
        match message {
            Some(message) => self.ok(Some(detail_map(json!({ "message": message })))),
            None => self.fail(detail_map(json!({ "type": "throws" }))),
        }
    }

    /// Passes if `v` is true.
    pub fn is_true(&self, v: bool) {
        if v {
            self.ok(None);
        } else {
            self.fail(detail_map(json!({ "type": "true" })));
        }
    }

    /// Passes if `v` is false.
    pub fn is_false(&self, v: bool) {
        if v {
            self.fail(detail_map(json!({ "type": "false" })));
        } else {
            self.ok(None);
        }
    }
}

fn detail_map(value: serde_json::Value) -> Details {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Details::new(),
    }
}
