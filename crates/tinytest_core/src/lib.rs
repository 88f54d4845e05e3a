//! tinytest Core Library
//!
//! A minimal test-execution engine, providing:
//! - A registry of named test cases
//! - Strictly sequential execution with isolation between cases
//! - A live, structured report stream
//! - Deterministic replay up to a recorded failure ("debug-to-failure")
//!
//! # Quick Start
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tinytest_core::{Event, Harness};
//!
//! let mut harness = Harness::new();
//! harness
//!     .add("math - addition", |t| {
//!         t.equal(&(2 + 2), &4);
//!         t.is_true(1 + 1 == 3);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let events = Rc::new(RefCell::new(Vec::new()));
//! let sink = events.clone();
//! let completed = harness.run_all_to_completion(move |envelope| {
//!     sink.borrow_mut().extend(envelope.events);
//! });
//!
//! assert!(completed);
//! let kinds: Vec<&str> = events.borrow().iter().map(Event::kind).collect();
//! assert_eq!(kinds, ["ok", "fail", "finish"]);
//! ```
//!
//! # Features
//!
//! ## Asynchronous Test Cases
//!
//! Async bodies receive a [`Done`] token and may defer work before completing:
//!
//! ```
//! use tinytest_core::Harness;
//!
//! let mut harness = Harness::new();
//! harness
//!     .add_async("timers - deferred", |t, done| {
//!         let recorder = t.clone();
//!         t.defer(move || {
//!             recorder.equal(&"later", &"later");
//!             done.complete();
//!         });
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert!(harness.run_all_to_completion(|_| {}));
//! ```
//!
//! ## Debug-to-Failure
//!
//! Every `fail` event carries a [`Cookie`]. Replaying with it re-runs just that
//! test and triggers the [`Breakpoint`] right after the same failure:
//!
//! ```
//! use tinytest_core::{Cookie, Harness, RecordingBreakpoint};
//!
//! let breakpoint = RecordingBreakpoint::new();
//! let mut harness = Harness::new().with_breakpoint(breakpoint.clone());
//! harness
//!     .add("parser - rejects junk", |t| {
//!         t.is_true(false);
//!         t.is_false(true);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let cookie = Cookie::new("parser - rejects junk", 1);
//! harness.debug_one_to_completion(&cookie, |_| {}).unwrap();
//! assert_eq!(breakpoint.hits()[0].offset, 1);
//! ```

mod breakpoint;
mod config;
mod error;
mod fault;
mod harness;
mod recorder;
mod registry;
mod run;
mod scheduler;
mod summary;
mod test_case;
mod types;
mod value;

pub use breakpoint::{Breakpoint, NoopBreakpoint, RecordingBreakpoint};
pub use config::{
    AssertionConfig, Config, DebugConfig, ExpectedFailurePolicy, NamingConfig, CONFIG_FILE_NAME,
};
pub use error::{Result, TinytestError};
pub use harness::Harness;
pub use recorder::Recorder;
pub use registry::Registry;
pub use run::{ReportSink, RunEnv, TestRun};
pub use scheduler::{DeferQueue, Scheduler, Task};
pub use summary::{RunSummary, TestOutcome, TestRecord};
pub use test_case::{AsyncBody, Body, Done, RunHooks, SyncBody, TestCase};
pub use types::*;
pub use value::{HasLength, Opaque, Value};
