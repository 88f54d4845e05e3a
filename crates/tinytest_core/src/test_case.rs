//! Test case definitions and single-shot execution.

use crate::config::NamingConfig;
use crate::fault;
use crate::recorder::Recorder;
use crate::run::RunEnv;
use crate::types::{Cookie, Event, ExceptionDetails, TestMode};
use std::fmt;
use std::rc::Rc;

/// Body of a synchronous test case.
pub type SyncBody = Rc<dyn Fn(&Recorder) -> anyhow::Result<()>>;

/// Body of an asynchronous test case.
pub type AsyncBody = Rc<dyn Fn(Recorder, Done) -> anyhow::Result<()>>;

/// A test body together with its execution mode.
#[derive(Clone)]
pub enum Body {
    Sync(SyncBody),
    Async(AsyncBody),
}

/// Completion token handed to asynchronous bodies.
///
/// The body must call [`Done::complete`] exactly once. Completing consumes the
/// token; dropping it without completing leaves the run waiting forever, and
/// completing after reporting an exception through the recorder is undefined.
pub struct Done {
    on_complete: Rc<dyn Fn()>,
}

impl Done {
    fn new(on_complete: Rc<dyn Fn()>) -> Self {
        Self { on_complete }
    }

    /// Signals that the asynchronous body has finished.
    pub fn complete(self) {
        (self.on_complete)();
    }
}

/// Callbacks a test case reports to while it runs.
pub struct RunHooks {
    /// Receives every assertion event, synchronously.
    pub on_event: Rc<dyn Fn(Event)>,
    /// Called when the body completes normally.
    pub on_complete: Rc<dyn Fn()>,
    /// Called when the body raises, or reports an exception through the recorder.
    pub on_exception: Rc<dyn Fn(ExceptionDetails)>,
}

/// An immutable, named unit of test logic.
pub struct TestCase {
    name: String,
    group_path: Vec<String>,
    short_name: String,
    body: Body,
}

impl TestCase {
    /// Creates a test case with an explicit body.
    ///
    /// `name` is split on `naming.delimiter`; the trimmed last segment becomes
    /// the short name and the rest, prefixed with `naming.root_label`, the
    /// group path.
    pub fn new(name: impl Into<String>, naming: &NamingConfig, body: Body) -> Self {
        let name = name.into();
        let (group_path, short_name) = split_name(&name, naming);
        Self {
            name,
            group_path,
            short_name,
            body,
        }
    }

    /// Creates a synchronous test case.
    pub fn new_sync<F>(name: impl Into<String>, naming: &NamingConfig, body: F) -> Self
    where
        F: Fn(&Recorder) -> anyhow::Result<()> + 'static,
    {
        Self::new(name, naming, Body::Sync(Rc::new(body)))
    }

    /// Creates an asynchronous test case.
    pub fn new_async<F>(name: impl Into<String>, naming: &NamingConfig, body: F) -> Self
    where
        F: Fn(Recorder, Done) -> anyhow::Result<()> + 'static,
    {
        Self::new(name, naming, Body::Async(Rc::new(body)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group_path(&self) -> &[String] {
        &self.group_path
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn mode(&self) -> TestMode {
        match self.body {
            Body::Sync(_) => TestMode::Sync,
            Body::Async(_) => TestMode::Async,
        }
    }

    /// Locator for the failure at `offset` within this test.
    pub fn cookie(&self, offset: usize) -> Cookie {
        Cookie {
            name: self.name.clone(),
            offset,
            group_path: self.group_path.clone(),
            short_name: self.short_name.clone(),
        }
    }

    /// Runs the body once on a later turn of the run's scheduler.
    ///
    /// Exactly one of `hooks.on_complete` or `hooks.on_exception` is called,
    /// never from within this call. For async bodies completion is up to the
    /// body's [`Done`] token.
    pub fn run(self: &Rc<Self>, env: &RunEnv, hooks: RunHooks, stop_at_offset: Option<usize>) {
        let recorder = Recorder::new(
            Rc::clone(self),
            hooks.on_event.clone(),
            hooks.on_exception.clone(),
            env.clone(),
            stop_at_offset,
        );
        let test = Rc::clone(self);
        env.scheduler
            .schedule(Box::new(move || test.invoke(recorder, hooks)));
    }

    fn invoke(&self, recorder: Recorder, hooks: RunHooks) {
        let RunHooks {
            on_complete,
            on_exception,
            ..
        } = hooks;

        // Ok(true): finished synchronously. Ok(false): waiting on `Done`.
        let outcome = fault::contain(|| match &self.body {
            Body::Sync(body) => body(&recorder).map(|()| true),
            Body::Async(body) => {
                body(recorder.clone(), Done::new(on_complete.clone())).map(|()| false)
            }
        });

        match outcome {
            Ok(Ok(true)) => on_complete(),
            Ok(Ok(false)) => {}
            Ok(Err(error)) => on_exception(ExceptionDetails::from_error(&error)),
            Err(fault) => on_exception(ExceptionDetails::from_panic(fault)),
        }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("group_path", &self.group_path)
            .field("short_name", &self.short_name)
            .field("mode", &self.mode())
            .finish()
    }
}

fn split_name(name: &str, naming: &NamingConfig) -> (Vec<String>, String) {
    let mut parts: Vec<String> = name
        .split(naming.delimiter.as_str())
        .map(|part| part.trim().to_string())
        .collect();
    let short_name = parts.pop().unwrap_or_default();

    let mut group_path = Vec::with_capacity(parts.len() + 1);
    group_path.push(naming.root_label.clone());
    group_path.extend(parts);
    (group_path, short_name)
}
