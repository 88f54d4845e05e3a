//! Process-level entry point tying a registry to its collaborators.

use crate::breakpoint::{Breakpoint, NoopBreakpoint};
use crate::config::Config;
use crate::error::Result;
use crate::recorder::Recorder;
use crate::registry::Registry;
use crate::run::{RunEnv, TestRun};
use crate::scheduler::DeferQueue;
use crate::test_case::Done;
use crate::types::{Cookie, Envelope};
use std::cell::Cell;
use std::rc::Rc;

/// Owns a registry, the deferred-task queue and the breakpoint used for replays.
///
/// Every harness is independent; create one per isolated suite.
pub struct Harness {
    registry: Registry,
    queue: DeferQueue,
    breakpoint: Rc<dyn Breakpoint>,
    config: Config,
}

impl Harness {
    /// Creates a harness with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            registry: Registry::with_naming(config.naming.clone()),
            queue: DeferQueue::new(),
            breakpoint: Rc::new(NoopBreakpoint),
            config,
        }
    }

    /// Replaces the breakpoint triggered by [`Harness::debug_one`].
    pub fn with_breakpoint(mut self, breakpoint: impl Breakpoint + 'static) -> Self {
        self.breakpoint = Rc::new(breakpoint);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The queue test bodies are scheduled on.
    pub fn queue(&self) -> &DeferQueue {
        &self.queue
    }

    /// Registers a synchronous test case.
    pub fn add<F>(&mut self, name: impl Into<String>, body: F) -> Result<()>
    where
        F: Fn(&Recorder) -> anyhow::Result<()> + 'static,
    {
        self.registry.add(name, body)
    }

    /// Registers an asynchronous test case.
    pub fn add_async<F>(&mut self, name: impl Into<String>, body: F) -> Result<()>
    where
        F: Fn(Recorder, Done) -> anyhow::Result<()> + 'static,
    {
        self.registry.add_async(name, body)
    }

    fn env(&self) -> RunEnv {
        RunEnv::new(Rc::new(self.queue.clone()))
            .with_breakpoint(Rc::clone(&self.breakpoint))
            .with_config(&self.config)
    }

    fn create_run<R>(&self, on_report: R) -> TestRun
    where
        R: Fn(Envelope) + 'static,
    {
        self.registry.create_run(Rc::new(on_report), self.env())
    }

    /// Runs every registered test.
    ///
    /// Work happens as the queue is driven; `on_complete` fires after the
    /// last test's terminal event.
    pub fn run_all<R, C>(&self, on_report: R, on_complete: C)
    where
        R: Fn(Envelope) + 'static,
        C: FnOnce() + 'static,
    {
        self.create_run(on_report).run(on_complete);
    }

    /// Replays the test named by `cookie` up to its failure at `cookie.offset`.
    pub fn debug_one<R, C>(&self, cookie: &Cookie, on_report: R, on_complete: C) -> Result<()>
    where
        R: Fn(Envelope) + 'static,
        C: FnOnce() + 'static,
    {
        self.create_run(on_report).debug(cookie, on_complete)
    }

    /// [`Harness::run_all`], then drives the queue until idle.
    ///
    /// Returns false if the run never completed, i.e. an async body dropped
    /// its completion token.
    pub fn run_all_to_completion<R>(&self, on_report: R) -> bool
    where
        R: Fn(Envelope) + 'static,
    {
        let completed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&completed);
        self.run_all(on_report, move || flag.set(true));
        self.queue.run_until_idle();
        completed.get()
    }

    /// [`Harness::debug_one`], then drives the queue until idle.
    pub fn debug_one_to_completion<R>(&self, cookie: &Cookie, on_report: R) -> Result<bool>
    where
        R: Fn(Envelope) + 'static,
    {
        let completed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&completed);
        self.debug_one(cookie, on_report, move || flag.set(true))?;
        self.queue.run_until_idle();
        Ok(completed.get())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
