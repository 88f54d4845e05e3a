//! Interactive breakpoint requests for debug-to-failure replay.

use crate::types::Cookie;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Pauses execution so a developer can inspect the state at a failure.
///
/// Implementations are best-effort: an environment that cannot pause should
/// return immediately rather than abort.
pub trait Breakpoint {
    /// Called once, inline, right after the failure at `cookie.offset` is recorded.
    fn trigger(&self, cookie: &Cookie);
}

/// Breakpoint for non-interactive environments; logs and returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBreakpoint;

impl Breakpoint for NoopBreakpoint {
    fn trigger(&self, cookie: &Cookie) {
        info!(
            test = %cookie.name,
            offset = cookie.offset,
            "breakpoint requested in a non-interactive environment"
        );
    }
}

/// Breakpoint that records every request, for asserting on replays.
#[derive(Debug, Default, Clone)]
pub struct RecordingBreakpoint {
    hits: Rc<RefCell<Vec<Cookie>>>,
}

impl RecordingBreakpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookies of every request so far, oldest first.
    pub fn hits(&self) -> Vec<Cookie> {
        self.hits.borrow().clone()
    }
}

impl Breakpoint for RecordingBreakpoint {
    fn trigger(&self, cookie: &Cookie) {
        self.hits.borrow_mut().push(cookie.clone());
    }
}

impl<F> Breakpoint for F
where
    F: Fn(&Cookie),
{
    fn trigger(&self, cookie: &Cookie) {
        self(cookie)
    }
}
