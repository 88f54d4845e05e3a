//! Panic containment for test bodies and deferred callbacks.
//!
//! A process-wide panic hook is installed once. While a thread is inside
//! [`contain`], the hook records where the panic happened instead of printing
//! the default "thread panicked" message; outside of it the previous hook
//! runs unchanged.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static CONTAIN_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_SITE: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Where a contained panic was raised, captured while the stack was still live.
#[derive(Debug)]
struct PanicSite {
    location: Option<String>,
    backtrace: Option<String>,
}

/// A panic caught by [`contain`].
#[derive(Debug)]
pub(crate) struct Fault {
    pub(crate) message: String,
    /// `file:line:column` of the panic.
    pub(crate) location: Option<String>,
    /// Only present when backtraces are enabled (`RUST_BACKTRACE`).
    pub(crate) backtrace: Option<String>,
}

impl Fault {
    /// Human-readable stack text naming the panic site.
    pub(crate) fn stack(&self) -> String {
        let mut stack = match &self.location {
            Some(location) => format!("panicked at {}: {}", location, self.message),
            None => format!("panicked: {}", self.message),
        };
        if let Some(backtrace) = &self.backtrace {
            stack.push('\n');
            stack.push_str(backtrace);
        }
        stack
    }
}

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CONTAIN_DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let backtrace = Backtrace::capture();
            let site = PanicSite {
                location: info.location().map(|l| l.to_string()),
                backtrace: match backtrace.status() {
                    BacktraceStatus::Captured => Some(backtrace.to_string()),
                    _ => None,
                },
            };
            LAST_SITE.with(|last| *last.borrow_mut() = Some(site));
        }));
    });
}

/// Runs `f`, turning a panic into a [`Fault`].
///
/// Nested calls are fine; each one sees the site of the panic it caught.
pub(crate) fn contain<R>(f: impl FnOnce() -> R) -> Result<R, Fault> {
    install_hook();
    CONTAIN_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAIN_DEPTH.with(|depth| depth.set(depth.get() - 1));

    outcome.map_err(|payload| {
        let site = LAST_SITE.with(|last| last.borrow_mut().take());
        let (location, backtrace) = match site {
            Some(site) => (site.location, site.backtrace),
            None => (None, None),
        };
        Fault {
            message: panic_message(payload.as_ref()),
            location,
            backtrace,
        }
    })
}

/// Extracts the message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
