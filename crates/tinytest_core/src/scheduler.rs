//! Deferred execution of test bodies.
//!
//! Test bodies never run inside the caller's stack frame; they are handed to
//! a [`Scheduler`] and run on a later turn.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Runs tasks on a later turn, FIFO per caller.
pub trait Scheduler {
    /// Queues `task` to run after the current turn.
    fn schedule(&self, task: Task);
}

/// Single-threaded FIFO task queue.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct DeferQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl DeferQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Runs the oldest task, if any. Returns false when the queue was empty.
    pub fn run_one(&self) -> bool {
        // The borrow must end before the task runs; tasks schedule more tasks.
        let next = self.tasks.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Runs tasks until the queue is empty, including tasks scheduled meanwhile.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }
}

impl Scheduler for DeferQueue {
    fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}
