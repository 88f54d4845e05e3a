//! E2E test harness for tinytest.
//!
//! This module contains test infrastructure with builders, variants and
//! helpers that not every scenario uses.

#![allow(dead_code)]

pub mod scenario;

// Re-export commonly used types
pub use assertions::Assertion;
pub use runner::Report;
pub use scenario::Scenario;
