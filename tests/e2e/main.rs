//! End-to-end scenarios driving the public tinytest API.

mod harness;
mod scenarios;
