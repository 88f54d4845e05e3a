//! Core data types for the tinytest report stream.

use crate::fault::Fault;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Free-form details attached to `ok`/`fail` events.
pub type Details = serde_json::Map<String, serde_json::Value>;

/// Execution mode of a test case body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMode {
    /// Body returns when the test is done.
    Sync,

    /// Body receives a completion token and must complete it exactly once.
    Async,
}

/// Locator for "the Nth failure inside test `name`".
///
/// Produced by `fail`/`expected_fail` events and consumed only by replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Full registered test name.
    pub name: String,
    /// Zero-based failure index within one execution of the test.
    pub offset: usize,
    /// Group path of the test.
    #[serde(default)]
    pub group_path: Vec<String>,
    /// Short name of the test.
    #[serde(default)]
    pub short_name: String,
}

impl Cookie {
    /// Builds a cookie that only names the test and offset.
    pub fn new(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            group_path: Vec::new(),
            short_name: String::new(),
        }
    }
}

/// Payload of an `exception` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionDetails {
    /// Display form of the raised error or panic payload.
    pub message: String,
    /// Cause chain and backtrace, as far as they were captured.
    pub stack: String,
}

impl ExceptionDetails {
    /// Describes an error returned by a test body.
    pub fn from_error(error: &anyhow::Error) -> Self {
        Self {
            message: error.to_string(),
            stack: format!("{:?}", error),
        }
    }

    /// Describes a panic caught at the fault boundary.
    pub(crate) fn from_panic(fault: Fault) -> Self {
        Self {
            stack: fault.stack(),
            message: fault.message,
        }
    }
}

/// One entry in the report stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An assertion passed.
    Ok {
        /// Optional details supplied by the assertion.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Details>,
    },

    /// An assertion failed.
    Fail {
        /// What was compared and how it differed.
        details: Details,
        /// Locator used to replay up to this failure.
        cookie: Cookie,
    },

    /// An assertion failed right after `expect_fail()`.
    ExpectedFail {
        /// What was compared and how it differed.
        details: Details,
        /// Locator used to replay up to this failure.
        cookie: Cookie,
    },

    /// The test body raised; terminal.
    Exception {
        /// Message and stack of the raised value.
        details: ExceptionDetails,
    },

    /// The test body completed; terminal.
    Finish {
        /// Wall-clock time spent in the test case.
        #[serde(rename = "timeMs")]
        time_ms: u64,
    },
}

impl Event {
    /// Returns true for `finish` and `exception`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Finish { .. } | Event::Exception { .. })
    }

    /// The cookie of a `fail`/`expected_fail` event.
    pub fn cookie(&self) -> Option<&Cookie> {
        match self {
            Event::Fail { cookie, .. } | Event::ExpectedFail { cookie, .. } => Some(cookie),
            _ => None,
        }
    }

    /// The wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Ok { .. } => "ok",
            Event::Fail { .. } => "fail",
            Event::ExpectedFail { .. } => "expected_fail",
            Event::Exception { .. } => "exception",
            Event::Finish { .. } => "finish",
        }
    }
}

/// Unit delivered to the report sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Group path of the owning test.
    pub group_path: Vec<String>,
    /// Short name of the owning test.
    pub test: String,
    /// Events, a single one while a run is live; empty when a run announces its tests.
    pub events: Vec<Event>,
}

/// Identifier stamped on each recorder, for the test body's own use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
