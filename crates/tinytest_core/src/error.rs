//! Error types for tinytest_core operations.
//!
//! Only configuration errors surface here. Assertion failures and test-body
//! exceptions are turned into report events and never escape a run.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for registry, replay and configuration operations.
#[derive(Error, Debug)]
pub enum TinytestError {
    /// A test case with the same name is already registered.
    #[error("every test needs a unique name, but there are two tests named '{name}'")]
    DuplicateTest {
        /// The conflicting test name
        name: String,
    },

    /// A replay cookie referenced a test that is not in the run.
    #[error("no such test '{name}'")]
    NoSuchTest {
        /// The name carried by the cookie
        name: String,
    },

    /// A replay cookie could not be parsed.
    #[error("invalid cookie: {0}")]
    InvalidCookie(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The configuration file exists but could not be read.
    #[error("failed to read {}: {}", path.display(), source)]
    ConfigRead {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TinytestError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateTest { .. } => {
                Some("Rename one of the tests; names are split on ' - ' into a group path and must be unique.")
            }
            Self::NoSuchTest { .. } => {
                Some("The test may have been renamed since the cookie was recorded. Run 'tinytest list' to see current names.")
            }
            Self::InvalidCookie(_) => Some(
                "Pass the cookie exactly as reported by a fail event, e.g. {\"name\":\"group - test\",\"offset\":0}.",
            ),
            Self::ConfigError(_) | Self::ConfigRead { .. } => {
                Some("Check tinytest.toml; delete it to fall back to the defaults.")
            }
            Self::Io(_) => None,
        }
    }
}

/// Convenience Result type for tinytest_core operations.
pub type Result<T> = std::result::Result<T, TinytestError>;
