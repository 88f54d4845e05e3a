//! Configuration types for tinytest runs.

use crate::error::{Result, TinytestError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File name looked up by [`Config::load_from_dir`].
pub const CONFIG_FILE_NAME: &str = "tinytest.toml";

/// Comprehensive configuration for a tinytest harness.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// How test names are decomposed into group paths.
    #[serde(default)]
    pub naming: NamingConfig,

    /// Debug-to-failure replay settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Assertion recording behavior.
    #[serde(default)]
    pub assertions: AssertionConfig,
}

impl Config {
    /// Load configuration from a file, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|source| TinytestError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `tinytest.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(CONFIG_FILE_NAME))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| TinytestError::ConfigError(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TinytestError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.naming.delimiter.is_empty() {
            return Err(TinytestError::ConfigError(
                "naming.delimiter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Test name decomposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamingConfig {
    /// Label prepended to every group path (default: "tinytest").
    pub root_label: String,

    /// Separator between group segments in a test name (default: " - ").
    pub delimiter: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            root_label: "tinytest".to_string(),
            delimiter: " - ".to_string(),
        }
    }
}

/// Debug-to-failure replay settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebugConfig {
    /// A breakpoint request that returns sooner than this is assumed to have
    /// had no debugger attached (default: 100).
    pub attach_threshold_ms: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            attach_threshold_ms: 100,
        }
    }
}

impl DebugConfig {
    /// Returns the attach threshold as a Duration.
    pub fn attach_threshold(&self) -> Duration {
        Duration::from_millis(self.attach_threshold_ms)
    }
}

/// Assertion recording behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AssertionConfig {
    /// What happens when `expect_fail()` is followed by a passing assertion.
    #[serde(default)]
    pub expected_failure_policy: ExpectedFailurePolicy,
}

/// Outcome of an `expect_fail()` that is followed by a passing assertion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedFailurePolicy {
    /// Emit `ok` annotated with `was_expecting_failure`.
    #[default]
    Permissive,

    /// Emit a `fail` of type `expected_fail_missing`.
    Strict,
}
