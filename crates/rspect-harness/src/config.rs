//! Harness configuration.
//!
//! Loaded from JSON, then overridden from the environment:
//! - `RSPECT_LOG`: path of the structured JSONL run log (empty disables it)
//! - `RSPECT_PERFORMANCE`: enable performance sampling (`on`/`off`, `true`/`false`, `1`/`0`)
//!
//! The execution state machine reads only the negated-test message. Performance options are
//! handed to reporters untouched.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LOG_ENV: &str = "RSPECT_LOG";
pub const PERFORMANCE_ENV: &str = "RSPECT_PERFORMANCE";

/// Reported when a negated test returns normally and registered no message of its own.
pub const DEFAULT_NEGATED_MESSAGE: &str = "Expected test to throw, but it did not.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Sampling bounds for the benchmarking add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceOptions {
    pub performance_enabled: bool,
    pub min_samples: u32,
    pub max_samples: u32,
    pub min_test_run_time_ms: u64,
    pub max_test_run_time_ms: u64,
}

impl Default for PerformanceOptions {
    fn default() -> Self {
        Self {
            performance_enabled: false,
            min_samples: 10,
            max_samples: 10_000,
            min_test_run_time_ms: 1_000,
            max_test_run_time_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub performance: PerformanceOptions,
    pub negated_test_message: String,
    pub log_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            performance: PerformanceOptions::default(),
            negated_test_message: DEFAULT_NEGATED_MESSAGE.to_string(),
            log_path: None,
        }
    }
}

impl HarnessConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Defaults plus process environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `RSPECT_*` overrides read through `lookup`.
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(LOG_ENV) {
            let path = path.trim();
            self.log_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(raw) = lookup(PERFORMANCE_ENV)
            && let Some(enabled) = parse_flag(&raw)
        {
            self.performance.performance_enabled = enabled;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let perf = &self.performance;
        if perf.min_samples > perf.max_samples {
            return Err(ConfigError::Invalid {
                field: "min_samples",
                reason: format!(
                    "{} exceeds max_samples {}",
                    perf.min_samples, perf.max_samples
                ),
            });
        }
        if perf.min_test_run_time_ms > perf.max_test_run_time_ms {
            return Err(ConfigError::Invalid {
                field: "min_test_run_time_ms",
                reason: format!(
                    "{} exceeds max_test_run_time_ms {}",
                    perf.min_test_run_time_ms, perf.max_test_run_time_ms
                ),
            });
        }
        if self.negated_test_message.is_empty() {
            return Err(ConfigError::Invalid {
                field: "negated_test_message",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a loose boolean. Unrecognized values yield `None`.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" | "enabled" => Some(true),
        "0" | "false" | "off" | "no" | "disabled" | "" => Some(false),
        _ => None,
    }
}
