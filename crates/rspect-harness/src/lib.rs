//! Runner side of the rspect test framework.
//!
//! This crate provides:
//! - Execution: [`TestContext`] registers a [`rspect_core::TestModule`] and drives its group
//!   tree with ordered lifecycle hooks
//! - Reporting: the [`TestReporter`] event interface, a recording reporter and a structured
//!   JSONL log reporter
//! - Results: [`RunSummary`] with per-group and per-test detail
//! - Configuration: [`HarnessConfig`] loaded from JSON with `RSPECT_*` environment overrides
//! - Self-check: [`SmokeModule`], an all-passing module covering every assertion kind

pub mod config;
pub mod context;
pub mod error;
pub mod group;
pub mod log_reporter;
pub mod reporter;
pub mod smoke;
pub mod structured_log;
pub mod summary;

pub use config::{ConfigError, HarnessConfig, PerformanceOptions};
pub use context::{RunState, TestContext};
pub use error::RunError;
pub use group::{HookFailure, TestGroup, TestOutcome, TestRecord};
pub use log_reporter::LogReporter;
pub use reporter::{EmptyReporter, RecordingReporter, ReporterEvent, TestReporter};
pub use smoke::SmokeModule;
pub use summary::{GroupSummary, RunSummary};
