//! Reporter that writes the structured JSONL run log.

use std::io;

use serde_json::json;

use crate::config::PerformanceOptions;
use crate::group::{TestGroup, TestOutcome, TestRecord};
use crate::reporter::TestReporter;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use crate::summary::RunSummary;

/// Turns reporter events into [`LogEntry`] lines.
///
/// Reporter callbacks cannot fail, so the first write error is kept and surfaced by
/// [`LogReporter::finish`].
pub struct LogReporter {
    emitter: LogEmitter,
    error: Option<io::Error>,
}

impl LogReporter {
    #[must_use]
    pub fn new(emitter: LogEmitter) -> Self {
        Self {
            emitter,
            error: None,
        }
    }

    /// Flush and return the first write error, if any.
    pub fn finish(mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.emitter.flush()
    }

    fn write(&mut self, entry: LogEntry) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.emitter.emit_entry(entry) {
            self.error = Some(err);
        }
    }
}

fn outcome_of(test: &TestRecord) -> Outcome {
    match test.outcome {
        Some(TestOutcome::Pass) => Outcome::Pass,
        Some(TestOutcome::Fail) => Outcome::Fail,
        Some(TestOutcome::Skip) | None => Outcome::Skip,
    }
}

fn millis(ns: u64) -> u64 {
    ns / 1_000_000
}

impl TestReporter for LogReporter {
    fn on_start(&mut self, module: &str, performance: &PerformanceOptions) {
        let entry = LogEntry::new("", LogLevel::Info, "run_start")
            .with_module(module)
            .with_details(json!({ "performance": performance }));
        self.write(entry);
    }

    fn on_group_start(&mut self, group: &TestGroup) {
        let entry = LogEntry::new("", LogLevel::Debug, "group_start").with_group(&group.path);
        self.write(entry);
    }

    fn on_group_finish(&mut self, group: &TestGroup) {
        let (level, outcome) = if group.passed {
            (LogLevel::Info, Outcome::Pass)
        } else {
            (LogLevel::Error, Outcome::Fail)
        };
        let mut entry = LogEntry::new("", level, "group_finish")
            .with_group(&group.path)
            .with_outcome(outcome)
            .with_duration_ms(millis(group.duration_ns))
            .with_details(json!({
                "cancelled": group.cancelled,
                "duration_ns": group.duration_ns,
                "logs": group.logs,
            }));
        if let Some(failure) = &group.hook_failure {
            entry = entry.with_message(format!("{} hook failed: {}", failure.kind.name(), failure.message));
            if let Some(location) = &failure.location {
                entry = entry.with_location(location);
            }
        }
        self.write(entry);
    }

    fn on_test_start(&mut self, group: &TestGroup, test: &TestRecord) {
        let entry = LogEntry::new("", LogLevel::Trace, "test_start")
            .with_group(&group.path)
            .with_test(&test.name);
        self.write(entry);
    }

    fn on_test_finish(&mut self, group: &TestGroup, test: &TestRecord) {
        let outcome = outcome_of(test);
        let level = match outcome {
            Outcome::Pass | Outcome::Todo => LogLevel::Info,
            Outcome::Skip => LogLevel::Warn,
            Outcome::Fail => LogLevel::Error,
        };
        let mut entry = LogEntry::new("", level, "test_finish")
            .with_group(&group.path)
            .with_test(&test.name)
            .with_outcome(outcome)
            .with_duration_ms(millis(test.duration_ns))
            .with_details(json!({
                "negated": test.negated,
                "duration_ns": test.duration_ns,
                "actual": test.actual,
                "expected": test.expected,
                "logs": test.logs,
            }));
        if let Some(message) = &test.message {
            entry = entry.with_message(message);
        }
        if let Some(location) = &test.location {
            entry = entry.with_location(location);
        }
        self.write(entry);
    }

    fn on_todo(&mut self, group: &TestGroup, name: &str) {
        let entry = LogEntry::new("", LogLevel::Info, "test_todo")
            .with_group(&group.path)
            .with_test(name)
            .with_outcome(Outcome::Todo);
        self.write(entry);
    }

    fn on_debug_halt(&mut self, group: &TestGroup, test: Option<&TestRecord>) {
        let mut entry = LogEntry::new("", LogLevel::Debug, "debug_halt").with_group(&group.path);
        if let Some(test) = test {
            entry = entry.with_test(&test.name);
        }
        self.write(entry);
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        let (level, outcome) = if summary.pass {
            (LogLevel::Info, Outcome::Pass)
        } else {
            (LogLevel::Error, Outcome::Fail)
        };
        let entry = LogEntry::new("", level, "run_finish")
            .with_module(&summary.module)
            .with_outcome(outcome)
            .with_duration_ms(millis(summary.duration_ns))
            .with_details(json!({
                "total": summary.total,
                "passed": summary.passed,
                "failed": summary.failed,
                "skipped": summary.skipped,
                "todos": summary.todos,
            }));
        self.write(entry);
    }
}
