//! Reporter interface and the in-process reporters.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::PerformanceOptions;
use crate::group::{TestGroup, TestOutcome, TestRecord};
use crate::summary::RunSummary;

/// Receives run events in execution order. Every method defaults to a no-op.
pub trait TestReporter {
    fn on_start(&mut self, _module: &str, _performance: &PerformanceOptions) {}

    fn on_group_start(&mut self, _group: &TestGroup) {}

    fn on_group_finish(&mut self, _group: &TestGroup) {}

    fn on_test_start(&mut self, _group: &TestGroup, _test: &TestRecord) {}

    /// Also called for tests skipped by a cancelled group.
    fn on_test_finish(&mut self, _group: &TestGroup, _test: &TestRecord) {}

    fn on_todo(&mut self, _group: &TestGroup, _name: &str) {}

    /// The running code requested a debugger halt.
    fn on_debug_halt(&mut self, _group: &TestGroup, _test: Option<&TestRecord>) {}

    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyReporter;

impl TestReporter for EmptyReporter {}

/// A reporter event with the identifying names copied out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReporterEvent {
    Start { module: String },
    GroupStart { group: String },
    GroupFinish { group: String, passed: bool },
    TestStart { group: String, test: String },
    TestFinish {
        group: String,
        test: String,
        outcome: Option<TestOutcome>,
    },
    Todo { group: String, name: String },
    DebugHalt { group: String, test: Option<String> },
    Finish { pass: bool },
}

/// Records events into a shared list.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<ReporterEvent>>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<ReporterEvent> {
        self.events.lock().clone()
    }

    /// Shared handle to the event list.
    #[must_use]
    pub fn handle(&self) -> Arc<Mutex<Vec<ReporterEvent>>> {
        Arc::clone(&self.events)
    }

    fn push(&self, event: ReporterEvent) {
        self.events.lock().push(event);
    }
}

impl TestReporter for RecordingReporter {
    fn on_start(&mut self, module: &str, _performance: &PerformanceOptions) {
        self.push(ReporterEvent::Start {
            module: module.to_string(),
        });
    }

    fn on_group_start(&mut self, group: &TestGroup) {
        self.push(ReporterEvent::GroupStart {
            group: group.path.clone(),
        });
    }

    fn on_group_finish(&mut self, group: &TestGroup) {
        self.push(ReporterEvent::GroupFinish {
            group: group.path.clone(),
            passed: group.passed,
        });
    }

    fn on_test_start(&mut self, group: &TestGroup, test: &TestRecord) {
        self.push(ReporterEvent::TestStart {
            group: group.path.clone(),
            test: test.name.clone(),
        });
    }

    fn on_test_finish(&mut self, group: &TestGroup, test: &TestRecord) {
        self.push(ReporterEvent::TestFinish {
            group: group.path.clone(),
            test: test.name.clone(),
            outcome: test.outcome,
        });
    }

    fn on_todo(&mut self, group: &TestGroup, name: &str) {
        self.push(ReporterEvent::Todo {
            group: group.path.clone(),
            name: name.to_string(),
        });
    }

    fn on_debug_halt(&mut self, group: &TestGroup, test: Option<&TestRecord>) {
        self.push(ReporterEvent::DebugHalt {
            group: group.path.clone(),
            test: test.map(|t| t.name.clone()),
        });
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        self.push(ReporterEvent::Finish { pass: summary.pass });
    }
}
