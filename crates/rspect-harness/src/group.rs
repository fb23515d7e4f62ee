//! The registered test tree.
//!
//! Groups live in an arena owned by the context; `parent`/`children` are indices into it and
//! index 0 is the synthetic root. Callbacks are stored separately and referenced by
//! [`CallbackId`].

use rspect_core::{HookKind, LogValue, ReportedValue};
use serde::{Deserialize, Serialize};

/// Index into the context's callback table.
pub type CallbackId = usize;

/// Final state of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Pass,
    Fail,
    Skip,
}

/// Lifecycle hooks attached to one group, at most one per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hooks {
    before_all: Option<CallbackId>,
    after_all: Option<CallbackId>,
    before_each: Option<CallbackId>,
    after_each: Option<CallbackId>,
}

impl Hooks {
    #[must_use]
    pub fn get(&self, kind: HookKind) -> Option<CallbackId> {
        match kind {
            HookKind::BeforeAll => self.before_all,
            HookKind::AfterAll => self.after_all,
            HookKind::BeforeEach => self.before_each,
            HookKind::AfterEach => self.after_each,
        }
    }

    /// Replace the hook of `kind`.
    pub fn set(&mut self, kind: HookKind, id: CallbackId) {
        let slot = match kind {
            HookKind::BeforeAll => &mut self.before_all,
            HookKind::AfterAll => &mut self.after_all,
            HookKind::BeforeEach => &mut self.before_each,
            HookKind::AfterEach => &mut self.after_each,
        };
        *slot = Some(id);
    }
}

/// A lifecycle hook that aborted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookFailure {
    pub kind: HookKind,
    pub message: String,
    pub location: Option<String>,
}

/// One registered test and, once run, its result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub name: String,
    /// Expected to abort.
    pub negated: bool,
    /// Reported when a negated test completes normally; empty selects the configured default.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub negated_message: String,
    /// `None` until the test has run or been skipped.
    pub outcome: Option<TestOutcome>,
    pub message: Option<String>,
    pub location: Option<String>,
    pub actual: Option<ReportedValue>,
    pub expected: Option<ReportedValue>,
    pub duration_ns: u64,
    pub logs: Vec<LogValue>,
    #[serde(skip)]
    pub(crate) callback: CallbackId,
}

impl TestRecord {
    pub(crate) fn new(name: &str, negated: bool, negated_message: &str, callback: CallbackId) -> Self {
        Self {
            name: name.to_string(),
            negated,
            negated_message: negated_message.to_string(),
            outcome: None,
            message: None,
            location: None,
            actual: None,
            expected: None,
            duration_ns: 0,
            logs: Vec::new(),
            callback,
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Some(TestOutcome::Pass)
    }

    /// Mark failed, keeping any reported values already captured.
    pub(crate) fn fail(&mut self, message: String, location: Option<String>) {
        self.outcome = Some(TestOutcome::Fail);
        self.message = Some(message);
        self.location = location;
    }
}

/// One `describe` scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TestGroup {
    pub name: String,
    /// Ancestor names joined with `" > "`; empty for the root.
    pub path: String,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub tests: Vec<TestRecord>,
    pub todos: Vec<String>,
    pub hooks: Hooks,
    pub hook_failure: Option<HookFailure>,
    /// Diagnostics logged from `before_all` / `after_all`.
    pub logs: Vec<LogValue>,
    pub started: bool,
    /// Some test or hook in scope aborted the group's remaining work.
    pub cancelled: bool,
    pub passed: bool,
    pub duration_ns: u64,
}

impl TestGroup {
    pub(crate) fn root() -> Self {
        Self::new(String::new(), String::new(), 0, None)
    }

    pub(crate) fn child_of(parent: &Self, parent_index: usize, name: &str) -> Self {
        let path = if parent.path.is_empty() {
            name.to_string()
        } else {
            format!("{} > {name}", parent.path)
        };
        Self::new(name.to_string(), path, parent.depth + 1, Some(parent_index))
    }

    fn new(name: String, path: String, depth: usize, parent: Option<usize>) -> Self {
        Self {
            name,
            path,
            depth,
            parent,
            children: Vec::new(),
            tests: Vec::new(),
            todos: Vec::new(),
            hooks: Hooks::default(),
            hook_failure: None,
            logs: Vec::new(),
            started: false,
            cancelled: false,
            passed: false,
            duration_ns: 0,
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_hook_replaces_earlier() {
        let mut hooks = Hooks::default();
        hooks.set(HookKind::BeforeEach, 3);
        hooks.set(HookKind::BeforeEach, 7);
        assert_eq!(hooks.get(HookKind::BeforeEach), Some(7));
        assert_eq!(hooks.get(HookKind::AfterEach), None);
    }

    #[test]
    fn child_paths_nest() {
        let root = TestGroup::root();
        let a = TestGroup::child_of(&root, 0, "a");
        let b = TestGroup::child_of(&a, 1, "b");
        assert_eq!(a.path, "a");
        assert_eq!(b.path, "a > b");
        assert_eq!(b.depth, 2);
        assert!(root.is_root());
        assert!(!b.is_root());
    }

    #[test]
    fn record_serializes_without_callback() {
        let mut record = TestRecord::new("adds", false, "", 42);
        record.fail("boom".to_string(), Some("lib.rs:1:1".to_string()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"], "fail");
        assert_eq!(json["message"], "boom");
        assert!(json.get("callback").is_none());
        assert!(json.get("negated_message").is_none());
    }
}
