//! Aggregate run results.

use rspect_core::LogValue;
use serde::{Deserialize, Serialize};

use crate::group::{HookFailure, TestGroup, TestOutcome, TestRecord};

/// One group's results, flattened out of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub passed: bool,
    pub cancelled: bool,
    pub hook_failure: Option<HookFailure>,
    pub duration_ns: u64,
    pub logs: Vec<LogValue>,
    pub tests: Vec<TestRecord>,
    pub todos: Vec<String>,
}

/// Results of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub module: String,
    /// The root group passed.
    pub pass: bool,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Tests that never ran because a hook cancelled their group.
    pub skipped: usize,
    pub todos: usize,
    pub duration_ns: u64,
    /// Groups in depth-first declaration order, root first.
    pub groups: Vec<GroupSummary>,
}

impl RunSummary {
    /// Flatten the group arena rooted at index 0.
    #[must_use]
    pub fn from_groups(module: &str, groups: &[TestGroup]) -> Self {
        let mut order = Vec::with_capacity(groups.len());
        if !groups.is_empty() {
            collect_depth_first(groups, 0, &mut order);
        }
        let flattened: Vec<GroupSummary> = order
            .into_iter()
            .map(|index| {
                let group = &groups[index];
                GroupSummary {
                    name: group.name.clone(),
                    path: group.path.clone(),
                    depth: group.depth,
                    passed: group.passed,
                    cancelled: group.cancelled,
                    hook_failure: group.hook_failure.clone(),
                    duration_ns: group.duration_ns,
                    logs: group.logs.clone(),
                    tests: group.tests.clone(),
                    todos: group.todos.clone(),
                }
            })
            .collect();

        let tests = || flattened.iter().flat_map(|g| g.tests.iter());
        let total = tests().count();
        let passed = tests().filter(|t| t.outcome == Some(TestOutcome::Pass)).count();
        let failed = tests().filter(|t| t.outcome == Some(TestOutcome::Fail)).count();
        let todos = flattened.iter().map(|g| g.todos.len()).sum();
        let root = groups.first();

        Self {
            module: module.to_string(),
            pass: root.is_some_and(|g| g.passed),
            total,
            passed,
            failed,
            skipped: total - passed - failed,
            todos,
            duration_ns: root.map_or(0, |g| g.duration_ns),
            groups: flattened,
        }
    }

    /// Returns true if the run passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.pass
    }

    /// Every failed test with the path of its group.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &TestRecord)> {
        self.groups.iter().flat_map(|g| {
            g.tests
                .iter()
                .filter(|t| t.outcome == Some(TestOutcome::Fail))
                .map(move |t| (g.path.as_str(), t))
        })
    }

    /// Look up a test by group path and name.
    #[must_use]
    pub fn find_test(&self, path: &str, name: &str) -> Option<&TestRecord> {
        self.groups
            .iter()
            .filter(|g| g.path == path)
            .flat_map(|g| g.tests.iter())
            .find(|t| t.name == name)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn collect_depth_first(groups: &[TestGroup], index: usize, out: &mut Vec<usize>) {
    out.push(index);
    for &child in &groups[index].children {
        collect_depth_first(groups, child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, outcome: Option<TestOutcome>) -> TestRecord {
        let mut record = TestRecord::new(name, false, "", 0);
        record.outcome = outcome;
        record
    }

    #[test]
    fn counts_and_order() {
        let mut root = TestGroup::root();
        root.children = vec![2, 1];
        root.passed = false;
        let mut first = TestGroup::child_of(&root, 0, "second-declared");
        first.tests = vec![record("a", Some(TestOutcome::Pass))];
        let mut second = TestGroup::child_of(&root, 0, "first-declared");
        second.tests = vec![
            record("b", Some(TestOutcome::Fail)),
            record("c", Some(TestOutcome::Skip)),
            record("d", None),
        ];
        second.todos = vec!["later".to_string()];

        let summary = RunSummary::from_groups("m", &[root, first, second]);
        let paths: Vec<&str> = summary.groups.iter().map(|g| g.path.as_str()).collect();
        assert_eq!(paths, ["", "first-declared", "second-declared"]);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.todos, 1);
        assert!(!summary.all_passed());
        let failures: Vec<_> = summary.failures().map(|(p, t)| (p, t.name.as_str())).collect();
        assert_eq!(failures, [("first-declared", "b")]);
        assert!(summary.find_test("second-declared", "a").is_some());
    }

    #[test]
    fn json_roundtrip() {
        let mut root = TestGroup::root();
        root.passed = true;
        root.tests = vec![record("only", Some(TestOutcome::Pass))];
        let summary = RunSummary::from_groups("m", &[root]);
        let restored: RunSummary = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(restored, summary);
        assert!(restored.all_passed());
    }
}
