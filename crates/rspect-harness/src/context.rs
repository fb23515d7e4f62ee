//! Execution state machine.
//!
//! A [`TestContext`] is the runner for one module. It implements [`Host`] so the module can
//! declare its tree during the registration pass, then walks that tree depth-first:
//!
//! 1. the group's `before_all`
//! 2. each direct test, wrapped in every `before_each` from the root inward and every
//!    `after_each` from the group outward
//! 3. the group's todos
//! 4. nested groups in declaration order
//! 5. the group's `after_all`
//!
//! A hook that aborts fails the group that owns it. The test in flight (if any) fails with the
//! hook's message, everything left in the owner's subtree is skipped, and no `after_all` of a
//! cancelled group runs.

use std::time::Instant;

use rspect_core::diagnostics::{self, Diagnostic};
use rspect_core::{Abort, Callback, HookKind, Host, TestModule, guarded, guarded_once, install_abort_hook};

use crate::config::HarnessConfig;
use crate::error::RunError;
use crate::group::{CallbackId, HookFailure, TestGroup, TestOutcome, TestRecord};
use crate::reporter::TestReporter;
use crate::summary::RunSummary;

const ROOT: usize = 0;

/// Lifecycle of a context. A context runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Registering,
    Running,
    Complete,
}

/// Whether traversal continues or unwinds to the group whose hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Cancel { owner: usize },
}

pub struct TestContext {
    config: HarnessConfig,
    state: RunState,
    groups: Vec<TestGroup>,
    callbacks: Vec<Callback>,
    /// Open groups; the root is always at the bottom.
    stack: Vec<usize>,
    registration_error: Option<String>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl TestContext {
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
            groups: vec![TestGroup::root()],
            callbacks: Vec::new(),
            stack: vec![ROOT],
            registration_error: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The group arena; index 0 is the root.
    #[must_use]
    pub fn groups(&self) -> &[TestGroup] {
        &self.groups
    }

    /// Register `module`, execute its tree and summarize.
    pub fn run(
        &mut self,
        module: &dyn TestModule,
        reporter: &mut dyn TestReporter,
    ) -> Result<RunSummary, RunError> {
        if self.state != RunState::Idle {
            return Err(RunError::InvalidState {
                expected: RunState::Idle,
                found: self.state,
            });
        }
        install_abort_hook();

        self.state = RunState::Registering;
        let registered = guarded_once(|| module.register(&mut *self));
        let _ = diagnostics::drain();
        if let Err(abort) = registered {
            self.state = RunState::Complete;
            return Err(RunError::RegistrationAborted {
                message: abort.message,
                location: abort.location,
            });
        }
        if let Some(reason) = self.registration_error.take() {
            self.state = RunState::Complete;
            return Err(RunError::MalformedRegistration { reason });
        }
        if self.stack.len() > 1 {
            self.state = RunState::Complete;
            let open = self.stack[1..]
                .iter()
                .map(|&g| self.groups[g].path.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RunError::MalformedRegistration {
                reason: format!("groups left open at end of registration: {open}"),
            });
        }

        self.state = RunState::Running;
        reporter.on_start(module.name(), &self.config.performance);
        self.run_group(ROOT, reporter);
        self.state = RunState::Complete;

        let summary = RunSummary::from_groups(module.name(), &self.groups);
        reporter.on_finish(&summary);
        Ok(summary)
    }

    fn current(&self) -> usize {
        self.stack.last().copied().unwrap_or(ROOT)
    }

    fn add_callback(&mut self, callback: Callback) -> CallbackId {
        self.callbacks.push(callback);
        self.callbacks.len() - 1
    }

    fn call(&self, id: CallbackId) -> Result<(), Abort> {
        guarded(&*self.callbacks[id])
    }

    /// Root-first chain of group indices ending at `index`.
    fn ancestry(&self, index: usize) -> Vec<usize> {
        let mut chain = vec![index];
        let mut cursor = self.groups[index].parent;
        while let Some(parent) = cursor {
            chain.push(parent);
            cursor = self.groups[parent].parent;
        }
        chain.reverse();
        chain
    }

    fn run_group(&mut self, index: usize, reporter: &mut dyn TestReporter) -> Flow {
        let started = Instant::now();
        self.groups[index].started = true;
        reporter.on_group_start(&self.groups[index]);

        let mut flow = Flow::Continue;
        if let Some(hook) = self.groups[index].hooks.get(HookKind::BeforeAll) {
            let result = self.call(hook);
            self.drain_into_group(index, reporter);
            if let Err(abort) = result {
                self.fail_hook(index, HookKind::BeforeAll, abort);
                flow = Flow::Cancel { owner: index };
            }
        }

        if flow == Flow::Continue {
            for test in 0..self.groups[index].tests.len() {
                flow = self.run_test(index, test, reporter);
                if flow != Flow::Continue {
                    break;
                }
            }
        }

        for todo in self.groups[index].todos.clone() {
            reporter.on_todo(&self.groups[index], &todo);
        }

        if flow == Flow::Continue {
            for child in self.groups[index].children.clone() {
                flow = self.run_group(child, reporter);
                if flow != Flow::Continue {
                    break;
                }
            }
        }

        match flow {
            Flow::Continue => {
                if let Some(hook) = self.groups[index].hooks.get(HookKind::AfterAll) {
                    let result = self.call(hook);
                    self.drain_into_group(index, reporter);
                    if let Err(abort) = result {
                        self.fail_hook(index, HookKind::AfterAll, abort);
                    }
                }
            }
            Flow::Cancel { owner } => {
                self.groups[index].cancelled = true;
                self.skip_remaining(index, reporter);
                if owner == index {
                    flow = Flow::Continue;
                }
            }
        }

        self.finish_group(index, started);
        reporter.on_group_finish(&self.groups[index]);
        flow
    }

    fn run_test(&mut self, index: usize, test: usize, reporter: &mut dyn TestReporter) -> Flow {
        let chain = self.ancestry(index);
        reporter.on_test_start(&self.groups[index], &self.groups[index].tests[test]);
        let _ = diagnostics::drain();
        let started = Instant::now();
        let mut flow = Flow::Continue;

        for &owner in &chain {
            let Some(hook) = self.groups[owner].hooks.get(HookKind::BeforeEach) else {
                continue;
            };
            if let Err(abort) = self.call(hook) {
                self.fail_test_by_hook(index, test, &abort);
                self.fail_hook(owner, HookKind::BeforeEach, abort);
                flow = Flow::Cancel { owner };
                break;
            }
        }

        if flow == Flow::Continue {
            let result = self.call(self.groups[index].tests[test].callback);
            self.interpret(index, test, result);

            for &owner in chain.iter().rev() {
                let Some(hook) = self.groups[owner].hooks.get(HookKind::AfterEach) else {
                    continue;
                };
                if let Err(abort) = self.call(hook) {
                    self.fail_test_by_hook(index, test, &abort);
                    self.fail_hook(owner, HookKind::AfterEach, abort);
                    flow = Flow::Cancel { owner };
                    break;
                }
            }
        }

        let elapsed = elapsed_ns(started);
        self.groups[index].tests[test].duration_ns = elapsed;
        for diagnostic in diagnostics::drain() {
            match diagnostic {
                Diagnostic::Log { value } => self.groups[index].tests[test].logs.push(value),
                Diagnostic::DebugHalt => {
                    let group = &self.groups[index];
                    reporter.on_debug_halt(group, Some(&group.tests[test]));
                }
            }
        }
        reporter.on_test_finish(&self.groups[index], &self.groups[index].tests[test]);
        flow
    }

    /// Apply the body's result to the test, inverting it for negated tests.
    fn interpret(&mut self, index: usize, test: usize, result: Result<(), Abort>) {
        let default_message = &self.config.negated_test_message;
        let record = &mut self.groups[index].tests[test];
        match (record.negated, result) {
            (false, Ok(())) | (true, Err(_)) => record.outcome = Some(TestOutcome::Pass),
            (false, Err(abort)) => {
                if let Some(failure) = abort.failure {
                    record.actual = failure.actual;
                    record.expected = failure.expected;
                }
                record.fail(abort.message, abort.location);
            }
            (true, Ok(())) => {
                let message = if record.negated_message.is_empty() {
                    default_message.clone()
                } else {
                    record.negated_message.clone()
                };
                record.fail(message, None);
            }
        }
    }

    /// The hook's abort replaces whatever the body reported, values included.
    fn fail_test_by_hook(&mut self, index: usize, test: usize, abort: &Abort) {
        let record = &mut self.groups[index].tests[test];
        let failure = abort.failure.as_ref();
        record.actual = failure.and_then(|f| f.actual.clone());
        record.expected = failure.and_then(|f| f.expected.clone());
        record.fail(abort.message.clone(), abort.location.clone());
    }

    fn fail_hook(&mut self, owner: usize, kind: HookKind, abort: Abort) {
        let group = &mut self.groups[owner];
        group.passed = false;
        group.hook_failure.get_or_insert(HookFailure {
            kind,
            message: abort.message,
            location: abort.location,
        });
    }

    /// Skip every test in `index`'s subtree that has not run.
    fn skip_remaining(&mut self, index: usize, reporter: &mut dyn TestReporter) {
        self.skip_tests(index, reporter);
        for child in self.groups[index].children.clone() {
            if self.groups[child].started {
                self.skip_remaining(child, reporter);
            } else {
                self.skip_group(child, reporter);
            }
        }
    }

    fn skip_tests(&mut self, index: usize, reporter: &mut dyn TestReporter) {
        for test in 0..self.groups[index].tests.len() {
            if self.groups[index].tests[test].outcome.is_none() {
                self.groups[index].tests[test].outcome = Some(TestOutcome::Skip);
                reporter.on_test_finish(&self.groups[index], &self.groups[index].tests[test]);
            }
        }
    }

    /// Report a group that never started: its skipped tests, its todos, then its children.
    fn skip_group(&mut self, index: usize, reporter: &mut dyn TestReporter) {
        let started = Instant::now();
        self.groups[index].cancelled = true;
        reporter.on_group_start(&self.groups[index]);
        self.skip_tests(index, reporter);
        for todo in self.groups[index].todos.clone() {
            reporter.on_todo(&self.groups[index], &todo);
        }
        for child in self.groups[index].children.clone() {
            self.skip_group(child, reporter);
        }
        self.finish_group(index, started);
        reporter.on_group_finish(&self.groups[index]);
    }

    fn finish_group(&mut self, index: usize, started: Instant) {
        let passed = {
            let group = &self.groups[index];
            !group.cancelled
                && group.hook_failure.is_none()
                && group.tests.iter().all(TestRecord::passed)
                && group.children.iter().all(|&child| self.groups[child].passed)
        };
        let group = &mut self.groups[index];
        group.passed = passed;
        group.duration_ns = elapsed_ns(started);
    }

    fn drain_into_group(&mut self, index: usize, reporter: &mut dyn TestReporter) {
        for diagnostic in diagnostics::drain() {
            match diagnostic {
                Diagnostic::Log { value } => self.groups[index].logs.push(value),
                Diagnostic::DebugHalt => reporter.on_debug_halt(&self.groups[index], None),
            }
        }
    }
}

fn elapsed_ns(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

impl Host for TestContext {
    fn begin_group(&mut self, name: &str) {
        let parent = self.current();
        let group = TestGroup::child_of(&self.groups[parent], parent, name);
        self.groups.push(group);
        let index = self.groups.len() - 1;
        self.groups[parent].children.push(index);
        self.stack.push(index);
    }

    fn end_group(&mut self) {
        if self.stack.len() <= 1 {
            self.registration_error
                .get_or_insert_with(|| "end_group called with no open group".to_string());
            return;
        }
        self.stack.pop();
    }

    fn register_hook(&mut self, kind: HookKind, callback: Callback) {
        let id = self.add_callback(callback);
        let current = self.current();
        self.groups[current].hooks.set(kind, id);
    }

    fn register_test(&mut self, name: &str, callback: Callback) {
        let id = self.add_callback(callback);
        let current = self.current();
        self.groups[current].tests.push(TestRecord::new(name, false, "", id));
    }

    fn register_negated_test(&mut self, name: &str, message: &str, callback: Callback) {
        let id = self.add_callback(callback);
        let current = self.current();
        self.groups[current].tests.push(TestRecord::new(name, true, message, id));
    }

    fn register_todo(&mut self, name: &str) {
        let current = self.current();
        self.groups[current].todos.push(name.to_string());
    }
}
