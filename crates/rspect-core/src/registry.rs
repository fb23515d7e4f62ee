//! Registration pass: the host interface and the module-side DSL.
//!
//! A module declares its whole test tree through a [`Host`] before any test body runs.
//! [`Suite`] wraps a host with `describe`/`it`-style helpers that keep begin/end balanced.

use serde::{Deserialize, Serialize};

/// An owned callback handed to the runner during registration.
pub type Callback = Box<dyn Fn()>;

/// Lifecycle hook kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    BeforeAll,
    AfterAll,
    BeforeEach,
    AfterEach,
}

impl HookKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeAll => "before_all",
            Self::AfterAll => "after_all",
            Self::BeforeEach => "before_each",
            Self::AfterEach => "after_each",
        }
    }
}

/// The host function table the runner exposes to a module.
pub trait Host {
    /// Open a nested group under the currently open one.
    fn begin_group(&mut self, name: &str);

    /// Close the currently open group.
    fn end_group(&mut self);

    /// Attach a hook to the open group, replacing any earlier hook of the same kind.
    fn register_hook(&mut self, kind: HookKind, callback: Callback);

    fn register_test(&mut self, name: &str, callback: Callback);

    /// A test expected to abort. `message` is reported when it completes normally; an empty
    /// message selects the runner's default.
    fn register_negated_test(&mut self, name: &str, message: &str, callback: Callback);

    fn register_todo(&mut self, name: &str);
}

/// A unit under test.
pub trait TestModule {
    fn name(&self) -> &str {
        "module"
    }

    /// Declare the test tree. Runs exactly once per run.
    fn register(&self, host: &mut dyn Host);
}

/// Registration DSL over a [`Host`].
pub struct Suite<'h> {
    host: &'h mut dyn Host,
}

impl<'h> Suite<'h> {
    pub fn new(host: &'h mut dyn Host) -> Self {
        Self { host }
    }

    /// Open a group, run `body` to declare its contents, close it.
    pub fn describe(&mut self, name: &str, body: impl FnOnce(&mut Suite<'_>)) -> &mut Self {
        self.host.begin_group(name);
        {
            let mut inner = Suite { host: &mut *self.host };
            body(&mut inner);
        }
        self.host.end_group();
        self
    }

    pub fn before_all(&mut self, hook: impl Fn() + 'static) -> &mut Self {
        self.host.register_hook(HookKind::BeforeAll, Box::new(hook));
        self
    }

    pub fn after_all(&mut self, hook: impl Fn() + 'static) -> &mut Self {
        self.host.register_hook(HookKind::AfterAll, Box::new(hook));
        self
    }

    pub fn before_each(&mut self, hook: impl Fn() + 'static) -> &mut Self {
        self.host.register_hook(HookKind::BeforeEach, Box::new(hook));
        self
    }

    pub fn after_each(&mut self, hook: impl Fn() + 'static) -> &mut Self {
        self.host.register_hook(HookKind::AfterEach, Box::new(hook));
        self
    }

    pub fn it(&mut self, name: &str, body: impl Fn() + 'static) -> &mut Self {
        self.host.register_test(name, Box::new(body));
        self
    }

    /// Alias of [`Suite::it`].
    pub fn test(&mut self, name: &str, body: impl Fn() + 'static) -> &mut Self {
        self.it(name, body)
    }

    /// A test that must abort; uses the runner's default message when it does not.
    pub fn throws(&mut self, name: &str, body: impl Fn() + 'static) -> &mut Self {
        self.throws_with(name, "", body)
    }

    pub fn throws_with(&mut self, name: &str, message: &str, body: impl Fn() + 'static) -> &mut Self {
        self.host.register_negated_test(name, message, Box::new(body));
        self
    }

    pub fn todo(&mut self, name: &str) -> &mut Self {
        self.host.register_todo(name);
        self
    }
}

/// A [`TestModule`] built from a registration closure.
pub struct FnModule<F> {
    name: String,
    register: F,
}

impl<F: Fn(&mut Suite<'_>)> TestModule for FnModule<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, host: &mut dyn Host) {
        let mut suite = Suite::new(host);
        (self.register)(&mut suite);
    }
}

/// Wrap a registration closure as a module.
pub fn module_fn<F: Fn(&mut Suite<'_>)>(name: impl Into<String>, register: F) -> FnModule<F> {
    FnModule {
        name: name.into(),
        register,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        callbacks: Vec<Callback>,
    }

    impl Host for Recorder {
        fn begin_group(&mut self, name: &str) {
            self.calls.push(format!("begin {name}"));
        }

        fn end_group(&mut self) {
            self.calls.push("end".to_string());
        }

        fn register_hook(&mut self, kind: HookKind, callback: Callback) {
            self.calls.push(format!("hook {}", kind.name()));
            self.callbacks.push(callback);
        }

        fn register_test(&mut self, name: &str, callback: Callback) {
            self.calls.push(format!("test {name}"));
            self.callbacks.push(callback);
        }

        fn register_negated_test(&mut self, name: &str, message: &str, callback: Callback) {
            self.calls.push(format!("negated {name} [{message}]"));
            self.callbacks.push(callback);
        }

        fn register_todo(&mut self, name: &str) {
            self.calls.push(format!("todo {name}"));
        }
    }

    #[test]
    fn suite_forwards_in_declaration_order() {
        let module = module_fn("math", |s| {
            s.describe("outer", |s| {
                s.before_each(|| {});
                s.it("adds", || {});
                s.describe("inner", |s| {
                    s.throws("panics", || panic!("x"));
                    s.throws_with("custom", "should abort", || {});
                });
                s.todo("later");
            });
            s.test("top", || {});
        });
        let mut recorder = Recorder::default();
        module.register(&mut recorder);
        assert_eq!(module.name(), "math");
        assert_eq!(
            recorder.calls,
            vec![
                "begin outer",
                "hook before_each",
                "test adds",
                "begin inner",
                "negated panics []",
                "negated custom [should abort]",
                "end",
                "todo later",
                "end",
                "test top",
            ]
        );
        assert_eq!(recorder.callbacks.len(), 5);
    }

    #[test]
    fn no_body_runs_during_registration() {
        let module = module_fn("lazy", |s| {
            s.it("boom", || panic!("must not run"));
            s.before_all(|| panic!("must not run"));
        });
        let mut recorder = Recorder::default();
        module.register(&mut recorder);
        assert_eq!(recorder.callbacks.len(), 2);
    }
}
