//! Module-side half of the rspect test framework.
//!
//! This crate provides:
//! - Comparison engine: `expect(actual).to_be(expected)` and friends, generic over any
//!   [`Expectable`] value, with a uniform `negated XOR result` pass rule
//! - Marshaling protocol: the [`ReportedValue`] payloads and [`AssertionFailure`] abort carried
//!   from a failing assertion to the runner
//! - Guarded calls: panic isolation for `to_throw`, negated tests and the runner itself
//! - Registration: the [`Host`] interface a runner implements and the [`Suite`] DSL a module
//!   uses to declare groups, hooks, tests and todos
//! - Diagnostics: a pass-through `log`/`debug` channel drained by the runner per test

pub mod compare;
pub mod diagnostics;
pub mod expectation;
pub mod guard;
pub mod protocol;
pub mod registry;
pub mod value;

pub use diagnostics::{Diagnostic, LogValue, debug, log};
pub use expectation::{Expectation, expect, expect_fn};
pub use guard::{Abort, guarded, guarded_once, install_abort_hook, try_call};
pub use protocol::{Assertion, AssertionFailure, AssertionKind, ReportedValue};
pub use registry::{Callback, FnModule, HookKind, Host, Suite, TestModule, module_fn};
pub use value::{ByteView, Element, Expectable, Reference, Shape};
