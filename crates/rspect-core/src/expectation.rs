//! The `expect(...)` entry point.
//!
//! An [`Expectation`] holds one actual value, a one-shot negation flag and an optional message.
//! Every assertion method consumes it, so the flag and message can never leak into a second
//! assertion. A failing assertion aborts the current test by panicking with an
//! [`AssertionFailure`] payload.

use std::panic;

use crate::compare;
use crate::protocol::{Assertion, AssertionFailure};
use crate::value::Expectable;

/// A pending assertion on `actual`.
#[derive(Debug, Clone)]
#[must_use = "an expectation does nothing until an assertion method is called"]
pub struct Expectation<T> {
    actual: T,
    negated: bool,
    message: String,
}

/// Start an assertion on `actual`.
pub fn expect<T>(actual: T) -> Expectation<T> {
    Expectation {
        actual,
        negated: false,
        message: String::new(),
    }
}

/// Start an assertion on a zero-argument callback, for `to_throw`.
pub fn expect_fn<F: Fn()>(callback: F) -> Expectation<F> {
    expect(callback)
}

#[track_caller]
fn enforce(assertion: Assertion, message: String) {
    if let Err(failure) = assertion.into_result(message) {
        panic::panic_any::<AssertionFailure>(failure);
    }
}

impl<T> Expectation<T> {
    /// Negate the assertion. Repeating `not()` keeps it negated.
    pub fn not(mut self) -> Self {
        self.negated = true;
        self
    }

    /// Message carried by the abort if the assertion fails.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

impl<T: Expectable> Expectation<T> {
    #[track_caller]
    pub fn to_be(self, expected: T) {
        enforce(compare::to_be(&self.actual, &expected, self.negated), self.message);
    }

    #[track_caller]
    pub fn to_strict_equal(self, expected: T) {
        enforce(
            compare::to_strict_equal(&self.actual, &expected, self.negated),
            self.message,
        );
    }

    #[track_caller]
    pub fn to_be_truthy(self) {
        enforce(compare::to_be_truthy(&self.actual, self.negated), self.message);
    }

    #[track_caller]
    pub fn to_be_falsy(self) {
        enforce(compare::to_be_falsy(&self.actual, self.negated), self.message);
    }

    /// Floats only; two decimal places.
    #[track_caller]
    pub fn to_be_close_to(self, expected: T) {
        self.to_be_close_to_places(expected, compare::DEFAULT_DECIMAL_PLACES);
    }

    /// Passes iff `|expected - actual| < 10^-decimal_places`.
    #[track_caller]
    pub fn to_be_close_to_places(self, expected: T, decimal_places: i32) {
        enforce(
            compare::to_be_close_to(&self.actual, &expected, decimal_places, self.negated),
            self.message,
        );
    }

    #[track_caller]
    pub fn to_be_nan(self) {
        enforce(compare::to_be_nan(&self.actual, self.negated), self.message);
    }

    #[track_caller]
    pub fn to_be_finite(self) {
        enforce(compare::to_be_finite(&self.actual, self.negated), self.message);
    }

    #[track_caller]
    pub fn to_be_null(self) {
        enforce(compare::to_be_null(&self.actual, self.negated), self.message);
    }

    /// Buffers count elements, strings count characters, objects use their declared length.
    #[track_caller]
    pub fn to_have_length(self, expected: usize) {
        enforce(
            compare::to_have_length(&self.actual, expected, self.negated),
            self.message,
        );
    }
}

impl<T: Expectable + PartialOrd> Expectation<T> {
    #[track_caller]
    pub fn to_be_greater_than(self, expected: T) {
        enforce(
            compare::to_be_greater_than(&self.actual, &expected, self.negated),
            self.message,
        );
    }

    #[track_caller]
    pub fn to_be_greater_than_or_equal_to(self, expected: T) {
        enforce(
            compare::to_be_greater_than_or_equal_to(&self.actual, &expected, self.negated),
            self.message,
        );
    }

    #[track_caller]
    pub fn to_be_less_than(self, expected: T) {
        enforce(
            compare::to_be_less_than(&self.actual, &expected, self.negated),
            self.message,
        );
    }

    #[track_caller]
    pub fn to_be_less_than_or_equal_to(self, expected: T) {
        enforce(
            compare::to_be_less_than_or_equal_to(&self.actual, &expected, self.negated),
            self.message,
        );
    }
}

impl<F: Fn()> Expectation<F> {
    /// Invoke the callback inside a guarded call; passes iff it aborted.
    #[track_caller]
    pub fn to_throw(self) {
        enforce(compare::to_throw(&self.actual, self.negated), self.message);
    }
}
