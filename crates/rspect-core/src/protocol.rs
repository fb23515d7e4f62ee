//! Marshaling protocol between a test module and its runner.
//!
//! Every assertion produces an [`Assertion`]: the reported actual value, the reported expected
//! value (with its negation flag) and the verdict. A failing assertion aborts the current test
//! with an [`AssertionFailure`] payload, so the runner always sees the values that belong to the
//! abort and never a stale pair from an earlier, passing assertion.

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// A value reported across the module/runner boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReportedValue {
    Null,
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    String(String),
    Reference { bytes: Vec<u8> },
    /// Expected-only marker for `to_be_truthy`.
    Truthy,
    /// Expected-only marker for `to_be_falsy`.
    Falsy,
    /// Expected-only marker for `to_be_finite`.
    Finite,
}

impl fmt::Display for ReportedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Reference { bytes } => write!(f, "<reference {} bytes>", bytes.len()),
            Self::Truthy => f.write_str("truthy"),
            Self::Falsy => f.write_str("falsy"),
            Self::Finite => f.write_str("finite"),
        }
    }
}

/// Assertion kinds understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssertionKind {
    ToBe,
    ToStrictEqual,
    ToBeTruthy,
    ToBeFalsy,
    ToThrow,
    ToBeGreaterThan,
    ToBeGreaterThanOrEqualTo,
    ToBeLessThan,
    ToBeLessThanOrEqualTo,
    ToBeCloseTo,
    #[serde(rename = "toBeNaN")]
    ToBeNaN,
    ToBeFinite,
    ToBeNull,
    ToHaveLength,
}

impl AssertionKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ToBe => "toBe",
            Self::ToStrictEqual => "toStrictEqual",
            Self::ToBeTruthy => "toBeTruthy",
            Self::ToBeFalsy => "toBeFalsy",
            Self::ToThrow => "toThrow",
            Self::ToBeGreaterThan => "toBeGreaterThan",
            Self::ToBeGreaterThanOrEqualTo => "toBeGreaterThanOrEqualTo",
            Self::ToBeLessThan => "toBeLessThan",
            Self::ToBeLessThanOrEqualTo => "toBeLessThanOrEqualTo",
            Self::ToBeCloseTo => "toBeCloseTo",
            Self::ToBeNaN => "toBeNaN",
            Self::ToBeFinite => "toBeFinite",
            Self::ToBeNull => "toBeNull",
            Self::ToHaveLength => "toHaveLength",
        }
    }
}

/// Result of evaluating one assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
    pub kind: AssertionKind,
    pub actual: Option<ReportedValue>,
    pub expected: Option<ReportedValue>,
    pub negated: bool,
    pub passed: bool,
    /// Set when a guard failed the assertion regardless of negation.
    pub diagnostic: Option<&'static str>,
}

impl Assertion {
    #[must_use]
    pub fn new(kind: AssertionKind, negated: bool) -> Self {
        Self {
            kind,
            actual: None,
            expected: None,
            negated,
            passed: false,
            diagnostic: None,
        }
    }

    #[must_use]
    pub fn with_actual(mut self, actual: ReportedValue) -> Self {
        self.actual = Some(actual);
        self
    }

    #[must_use]
    pub fn with_expected(mut self, expected: ReportedValue) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Apply the uniform pass rule: `negated XOR result`.
    #[must_use]
    pub fn decide(mut self, result: bool) -> Self {
        self.passed = self.negated ^ result;
        self
    }

    /// Fail unconditionally with a guard diagnostic.
    #[must_use]
    pub fn reject(mut self, diagnostic: &'static str) -> Self {
        self.passed = false;
        self.diagnostic = Some(diagnostic);
        self
    }

    /// Convert into the abort payload for a failing assertion.
    ///
    /// Guard diagnostics take precedence over the caller's message.
    #[track_caller]
    pub fn into_result(self, message: String) -> Result<(), AssertionFailure> {
        if self.passed {
            return Ok(());
        }
        let location = Location::caller();
        Err(AssertionFailure {
            kind: self.kind,
            message: self
                .diagnostic
                .map_or(message, |diagnostic| diagnostic.to_string()),
            actual: self.actual,
            expected: self.expected,
            negated: self.negated,
            location: format!(
                "{}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            ),
        })
    }
}

/// Abort payload of a failed assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionFailure {
    pub kind: AssertionKind,
    pub message: String,
    pub actual: Option<ReportedValue>,
    pub expected: Option<ReportedValue>,
    pub negated: bool,
    pub location: String,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{} assertion failed", self.kind.name())?;
        } else {
            f.write_str(&self.message)?;
        }
        if let Some(actual) = &self.actual {
            write!(f, " (actual: {actual}")?;
            if let Some(expected) = &self.expected {
                let not = if self.negated { "not " } else { "" };
                write!(f, ", expected: {not}{expected}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl std::error::Error for AssertionFailure {}
