//! The comparison engine.
//!
//! Each function reports the actual (and, where applicable, the expected) value, evaluates the
//! assertion's boolean and applies `negated XOR result`. Guards that make an assertion
//! meaningless (null operands to an ordering, NaN operands, non-float closeness) reject
//! unconditionally before the XOR rule.

use crate::guard;
use crate::protocol::{Assertion, AssertionKind, ReportedValue};
use crate::value::{Expectable, Shape};

pub const EXPECTED_NULL: &str = "Nullable comparison fails, expected value is null.";
pub const ACTUAL_NULL: &str = "Nullable comparison fails, actual value is null.";
pub const EXPECTED_NAN: &str = "Value comparison fails, expected value is NaN.";
pub const ACTUAL_NAN: &str = "Value comparison fails, actual value is NaN.";
pub const CLOSE_TO_REFERENCE: &str = "toBeCloseTo cannot be called on reference types.";
pub const CLOSE_TO_NOT_FLOAT: &str = "toBeCloseTo assertion must be called on a float value.";
pub const CLOSE_TO_ACTUAL_NOT_FINITE: &str =
    "toBeCloseTo assertion fails because actual value is not finite.";
pub const CLOSE_TO_EXPECTED_NOT_FINITE: &str =
    "toBeCloseTo assertion fails because expected value is not finite.";
pub const NAN_REFERENCE: &str = "toBeNaN must be called using value types.";
pub const NAN_NOT_FLOAT: &str = "toBeNaN assertion must be called on a float value.";
pub const FINITE_REFERENCE: &str = "toBeFinite must not be called on reference types.";
pub const FINITE_NOT_FLOAT: &str = "toBeFinite must only be called with float value types.";
pub const LENGTH_NULL: &str = "toHaveLength assertion called on null actual value.";
pub const LENGTH_UNSUPPORTED: &str = "toHaveLength should be called on buffers, strings, and values that declare a length.";

/// Default number of decimal places for `to_be_close_to`.
pub const DEFAULT_DECIMAL_PLACES: i32 = 2;

fn reported<T: Expectable>(kind: AssertionKind, actual: &T, expected: &T, negated: bool) -> Assertion {
    Assertion::new(kind, negated)
        .with_actual(actual.shape().report())
        .with_expected(expected.shape().report())
}

/// Identity / value equality.
pub fn to_be<T: Expectable>(actual: &T, expected: &T, negated: bool) -> Assertion {
    reported(AssertionKind::ToBe, actual, expected, negated).decide(actual.same(expected))
}

/// Structural equality over byte views.
pub fn to_strict_equal<T: Expectable>(actual: &T, expected: &T, negated: bool) -> Assertion {
    let assertion = reported(AssertionKind::ToStrictEqual, actual, expected, negated);
    if actual.same(expected) {
        return assertion.decide(true);
    }
    if !T::IS_REFERENCE {
        return assertion.decide(false);
    }
    assertion.decide(structurally_equal(&actual.shape(), &expected.shape()))
}

/// Byte-wise equality of two non-identical references.
///
/// Buffers compare their declared lengths first; the bytes are only scanned when the lengths
/// agree.
fn structurally_equal(actual: &Shape<'_>, expected: &Shape<'_>) -> bool {
    match (actual, expected) {
        (Shape::Null, _) | (_, Shape::Null) => false,
        (Shape::Buffer { len: a_len, bytes: a }, Shape::Buffer { len: e_len, bytes: e }) => {
            a_len == e_len && a.len() == e.len() && a[..] == e[..]
        }
        (Shape::Str(a), Shape::Str(e)) => a.as_bytes() == e.as_bytes(),
        (Shape::Object { bytes: a, .. }, Shape::Object { bytes: e, .. }) => a[..] == e[..],
        _ => false,
    }
}

pub fn to_be_truthy<T: Expectable>(actual: &T, negated: bool) -> Assertion {
    let shape = actual.shape();
    Assertion::new(AssertionKind::ToBeTruthy, negated)
        .with_actual(shape.report())
        .with_expected(ReportedValue::Truthy)
        .decide(shape.is_truthy())
}

pub fn to_be_falsy<T: Expectable>(actual: &T, negated: bool) -> Assertion {
    let shape = actual.shape();
    Assertion::new(AssertionKind::ToBeFalsy, negated)
        .with_actual(shape.report())
        .with_expected(ReportedValue::Falsy)
        .decide(!shape.is_truthy())
}

/// Invoke `callback` inside a guarded call; the result is whether it aborted.
pub fn to_throw<F: Fn()>(callback: &F, negated: bool) -> Assertion {
    let throws = !guard::try_call(callback);
    let actual = if throws { "throws" } else { "not throws" };
    let expected = if negated { "not throws" } else { "throws" };
    Assertion::new(AssertionKind::ToThrow, negated)
        .with_actual(ReportedValue::String(actual.to_string()))
        .with_expected(ReportedValue::String(expected.to_string()))
        .decide(throws)
}

fn ordering<T: Expectable + PartialOrd>(
    kind: AssertionKind,
    actual: &T,
    expected: &T,
    negated: bool,
    op: fn(&T, &T) -> bool,
) -> Assertion {
    let assertion = reported(kind, actual, expected, negated);
    let a = actual.shape();
    let e = expected.shape();
    if T::IS_REFERENCE {
        if e.is_null() {
            return assertion.reject(EXPECTED_NULL);
        }
        if a.is_null() {
            return assertion.reject(ACTUAL_NULL);
        }
    }
    if let Shape::Float(v) = e
        && v.is_nan()
    {
        return assertion.reject(EXPECTED_NAN);
    }
    if let Shape::Float(v) = a
        && v.is_nan()
    {
        return assertion.reject(ACTUAL_NAN);
    }
    assertion.decide(op(actual, expected))
}

pub fn to_be_greater_than<T: Expectable + PartialOrd>(actual: &T, expected: &T, negated: bool) -> Assertion {
    ordering(AssertionKind::ToBeGreaterThan, actual, expected, negated, |a, e| a > e)
}

pub fn to_be_greater_than_or_equal_to<T: Expectable + PartialOrd>(
    actual: &T,
    expected: &T,
    negated: bool,
) -> Assertion {
    ordering(AssertionKind::ToBeGreaterThanOrEqualTo, actual, expected, negated, |a, e| a >= e)
}

pub fn to_be_less_than<T: Expectable + PartialOrd>(actual: &T, expected: &T, negated: bool) -> Assertion {
    ordering(AssertionKind::ToBeLessThan, actual, expected, negated, |a, e| a < e)
}

pub fn to_be_less_than_or_equal_to<T: Expectable + PartialOrd>(
    actual: &T,
    expected: &T,
    negated: bool,
) -> Assertion {
    ordering(AssertionKind::ToBeLessThanOrEqualTo, actual, expected, negated, |a, e| a <= e)
}

/// Closeness: `|expected - actual| < 10^-decimal_places`, floats only, both finite.
pub fn to_be_close_to<T: Expectable>(
    actual: &T,
    expected: &T,
    decimal_places: i32,
    negated: bool,
) -> Assertion {
    let base = Assertion::new(AssertionKind::ToBeCloseTo, negated);
    if T::IS_REFERENCE {
        return base.reject(CLOSE_TO_REFERENCE);
    }
    let a = actual.shape();
    let e = expected.shape();
    let assertion = base.with_actual(a.report()).with_expected(e.report());
    let (Shape::Float(a), Shape::Float(e)) = (a, e) else {
        return assertion.reject(CLOSE_TO_NOT_FLOAT);
    };
    if !a.is_finite() {
        return assertion.reject(CLOSE_TO_ACTUAL_NOT_FINITE);
    }
    if !e.is_finite() {
        return assertion.reject(CLOSE_TO_EXPECTED_NOT_FINITE);
    }
    let epsilon = 10f64.powi(-decimal_places);
    assertion.decide((e - a).abs() < epsilon)
}

pub fn to_be_nan<T: Expectable>(actual: &T, negated: bool) -> Assertion {
    let base = Assertion::new(AssertionKind::ToBeNaN, negated);
    if T::IS_REFERENCE {
        return base.reject(NAN_REFERENCE);
    }
    let shape = actual.shape();
    let assertion = base
        .with_actual(shape.report())
        .with_expected(ReportedValue::Float(f64::NAN));
    match shape {
        Shape::Float(v) => assertion.decide(v.is_nan()),
        _ => assertion.reject(NAN_NOT_FLOAT),
    }
}

pub fn to_be_finite<T: Expectable>(actual: &T, negated: bool) -> Assertion {
    let base = Assertion::new(AssertionKind::ToBeFinite, negated);
    if T::IS_REFERENCE {
        return base.reject(FINITE_REFERENCE);
    }
    let shape = actual.shape();
    let assertion = base
        .with_actual(shape.report())
        .with_expected(ReportedValue::Finite);
    match shape {
        Shape::Float(v) => assertion.decide(v.is_finite()),
        _ => assertion.reject(FINITE_NOT_FLOAT),
    }
}

/// Scalars are never null, so on scalars this only passes when negated.
pub fn to_be_null<T: Expectable>(actual: &T, negated: bool) -> Assertion {
    let shape = actual.shape();
    let assertion = Assertion::new(AssertionKind::ToBeNull, negated)
        .with_actual(shape.report())
        .with_expected(ReportedValue::Null);
    if T::IS_REFERENCE {
        assertion.decide(shape.is_null())
    } else {
        assertion.decide(false)
    }
}

/// Length of buffers (elements), strings (characters) and objects that declare a length.
pub fn to_have_length<T: Expectable>(actual: &T, expected: usize, negated: bool) -> Assertion {
    let base = Assertion::new(AssertionKind::ToHaveLength, negated);
    if !T::IS_REFERENCE {
        return base.reject(LENGTH_UNSUPPORTED);
    }
    let length = match actual.shape() {
        Shape::Null => return base.reject(LENGTH_NULL),
        Shape::Str(s) => s.chars().count(),
        Shape::Buffer { len, .. } => len,
        Shape::Object {
            length: Some(len), ..
        } => len,
        Shape::Object { length: None, .. } | Shape::Integer(_) | Shape::Float(_) => {
            return base.reject(LENGTH_UNSUPPORTED);
        }
    };
    base.with_actual(ReportedValue::Unsigned(length as u64))
        .with_expected(ReportedValue::Unsigned(expected as u64))
        .decide(length == expected)
}
