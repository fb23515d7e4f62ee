//! Integration test: assertion semantics through the public `expect` API.
//!
//! Every check runs inside a guarded call, the same way the runner executes test bodies.
//!
//! Run: cargo test -p rspect-core --test assertions_test

use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

use rspect_core::compare::{
    ACTUAL_NULL, CLOSE_TO_NOT_FLOAT, CLOSE_TO_REFERENCE, EXPECTED_NAN, LENGTH_NULL,
};
use rspect_core::{
    AssertionFailure, AssertionKind, ByteView, ReportedValue, expect, expect_fn, guarded,
    install_abort_hook,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn passes(body: impl Fn()) -> bool {
    install_abort_hook();
    guarded(&body).is_ok()
}

fn failure(body: impl Fn()) -> AssertionFailure {
    install_abort_hook();
    guarded(&body)
        .expect_err("assertion should abort")
        .failure
        .expect("abort should carry an assertion payload")
}

#[derive(Debug, PartialEq, PartialOrd)]
struct Header {
    magic: u32,
    flags: u16,
    count: u16,
}

impl ByteView for Header {
    fn bytes(&self) -> Cow<'_, [u8]> {
        let mut out = Vec::with_capacity(8);
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
        Cow::Owned(out)
    }

    fn length(&self) -> Option<usize> {
        Some(usize::from(self.count))
    }
}

fn header(magic: u32, flags: u16, count: u16) -> Rc<Header> {
    Rc::new(Header {
        magic,
        flags,
        count,
    })
}

// ---------------------------------------------------------------------------
// 1. Identity and negation
// ---------------------------------------------------------------------------

#[test]
fn scalars_equal_themselves() {
    for x in [i64::MIN, -1, 0, 1, i64::MAX] {
        assert!(passes(|| expect(x).to_be(x)));
        assert!(!passes(|| expect(x).not().to_be(x)));
    }
    for x in [0.0f64, -2.5, f64::INFINITY] {
        assert!(passes(|| expect(x).to_be(x)));
    }
    assert!(passes(|| expect('z').to_be('z')));
    assert!(passes(|| expect(true).not().to_be(false)));
}

#[test]
fn repeated_not_stays_negated() {
    assert!(passes(|| expect(1).not().not().to_be(2)));
    assert!(!passes(|| expect(1).not().not().to_be(1)));
    assert!(expect(1).not().not().is_negated());
}

#[test]
fn distinct_empty_vecs_are_not_identical() {
    let a: Vec<u8> = Vec::new();
    let b: Vec<u8> = Vec::new();
    assert!(!passes(|| expect(&a).to_be(&b)));
    assert!(passes(|| expect(&a).to_be(&a)));
    assert!(passes(|| expect(&a).to_strict_equal(&b)));

    let wide_a: Vec<u64> = Vec::with_capacity(0);
    let wide_b: Vec<u64> = Vec::with_capacity(0);
    assert!(passes(|| expect(&wide_a).not().to_be(&wide_b)));
}

// ---------------------------------------------------------------------------
// 2. Structural equality
// ---------------------------------------------------------------------------

#[test]
fn strict_equal_on_identical_layouts() {
    assert!(passes(|| expect(header(0xCAFE, 1, 2)).to_strict_equal(header(0xCAFE, 1, 2))));
    assert!(!passes(|| expect(header(0xCAFE, 1, 2)).to_be(header(0xCAFE, 1, 2))));
}

#[test]
fn strict_equal_detects_single_byte_flip() {
    let f = failure(|| expect(header(0xCAFE, 1, 2)).to_strict_equal(header(0xCAFE, 3, 2)));
    assert_eq!(f.kind, AssertionKind::ToStrictEqual);
    assert!(matches!(f.actual, Some(ReportedValue::Reference { ref bytes }) if bytes.len() == 8));
}

#[test]
fn strict_equal_with_one_null_fails() {
    assert!(!passes(|| expect(Some(header(1, 1, 1))).to_strict_equal(None)));
    assert!(passes(|| expect(None).not().to_strict_equal(Some(header(1, 1, 1)))));
    assert!(passes(|| expect(None::<Rc<Header>>).to_strict_equal(None)));
}

#[test]
fn strict_equal_truncated_buffer_fails_on_length() {
    let data = vec![7u32, 8, 9];
    let copy = data.clone();
    let full: &[u32] = &data;
    let truncated: &[u32] = &copy[..2];
    assert!(passes(|| expect(full).to_strict_equal(&copy[..])));
    assert!(!passes(|| expect(full).to_strict_equal(truncated)));
}

#[test]
fn shared_arcs_and_boxes() {
    let a = Arc::new(Header {
        magic: 9,
        flags: 0,
        count: 0,
    });
    let b = Arc::clone(&a);
    assert!(passes(|| expect(Arc::clone(&a)).to_be(Arc::clone(&b))));
    let boxed = || {
        Box::new(Header {
            magic: 9,
            flags: 0,
            count: 0,
        })
    };
    assert!(passes(|| expect(boxed()).to_strict_equal(boxed())));
}

// ---------------------------------------------------------------------------
// 3. Truthiness
// ---------------------------------------------------------------------------

#[test]
fn nan_is_falsy() {
    assert!(passes(|| expect(f64::NAN).to_be_falsy()));
    assert!(!passes(|| expect(f64::NAN).to_be_truthy()));
    let f = failure(|| expect(f32::NAN).to_be_truthy());
    assert_eq!(f.expected, Some(ReportedValue::Truthy));
}

#[test]
fn strings_and_nulls() {
    assert!(passes(|| expect("").to_be_falsy()));
    assert!(passes(|| expect(String::from("x")).to_be_truthy()));
    assert!(passes(|| expect(None::<String>).to_be_falsy()));
    assert!(passes(|| expect(0u8).to_be_falsy()));
}

// ---------------------------------------------------------------------------
// 4. Ordering and closeness
// ---------------------------------------------------------------------------

#[test]
fn ordering_guards_are_unconditional() {
    let f = failure(|| expect(1.0).not().to_be_less_than(f64::NAN));
    assert_eq!(f.message, EXPECTED_NAN);
    let f = failure(|| expect(None).not().to_be_greater_than(Some(String::from("a"))));
    assert_eq!(f.message, ACTUAL_NULL);
    assert!(passes(|| expect(String::from("b")).to_be_greater_than(String::from("a"))));
    assert!(passes(|| expect(3u64).to_be_less_than_or_equal_to(3)));
}

#[test]
fn close_to_boundary() {
    assert!(passes(|| expect(1.0).to_be_close_to_places(1.4, 0)));
    assert!(!passes(|| expect(2.0).to_be_close_to_places(1.0, 0)));
    assert!(passes(|| expect(2.0).not().to_be_close_to_places(1.0, 0)));
    assert_eq!(failure(|| expect(1).to_be_close_to(1)).message, CLOSE_TO_NOT_FLOAT);
    assert_eq!(failure(|| expect("1").to_be_close_to("1")).message, CLOSE_TO_REFERENCE);
}

#[test]
fn nan_and_finite() {
    assert!(passes(|| expect(f64::NAN).to_be_nan()));
    assert!(passes(|| expect(1.5f32).to_be_finite()));
    assert!(passes(|| expect(f64::NEG_INFINITY).not().to_be_finite()));
    assert!(!passes(|| expect(1).not().to_be_nan()));
    let f = failure(|| expect(1.0).to_be_nan());
    assert!(matches!(f.expected, Some(ReportedValue::Float(v)) if v.is_nan()));
}

// ---------------------------------------------------------------------------
// 5. Null and length
// ---------------------------------------------------------------------------

#[test]
fn null_checks() {
    assert!(passes(|| expect(None::<Rc<Header>>).to_be_null()));
    assert!(passes(|| expect(Some(header(0, 0, 0))).not().to_be_null()));
    assert!(!passes(|| expect(0).to_be_null()));
    assert!(passes(|| expect(0).not().to_be_null()));
}

#[test]
fn lengths() {
    let wide: &[f64] = &[1.0, 2.0];
    assert!(passes(|| expect(wide).to_have_length(2)));
    assert!(passes(|| expect("日本").to_have_length(2)));
    assert!(passes(|| expect(header(0, 0, 12)).to_have_length(12)));
    let f = failure(|| expect(header(0, 0, 12)).to_have_length(3));
    assert_eq!(f.actual, Some(ReportedValue::Unsigned(12)));
    assert_eq!(f.expected, Some(ReportedValue::Unsigned(3)));
    assert_eq!(failure(|| expect(None::<String>).to_have_length(0)).message, LENGTH_NULL);
}

// ---------------------------------------------------------------------------
// 6. Throwing callbacks
// ---------------------------------------------------------------------------

#[test]
fn to_throw_isolates_the_abort() {
    assert!(passes(|| expect_fn(|| expect(1).to_be(2)).to_throw()));
    assert!(passes(|| expect_fn(|| {}).not().to_throw()));
    let f = failure(|| expect_fn(|| panic!("inner")).not().to_throw());
    assert_eq!(f.actual, Some(ReportedValue::String("throws".into())));
    assert_eq!(f.expected, Some(ReportedValue::String("not throws".into())));
}

#[test]
fn failures_carry_caller_location() {
    let f = failure(|| expect(1).with_message("one is not two").to_be(2));
    assert_eq!(f.message, "one is not two");
    assert!(f.location.contains("assertions_test.rs"), "{}", f.location);
    assert_eq!(
        f.to_string(),
        "one is not two (actual: 1, expected: 2)"
    );
}
