//! Built-in self-check module.
//!
//! Exercises every assertion kind, negation, guards, lifecycle hook ordering, negated tests,
//! todos and the diagnostic channel. Every test is expected to pass.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use rspect_core::{ByteView, Host, Suite, TestModule, debug, expect, expect_fn, log};

pub struct SmokeModule;

#[derive(Debug, PartialEq, PartialOrd)]
struct Point {
    x: i32,
    y: i32,
}

impl ByteView for Point {
    fn bytes(&self) -> Cow<'_, [u8]> {
        let mut out = self.x.to_le_bytes().to_vec();
        out.extend_from_slice(&self.y.to_le_bytes());
        Cow::Owned(out)
    }
}

struct Packet {
    payload: Vec<u8>,
}

impl ByteView for Packet {
    fn bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.payload)
    }

    fn length(&self) -> Option<usize> {
        Some(self.payload.len())
    }
}

fn point(x: i32, y: i32) -> Rc<Point> {
    Rc::new(Point { x, y })
}

impl TestModule for SmokeModule {
    fn name(&self) -> &str {
        "smoke"
    }

    fn register(&self, host: &mut dyn Host) {
        let mut suite = Suite::new(host);
        equality(&mut suite);
        truthiness(&mut suite);
        ordering(&mut suite);
        floats(&mut suite);
        nulls_and_lengths(&mut suite);
        lifecycle(&mut suite);
    }
}

fn equality(s: &mut Suite<'_>) {
    s.describe("equality", |s| {
        s.it("scalars", || {
            expect(42).to_be(42);
            expect(42u8).not().to_be(43);
            expect('a').to_be('a');
        });
        s.it("strings", || {
            expect("rspect").to_be("rspect");
            expect(String::from("a")).to_strict_equal(String::from("a"));
        });
        s.it("objects", || {
            let shared = point(1, 2);
            expect(Rc::clone(&shared)).to_be(Rc::clone(&shared));
            expect(point(1, 2)).not().to_be(point(1, 2));
            expect(point(1, 2)).to_strict_equal(point(1, 2));
            expect(point(1, 2)).not().to_strict_equal(point(2, 1));
            expect(Some(point(0, 0))).not().to_strict_equal(None);
        });
        s.it("buffers", || {
            let data = [1u16, 2, 3];
            let copy = data;
            expect(&data[..]).to_strict_equal(&copy[..]);
            expect(&data[..]).not().to_strict_equal(&copy[..2]);
        });
    });
}

fn truthiness(s: &mut Suite<'_>) {
    s.describe("truthiness", |s| {
        s.it("values", || {
            expect(1).to_be_truthy();
            expect(0).to_be_falsy();
            expect(f64::NAN).to_be_falsy();
            expect("").to_be_falsy();
            expect("x").to_be_truthy();
            expect(None::<String>).to_be_falsy();
        });
        s.it("callbacks", || {
            expect_fn(|| panic!("expected")).to_throw();
            expect_fn(|| {}).not().to_throw();
            expect_fn(|| expect(1).to_be(2)).to_throw();
        });
    });
}

fn ordering(s: &mut Suite<'_>) {
    s.describe("ordering", |s| {
        s.it("scalars", || {
            expect(3).to_be_greater_than(2);
            expect(3).to_be_greater_than_or_equal_to(3);
            expect(-1.5).to_be_less_than(0.0);
            expect(7u64).to_be_less_than_or_equal_to(7);
            expect(2).not().to_be_greater_than(2);
        });
        s.it("references", || {
            expect(point(1, 5)).to_be_less_than(point(2, 0));
            expect(String::from("b")).to_be_greater_than(String::from("a"));
        });
        s.it("guards hold under negation", || {
            expect_fn(|| expect(f64::NAN).not().to_be_greater_than(1.0)).to_throw();
            expect_fn(|| expect(1.0).not().to_be_less_than(f64::NAN)).to_throw();
            expect_fn(|| expect(None).not().to_be_less_than(Some(point(0, 0)))).to_throw();
        });
    });
}

fn floats(s: &mut Suite<'_>) {
    s.describe("floats", |s| {
        s.it("closeness", || {
            expect(0.1 + 0.2).to_be_close_to(0.3);
            expect(1.0).to_be_close_to_places(1.04, 1);
            expect(1.0).not().to_be_close_to_places(2.0, 0);
            expect_fn(|| expect(1).to_be_close_to(1)).to_throw();
            expect_fn(|| expect(f64::INFINITY).not().to_be_close_to(1.0)).to_throw();
        });
        s.it("nan and finite", || {
            expect(f64::NAN).to_be_nan();
            expect(1.0f32).not().to_be_nan();
            expect(1.0).to_be_finite();
            expect(f64::INFINITY).not().to_be_finite();
            expect_fn(|| expect(1).not().to_be_nan()).to_throw();
        });
    });
}

fn nulls_and_lengths(s: &mut Suite<'_>) {
    s.describe("nulls and lengths", |s| {
        s.it("nulls", || {
            expect(None::<Rc<Point>>).to_be_null();
            expect(Some(point(0, 0))).not().to_be_null();
            expect(0).not().to_be_null();
        });
        s.it("lengths", || {
            let words: &[u32] = &[1, 2, 3];
            expect(words).to_have_length(3);
            expect("héllo").to_have_length(5);
            expect(Rc::new(Packet {
                payload: vec![0; 16],
            }))
            .to_have_length(16);
            expect_fn(|| expect(None::<String>).to_have_length(0)).to_throw();
        });
    });
}

fn lifecycle(s: &mut Suite<'_>) {
    let order = Rc::new(RefCell::new(Vec::<&'static str>::new()));
    let record = |label: &'static str| {
        let order = Rc::clone(&order);
        move || order.borrow_mut().push(label)
    };
    s.describe("lifecycle", |s| {
        s.before_all(record("outer before_all"));
        s.before_each(record("outer before_each"));
        s.after_each(record("outer after_each"));
        s.describe("inner", |s| {
            s.before_all(record("inner before_all"));
            s.before_each(record("inner before_each"));
            s.after_each(record("inner after_each"));
            s.after_all(record("inner after_all"));
            s.it("runs inside every hook", record("body"));
        });
        let seen = Rc::clone(&order);
        s.it("sees hooks in order", move || {
            log("checking hook order");
            log(seen.borrow().len());
            expect(seen.borrow().as_slice() == EXPECTED_ORDER).to_be_truthy();
        });
        s.throws("negated test passes by aborting", || expect(1).to_be(2));
        s.throws_with("negated test with a message", "must abort", || {
            debug();
            panic!("aborted");
        });
        s.todo("performance sampling");
    });
}

// Direct tests run before nested groups.
const EXPECTED_ORDER: &[&str] = &["outer before_all", "outer before_each"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;
    use crate::reporter::EmptyReporter;

    #[test]
    fn smoke_module_passes() {
        let summary = TestContext::default()
            .run(&SmokeModule, &mut EmptyReporter)
            .unwrap();
        let failures: Vec<_> = summary
            .failures()
            .map(|(group, test)| format!("{group}/{}: {:?}", test.name, test.message))
            .collect();
        assert!(failures.is_empty(), "{failures:#?}");
        assert!(summary.all_passed());
        assert_eq!(summary.todos, 1);
        assert_eq!(summary.skipped, 0);
    }
}
