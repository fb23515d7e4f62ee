//! Guarded calls and abort interception.
//!
//! An abort is a Rust panic. [`guarded`] runs a callback with the abort isolated and converts
//! it into an [`Abort`] record. [`install_abort_hook`] replaces the process panic hook once so
//! that aborts raised inside a guarded region are recorded (location) instead of printed; panics
//! outside any guarded region still reach the previous hook.
//!
//! All state is thread-local: independent modules running on separate threads never observe
//! each other's aborts.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use serde::{Deserialize, Serialize};

use crate::protocol::AssertionFailure;

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// A captured abort: message, source location and, for assertion failures, the reported values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abort {
    pub message: String,
    pub location: Option<String>,
    pub failure: Option<AssertionFailure>,
}

impl Abort {
    fn from_payload(payload: &(dyn Any + Send), location: Option<String>) -> Self {
        if let Some(failure) = payload.downcast_ref::<AssertionFailure>() {
            return Self {
                message: failure.to_string(),
                location: Some(failure.location.clone()),
                failure: Some(failure.clone()),
            };
        }
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "aborted with a non-string payload".to_string()
        };
        Self {
            message,
            location,
            failure: None,
        }
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

/// Install the abort-intercepting panic hook. Idempotent.
pub fn install_abort_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
            LAST_LOCATION.with(|slot| *slot.borrow_mut() = location);
        }));
    });
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        GUARD_DEPTH.with(|d| d.set(d.get() + 1));
        Self
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        GUARD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Run a one-shot closure with aborts isolated.
pub fn guarded_once<R>(f: impl FnOnce() -> R) -> Result<R, Abort> {
    LAST_LOCATION.with(|slot| slot.borrow_mut().take());
    let result = {
        let _depth = DepthGuard::enter();
        panic::catch_unwind(AssertUnwindSafe(f))
    };
    result.map_err(|payload| {
        let location = LAST_LOCATION.with(|slot| slot.borrow_mut().take());
        Abort::from_payload(payload.as_ref(), location)
    })
}

/// Invoke a callback handle with aborts isolated.
pub fn guarded(callback: &dyn Fn()) -> Result<(), Abort> {
    guarded_once(callback)
}

/// The host's guarded-call primitive: `true` if the callback returned normally.
#[must_use]
pub fn try_call(callback: &dyn Fn()) -> bool {
    guarded(callback).is_ok()
}
