//! Pass-through diagnostic channel.
//!
//! Test bodies call [`log`] and [`debug`]; entries are buffered per thread and drained by the
//! runner into the test (or group) that was executing when they were produced.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::value::{Expectable, Shape};

thread_local! {
    static PENDING: RefCell<Vec<Diagnostic>> = const { RefCell::new(Vec::new()) };
}

/// A logged diagnostic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LogValue {
    Null,
    String(String),
    Numeric(f64),
    Reference { bytes: Vec<u8> },
}

/// One entry on the diagnostic channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    Log { value: LogValue },
    /// Request that an attached debugger halt here.
    DebugHalt,
}

impl LogValue {
    /// Marshal any expectable value into a log entry.
    #[must_use]
    pub fn of<T: Expectable>(value: &T) -> Self {
        match value.shape() {
            Shape::Null => Self::Null,
            Shape::Str(s) => Self::String(s.to_string()),
            Shape::Integer(v) => Self::Numeric(v as f64),
            Shape::Float(v) => Self::Numeric(v),
            Shape::Buffer { bytes, .. } | Shape::Object { bytes, .. } => Self::Reference {
                bytes: bytes.into_owned(),
            },
        }
    }
}

/// Log a value to the runner.
pub fn log<T: Expectable>(value: T) {
    let entry = Diagnostic::Log {
        value: LogValue::of(&value),
    };
    PENDING.with(|pending| pending.borrow_mut().push(entry));
}

/// Ask the runner to halt an attached debugger.
pub fn debug() {
    PENDING.with(|pending| pending.borrow_mut().push(Diagnostic::DebugHalt));
}

/// Take every diagnostic produced on this thread since the last drain.
#[must_use]
pub fn drain() -> Vec<Diagnostic> {
    PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_entries_in_order() {
        let _ = drain();
        log("hello");
        log(3u8);
        log(None::<String>);
        debug();
        let bytes: &[u8] = &[9, 8];
        log(bytes);
        assert_eq!(
            drain(),
            vec![
                Diagnostic::Log {
                    value: LogValue::String("hello".to_string())
                },
                Diagnostic::Log {
                    value: LogValue::Numeric(3.0)
                },
                Diagnostic::Log {
                    value: LogValue::Null
                },
                Diagnostic::DebugHalt,
                Diagnostic::Log {
                    value: LogValue::Reference { bytes: vec![9, 8] }
                },
            ]
        );
        assert!(drain().is_empty());
    }
}
