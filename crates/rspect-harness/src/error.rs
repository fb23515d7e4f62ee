//! Fatal run errors.

use thiserror::Error;

use crate::context::RunState;

/// Errors that abort a whole run. Test and hook failures are recorded in the summary instead.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("malformed registration: {reason}")]
    MalformedRegistration { reason: String },
    #[error("registration aborted: {message}")]
    RegistrationAborted {
        message: String,
        location: Option<String>,
    },
    #[error("context is {found:?}, expected {expected:?}")]
    InvalidState { expected: RunState, found: RunState },
}
