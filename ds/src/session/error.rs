//! Session error types

use thiserror::Error;

use crate::registry::RegistryError;
use crate::scheduler::SchedulerError;
use crate::store::{ApplyError, DirectiveError, MoveError};
use crate::wire::ParseError;

/// Errors surfaced by an editing session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Move rejected: {0}")]
    Move(#[from] MoveError),

    #[error("Directive rejected: {0}")]
    Directive(#[from] DirectiveError),

    #[error("Saved preferences rejected: {0}")]
    Apply(#[from] ApplyError),

    #[error("Malformed scheduler response: {0}")]
    Parse(#[from] ParseError),

    #[error("Credential expired or rejected, sign in again")]
    AuthExpired,

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Not signed in")]
    NoCredential,

    #[error("Scheduler call failed: {0}")]
    Scheduler(SchedulerError),
}

impl From<SchedulerError> for SessionError {
    fn from(err: SchedulerError) -> Self {
        if err.is_auth_expired() {
            SessionError::AuthExpired
        } else {
            SessionError::Scheduler(err)
        }
    }
}
