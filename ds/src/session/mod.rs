//! Editing session
//!
//! A session owns the registry, the constraint store, the credential and
//! the last displayed results. Submissions are single-flight and tagged
//! with the session generation, so a response that arrives after the
//! session was reset or signed out is dropped instead of applied.

mod core;
mod error;

pub use self::core::{Session, SubmissionOutcome, SubmissionTicket};
pub use error::SessionError;
