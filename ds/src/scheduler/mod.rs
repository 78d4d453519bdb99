//! External scheduler client
//!
//! The scheduler is a remote service that turns a constraint specification
//! into ordered schedules. This module owns the request shape, the client
//! trait and its HTTP implementation. The client never retries; a rejected
//! credential is surfaced as [`SchedulerError::AuthExpired`].

pub mod client;
mod error;
mod http;
mod request;

pub use client::SchedulerClient;
pub use error::SchedulerError;
pub use http::HttpSchedulerClient;
pub use request::{Credential, ScheduleRequest, SheetSource};
