//! Scheduler error types

use thiserror::Error;

/// Errors from a scheduler call
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Credential rejected by scheduler (HTTP {status})")]
    AuthExpired { status: u16 },

    #[error("Scheduler error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchedulerError {
    /// Map a non-success HTTP status to an error
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => SchedulerError::AuthExpired { status },
            _ => SchedulerError::Api { status, message },
        }
    }

    /// Check if the credential needs refreshing
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, SchedulerError::AuthExpired { .. })
    }
}
