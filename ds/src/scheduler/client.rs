//! SchedulerClient trait definition

use async_trait::async_trait;

use super::{ScheduleRequest, SchedulerError};

/// One request, one response: the scheduler keeps no state between calls
///
/// Implementations return the raw response body; parsing belongs to the
/// caller so that malformed payloads are reported separately from
/// transport and authorization failures.
#[async_trait]
pub trait SchedulerClient: Send + Sync {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<String, SchedulerError>;
}
