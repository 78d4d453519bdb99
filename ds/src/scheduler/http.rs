//! HTTP scheduler client
//!
//! Posts the request as JSON and hands back the response body. Exactly one
//! attempt per call.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::{ScheduleRequest, SchedulerClient, SchedulerError};
use crate::config::SchedulerConfig;

/// Scheduler reached over HTTP
pub struct HttpSchedulerClient {
    url: String,
    http: Client,
}

impl HttpSchedulerClient {
    /// Create a client from configuration
    pub fn from_config(config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        debug!(?config, "from_config: called");
        Self::new(&config.url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(url: &str, timeout: Duration) -> Result<Self, SchedulerError> {
        debug!(%url, ?timeout, "HttpSchedulerClient::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.to_string(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SchedulerClient for HttpSchedulerClient {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<String, SchedulerError> {
        debug!(url = %self.url, source = ?request.source, "schedule: called");
        let response = self.http.post(&self.url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "schedule: scheduler returned error status");
            return Err(SchedulerError::from_status(status.as_u16(), body));
        }

        info!(bytes = body.len(), "Scheduler responded");
        Ok(body)
    }
}
