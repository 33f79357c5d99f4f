//! Status endpoint client: what the scheduler says is live right now.

use std::future::Future;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use super::SchedulerError;
use crate::limits::fraction_to_percent;

/// Limits as reported by the scheduler's status endpoint. Only the nominal
/// side is reported; that is all convergence polling compares.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportedLimits {
    #[serde(rename = "Limits", default)]
    limits: IndexMap<String, ReportedSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReportedSection {
    #[serde(rename = "Shares", default)]
    shares: IndexMap<String, ReportedShare>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReportedShare {
    nominal: Option<f64>,
}

impl ReportedLimits {
    /// Parse an endpoint response body.
    pub fn from_json(text: &str) -> Result<Self, SchedulerError> {
        serde_json::from_str(text).map_err(|e| SchedulerError::InvalidResponse(e.to_string()))
    }

    /// The reported nominal for (section, show) as a percentage rounded to
    /// one decimal, or `None` when the scheduler does not list the pair.
    pub fn nominal_percent(&self, section: &str, show: &str) -> Option<f64> {
        let fraction = self.limits.get(section)?.shares.get(show)?.nominal?;
        Some(fraction_to_percent(fraction))
    }
}

/// Async fetch of the scheduler's reported limits.
pub trait StatusClient: Send + Sync {
    fn fetch_limits(&self) -> impl Future<Output = Result<ReportedLimits, SchedulerError>> + Send;
}

/// Production client hitting the scheduler's queue endpoint over HTTP.
///
/// The endpoint is unauthenticated; a request timeout is always set so a
/// wedged scheduler cannot stall convergence polling indefinitely.
#[derive(Clone)]
pub struct HttpStatusClient {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SchedulerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SchedulerError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl StatusClient for HttpStatusClient {
    async fn fetch_limits(&self) -> Result<ReportedLimits, SchedulerError> {
        trace!(url = %self.url, "Fetching scheduler limits");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SchedulerError::Http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(url = %self.url, status = response.status().as_u16(), "Status endpoint error");
            return Err(SchedulerError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SchedulerError::Http(format!("Failed to read response: {}", e)))?;

        debug!(bytes = body.len(), "Scheduler limits fetched");
        ReportedLimits::from_json(&body)
    }
}
