//! Gateway access: the `JobApi` seam and its HTTP implementation.

use crate::error::{JobError, Result};
use crate::types::{JobId, JobReport};
use crate::wire::{CancelJobRequest, JobStatusResponse, StartJobRequest, StartJobResponse};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::{fmt, time::Duration};
use tracing::{debug, error, info, warn};

/// The three operations the gateway offers.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Start a job and return the id the gateway assigned to it.
    async fn start(&self, job_type: &str, job_name: &str) -> Result<JobId>;

    /// Fetch a fresh status snapshot. Unknown ids yield `JobError::NotFound`.
    async fn get_status(&self, job_id: JobId) -> Result<JobReport>;

    /// Ask the gateway to cancel a job.
    ///
    /// `Ok(false)` means the gateway did not know the job or could not cancel it
    /// anymore, which is an ordinary answer and not an error.
    async fn cancel(&self, job_id: JobId) -> Result<bool>;
}

/// `JobApi` over the gateway's JSON/HTTP interface.
#[derive(Clone)]
pub struct HttpJobClient {
    client: Client,
    base_url: Url,
}

impl fmt::Debug for HttpJobClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpJobClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpJobClient {
    /// Build a client for the gateway at `base_url`.
    ///
    /// Endpoints are joined relative to `base_url`, so a gateway mounted under a
    /// path prefix works as long as the prefix is part of the url.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("joblib/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| JobError::transport(format!("invalid endpoint {}: {}", path, e)))
    }
}

#[async_trait]
impl JobApi for HttpJobClient {
    async fn start(&self, job_type: &str, job_name: &str) -> Result<JobId> {
        info!(job_type, job_name, "starting job");
        let request = StartJobRequest {
            job_type: job_type.to_string(),
            job_name: job_name.to_string(),
        };
        let response = self
            .client
            .post(self.endpoint("jobs")?)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "start request failed");
                JobError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(unexpected_status(response, "start job").await);
        }

        let body: StartJobResponse = read_json(response).await?;
        let job_id = body
            .job_id
            .ok_or_else(|| JobError::protocol("start response did not include a job id"))?;
        info!(job_id = %job_id, "job started");
        Ok(job_id)
    }

    async fn get_status(&self, job_id: JobId) -> Result<JobReport> {
        debug!(job_id = %job_id, "requesting job status");
        let response = self
            .client
            .get(self.endpoint(&format!("jobs/{}", job_id))?)
            .send()
            .await
            .map_err(|e| {
                error!(job_id = %job_id, error = %e, "status request failed");
                JobError::from(e)
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                warn!(job_id = %job_id, "job not found");
                Err(JobError::NotFound { job_id })
            }
            status if status.is_success() => {
                let body: JobStatusResponse = read_json(response).await?;
                debug!(job_id = %job_id, status = %body.status, "received job status");
                Ok(body.into())
            }
            _ => Err(unexpected_status(response, "get job status").await),
        }
    }

    async fn cancel(&self, job_id: JobId) -> Result<bool> {
        info!(job_id = %job_id, "cancelling job");
        let response = self
            .client
            .post(self.endpoint("jobs/cancel")?)
            .json(&CancelJobRequest { job_id })
            .send()
            .await
            .map_err(|e| {
                error!(job_id = %job_id, error = %e, "cancel request failed");
                JobError::from(e)
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                let reason = response.text().await.unwrap_or_default();
                warn!(job_id = %job_id, reason = %reason, "job could not be cancelled");
                Ok(false)
            }
            status if status.is_success() => {
                info!(job_id = %job_id, "job cancelled");
                Ok(true)
            }
            _ => Err(unexpected_status(response, "cancel job").await),
        }
    }
}

/// Read the whole body first so a dropped connection stays a transport error
/// and only unparseable content becomes a protocol error.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await.map_err(|e| JobError::transport(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "malformed gateway response");
        JobError::from(e)
    })
}

async fn unexpected_status(response: Response, operation: &str) -> JobError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    error!(status = %status, body = %body, "failed to {}", operation);
    JobError::transport(format!("HTTP {}: {}", status, body))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_relative_to_base_path() {
        let base = Url::parse("http://localhost:5000/api").unwrap();
        let client = HttpJobClient::new(base, Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/api/");
        assert_eq!(
            client.endpoint("jobs/cancel").unwrap().as_str(),
            "http://localhost:5000/api/jobs/cancel"
        );
    }

    #[test]
    fn root_base_url_is_left_alone() {
        let base = Url::parse("http://localhost:5000/").unwrap();
        let client = HttpJobClient::new(base, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("jobs").unwrap().as_str(),
            "http://localhost:5000/jobs"
        );
    }
}
