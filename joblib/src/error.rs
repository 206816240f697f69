use crate::types::JobId;
use std::result;
use thiserror::Error;

/// Failures of the three gateway operations.
///
/// `NotFound` is an expected answer from the gateway and callers are meant to
/// match on it; `Transport` and `Protocol` mean the exchange itself went wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("job {job_id} not found")]
    NotFound { job_id: JobId },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl JobError {
    pub fn transport(message: impl Into<String>) -> Self {
        JobError::Transport(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        JobError::Protocol(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, JobError::NotFound { .. })
    }
}

impl From<reqwest::Error> for JobError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            JobError::Protocol(err.to_string())
        } else {
            JobError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JobError {
    fn from(err: serde_json::Error) -> Self {
        JobError::Protocol(err.to_string())
    }
}

pub type Result<T> = result::Result<T, JobError>;

/// Why awaiting a monitor did not yield an outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error(transparent)]
    Job(#[from] JobError),
    #[error("monitor task aborted")]
    Aborted,
}
