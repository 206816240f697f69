use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type JobId = Uuid;
pub type JobType = String;
pub type JobName = String;

/// Status of a job as reported by the gateway.
///
/// The vocabulary belongs to the gateway, so values this client does not know
/// about are kept verbatim in `Other`. Everything except `Running` is terminal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Cancelled => "Cancelled",
            JobStatus::Failed => "Failed",
            JobStatus::Other(status) => status,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

impl From<String> for JobStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "Running" => JobStatus::Running,
            "Completed" => JobStatus::Completed,
            "Cancelled" => JobStatus::Cancelled,
            "Failed" => JobStatus::Failed,
            _ => JobStatus::Other(status),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a started job. Fixed once the gateway has accepted it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobDescriptor {
    pub job_id: JobId,
    pub job_type: JobType,
    pub job_name: JobName,
}

/// A single status snapshot: what the job is and what state it was in when fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobReport {
    pub descriptor: JobDescriptor,
    pub status: JobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_running_is_non_terminal() {
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Other("Paused".into()).is_terminal());
    }

    #[test]
    fn unknown_status_survives_serde() {
        let status: JobStatus = serde_json::from_str("\"Queued\"").unwrap();
        assert_eq!(status, JobStatus::Other("Queued".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Queued\"");

        let status: JobStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(status, JobStatus::Completed);
    }
}
