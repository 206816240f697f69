//! Request and response bodies exchanged with the job gateway.
//!
//! Field names follow the gateway's camelCase JSON.

use crate::types::{JobDescriptor, JobId, JobName, JobReport, JobStatus, JobType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequest {
    pub job_type: JobType,
    pub job_name: JobName,
}

/// `job_id` is optional on the wire so a response without one can be reported
/// as a protocol error instead of a generic decode failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobResponse {
    #[serde(default)]
    pub job_id: Option<JobId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub job_type: JobType,
    pub job_name: JobName,
    pub status: JobStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelJobRequest {
    pub job_id: JobId,
}

impl From<JobStatusResponse> for JobReport {
    fn from(response: JobStatusResponse) -> Self {
        JobReport {
            descriptor: JobDescriptor {
                job_id: response.job_id,
                job_type: response.job_type,
                job_name: response.job_name,
            },
            status: response.status,
        }
    }
}

impl From<JobReport> for JobStatusResponse {
    fn from(report: JobReport) -> Self {
        JobStatusResponse {
            job_id: report.descriptor.job_id,
            job_type: report.descriptor.job_type,
            job_name: report.descriptor.job_name,
            status: report.status,
        }
    }
}
