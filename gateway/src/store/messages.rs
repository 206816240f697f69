use super::StoreError;
use joblib::{JobId, JobReport};
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum StoreMessage {
    StartJob {
        job_type: String,
        job_name: String,
        response: oneshot::Sender<JobId>,
    },
    GetStatus {
        job_id: JobId,
        response: oneshot::Sender<Result<JobReport, StoreError>>,
    },
    CancelJob {
        job_id: JobId,
        response: oneshot::Sender<Result<(), StoreError>>,
    },
}
