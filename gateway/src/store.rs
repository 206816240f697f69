mod actor;
mod messages;

use self::{actor::JobStore, messages::StoreMessage};
use joblib::{JobId, JobReport, JobStatus};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("job {job_id} is already {status} and cannot be cancelled")]
    NotCancellable { job_id: JobId, status: JobStatus },
    #[error("job store is not running")]
    Closed,
}

/// Owner of all job state in the gateway.
///
/// This struct is an actor handle: the jobs live in the task spawned by
/// `JobStoreHandle::spawn` and every method is a message round trip, so the
/// handle can be cloned into request handlers without any locking.
#[derive(Clone)]
pub struct JobStoreHandle {
    sender: mpsc::Sender<StoreMessage>,
}

impl JobStoreHandle {
    /// Spawn a new store whose jobs run for `job_duration` before completing.
    ///
    /// `message_capacity` bounds the queue of requests waiting on the store.
    pub fn spawn(message_capacity: usize, job_duration: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(message_capacity);
        JobStore::spawn(receiver, job_duration);
        Self { sender }
    }

    pub async fn start_job(&self, job_type: String, job_name: String) -> Result<JobId, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(StoreMessage::StartJob {
            job_type,
            job_name,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| StoreError::Closed)
    }

    pub async fn job_status(&self, job_id: JobId) -> Result<JobReport, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(StoreMessage::GetStatus {
            job_id,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| StoreError::Closed)?
    }

    pub async fn cancel_job(&self, job_id: JobId) -> Result<(), StoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(StoreMessage::CancelJob {
            job_id,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| StoreError::Closed)?
    }

    async fn send(&self, msg: StoreMessage) -> Result<(), StoreError> {
        self.sender.send(msg).await.map_err(|_| StoreError::Closed)
    }
}
