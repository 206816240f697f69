use super::messages::StoreMessage;
use super::StoreError;
use joblib::{JobDescriptor, JobId, JobReport, JobStatus};
use std::{collections::HashMap, time::Duration};
use tokio::{select, sync::mpsc};
use tracing::{debug, info};

/// Job type whose runs end as `Failed` instead of `Completed`.
const FAILING_JOB_TYPE: &str = "fail";

pub struct JobStore {
    inbox: mpsc::Receiver<StoreMessage>,
    finished_tx: mpsc::UnboundedSender<JobId>,
    finished_rx: mpsc::UnboundedReceiver<JobId>,
    jobs: HashMap<JobId, JobReport>,
    job_duration: Duration,
}

impl JobStore {
    pub fn spawn(inbox: mpsc::Receiver<StoreMessage>, job_duration: Duration) {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        let actor = Self {
            inbox,
            finished_tx,
            finished_rx,
            jobs: HashMap::new(),
            job_duration,
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        use self::StoreMessage::*;
        loop {
            select! {
                maybe_msg = self.inbox.recv() => {
                    // every handle is gone, nobody can ask about jobs anymore
                    let Some(msg) = maybe_msg else { return };
                    match msg {
                        StartJob { job_type, job_name, response } => {
                            let _ = response.send(self.start_job(job_type, job_name));
                        }
                        GetStatus { job_id, response } => {
                            let _ = response.send(self.job_status(job_id));
                        }
                        CancelJob { job_id, response } => {
                            let _ = response.send(self.cancel_job(job_id));
                        }
                    }
                }
                Some(job_id) = self.finished_rx.recv() => {
                    self.finish_job(job_id);
                }
            }
        }
    }

    fn start_job(&mut self, job_type: String, job_name: String) -> JobId {
        let job_id = JobId::new_v4();
        info!(job_id = %job_id, job_type = %job_type, job_name = %job_name, "job started");
        self.jobs.insert(
            job_id,
            JobReport {
                descriptor: JobDescriptor {
                    job_id,
                    job_type,
                    job_name,
                },
                status: JobStatus::Running,
            },
        );

        // the job "runs" until its timer fires
        let finished_tx = self.finished_tx.clone();
        let job_duration = self.job_duration;
        tokio::spawn(async move {
            tokio::time::sleep(job_duration).await;
            let _ = finished_tx.send(job_id);
        });
        job_id
    }

    fn job_status(&self, job_id: JobId) -> Result<JobReport, StoreError> {
        self.jobs
            .get(&job_id)
            .cloned()
            .ok_or(StoreError::NotFound(job_id))
    }

    fn cancel_job(&mut self, job_id: JobId) -> Result<(), StoreError> {
        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or(StoreError::NotFound(job_id))?;
        if job.status.is_terminal() {
            return Err(StoreError::NotCancellable {
                job_id,
                status: job.status.clone(),
            });
        }
        job.status = JobStatus::Cancelled;
        info!(job_id = %job_id, "job cancelled");
        Ok(())
    }

    fn finish_job(&mut self, job_id: JobId) {
        if let Some(job) = self.jobs.get_mut(&job_id) {
            if job.status.is_terminal() {
                debug!(job_id = %job_id, status = %job.status, "job already ended");
                return;
            }
            job.status = if job.descriptor.job_type.eq_ignore_ascii_case(FAILING_JOB_TYPE) {
                JobStatus::Failed
            } else {
                JobStatus::Completed
            };
            info!(job_id = %job_id, status = %job.status, "job finished");
        }
    }
}

