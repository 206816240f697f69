//! Scripted `JobApi` used by the unit tests.

use crate::client::JobApi;
use crate::error::Result;
use crate::types::{JobDescriptor, JobId, JobReport, JobStatus};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Replays a fixed sequence of status answers and counts fetches.
pub struct Scripted {
    answers: Mutex<VecDeque<Result<JobStatus>>>,
    fetches: AtomicUsize,
}

impl Scripted {
    pub fn new(answers: Vec<Result<JobStatus>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

pub fn report(job_id: JobId, status: JobStatus) -> JobReport {
    JobReport {
        descriptor: JobDescriptor {
            job_id,
            job_type: "Report".into(),
            job_name: "Q1".into(),
        },
        status,
    }
}

#[async_trait]
impl JobApi for Scripted {
    async fn start(&self, _: &str, _: &str) -> Result<JobId> {
        Ok(JobId::new_v4())
    }

    async fn get_status(&self, job_id: JobId) -> Result<JobReport> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let status = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetched past the end of the script")?;
        Ok(report(job_id, status))
    }

    async fn cancel(&self, _: JobId) -> Result<bool> {
        Ok(false)
    }
}
