use crate::types::JobId;
use thiserror::Error;

/// Jobs started during this run, in the order they were started.
///
/// Append-only and owned by whoever drives the console; nothing here is shared.
#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    jobs: Vec<JobId>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Job ID cannot be empty")]
    Empty,
    #[error("Invalid job ID format")]
    Invalid(String),
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, job_id: JobId) {
        self.jobs.push(job_id);
    }

    pub fn jobs(&self) -> &[JobId] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Look up a job by its 1-based position.
    pub fn get(&self, position: usize) -> Option<JobId> {
        position
            .checked_sub(1)
            .and_then(|index| self.jobs.get(index))
            .copied()
    }

    /// Turn user input into a job id.
    ///
    /// A number within `1..=len` selects a recorded job, anything else must
    /// parse as a job id.
    pub fn resolve(&self, input: &str) -> Result<JobId, SelectionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SelectionError::Empty);
        }
        if let Some(job_id) = input.parse::<usize>().ok().and_then(|n| self.get(n)) {
            return Ok(job_id);
        }
        input
            .parse::<JobId>()
            .map_err(|_| SelectionError::Invalid(input.to_string()))
    }
}
