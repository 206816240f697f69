use crate::client::JobApi;
use crate::error::Result;
use crate::types::{JobId, JobReport, JobStatus};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// How a monitor ended, when it did not end with an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// The job reached a terminal status; `report` is the last snapshot fetched.
    Finished { report: JobReport, polls: usize },
    /// Monitoring was stopped on request before the job finished.
    Cancelled {
        polls: usize,
        last_status: Option<JobStatus>,
    },
}

impl MonitorOutcome {
    pub fn polls(&self) -> usize {
        match self {
            MonitorOutcome::Finished { polls, .. } | MonitorOutcome::Cancelled { polls, .. } => {
                *polls
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MonitorOutcome::Cancelled { .. })
    }
}

/// State owned by a single monitoring call. Dropped when the call returns.
pub(super) struct MonitorSession {
    job_id: JobId,
    cancel: CancellationToken,
    last_status: Option<JobStatus>,
    polls: usize,
    updates: Option<mpsc::UnboundedSender<JobReport>>,
}

impl MonitorSession {
    pub(super) fn new(
        job_id: JobId,
        cancel: CancellationToken,
        updates: Option<mpsc::UnboundedSender<JobReport>>,
    ) -> Self {
        Self {
            job_id,
            cancel,
            last_status: None,
            polls: 0,
            updates,
        }
    }

    fn observe(&mut self, report: &JobReport) {
        self.polls += 1;
        self.last_status = Some(report.status.clone());
        if let Some(updates) = &self.updates {
            // the receiver going away does not stop the monitor
            let _ = updates.send(report.clone());
        }
    }

    fn cancelled(self) -> MonitorOutcome {
        info!(job_id = %self.job_id, polls = self.polls, "monitoring cancelled");
        MonitorOutcome::Cancelled {
            polls: self.polls,
            last_status: self.last_status,
        }
    }
}

/// The polling loop.
///
/// Cancellation is checked before every fetch and raced against the wait
/// between fetches. A fetch already in flight is allowed to finish, and a
/// terminal status it returns wins over a concurrent stop request.
pub(super) async fn run<C: JobApi + ?Sized>(
    client: &C,
    mut session: MonitorSession,
    poll_interval: Duration,
) -> Result<MonitorOutcome> {
    info!(job_id = %session.job_id, "monitoring job");
    loop {
        if session.cancel.is_cancelled() {
            return Ok(session.cancelled());
        }

        let report = client.get_status(session.job_id).await.map_err(|e| {
            error!(job_id = %session.job_id, error = %e, "error while monitoring job");
            e
        })?;
        session.observe(&report);

        if report.status.is_terminal() {
            info!(
                job_id = %session.job_id,
                status = %report.status,
                polls = session.polls,
                "job finished"
            );
            return Ok(MonitorOutcome::Finished {
                report,
                polls: session.polls,
            });
        }

        debug!(job_id = %session.job_id, "job is still running");
        tokio::select! {
            biased;
            _ = session.cancel.cancelled() => return Ok(session.cancelled()),
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
