mod handle;
mod monitor;

pub use self::handle::{MonitorHandle, StopHandle};
pub use self::monitor::MonitorOutcome;

use self::monitor::MonitorSession;
use crate::client::JobApi;
use crate::error::Result;
use crate::types::{JobId, JobReport};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How long a monitor waits between two status fetches of a running job.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Drives job lifecycles against a `JobApi`: start, query, cancel and monitor.
///
/// Cloning is cheap; clones share the same client.
pub struct JobOrchestrator<C> {
    client: Arc<C>,
    poll_interval: Duration,
}

impl<C> Clone for JobOrchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            poll_interval: self.poll_interval,
        }
    }
}

impl<C: JobApi + 'static> JobOrchestrator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn start_job(&self, job_type: &str, job_name: &str) -> Result<JobId> {
        self.client.start(job_type, job_name).await
    }

    pub async fn job_status(&self, job_id: JobId) -> Result<JobReport> {
        self.client.get_status(job_id).await
    }

    pub async fn cancel_job(&self, job_id: JobId) -> Result<bool> {
        self.client.cancel(job_id).await
    }

    /// Poll `job_id` until it reaches a terminal status or `cancel` fires.
    ///
    /// Every fetched snapshot is also sent to `updates` when one is given.
    /// A failed fetch ends the monitor with that error; nothing is retried.
    pub async fn monitor(
        &self,
        job_id: JobId,
        cancel: CancellationToken,
        updates: Option<mpsc::UnboundedSender<JobReport>>,
    ) -> Result<MonitorOutcome> {
        let session = MonitorSession::new(job_id, cancel, updates);
        monitor::run(self.client.as_ref(), session, self.poll_interval).await
    }

    /// Spawn a monitor for `job_id` on the current runtime.
    ///
    /// The returned handle owns the monitor's cancellation signal; only one
    /// monitor should be driven per handle.
    pub fn start_monitor(&self, job_id: JobId) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let session = MonitorSession::new(job_id, cancel.clone(), Some(updates_tx));
        let client = Arc::clone(&self.client);
        let poll_interval = self.poll_interval;
        let task = tokio::spawn(async move {
            monitor::run(client.as_ref(), session, poll_interval).await
        });
        MonitorHandle::new(job_id, cancel, task, updates_rx)
    }
}
