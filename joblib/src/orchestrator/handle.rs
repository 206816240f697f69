use super::monitor::MonitorOutcome;
use crate::error::{self, MonitorError};
use crate::types::{JobId, JobReport};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a monitor running in its own task.
///
/// Stopping is cooperative: `request_stop` only raises the signal, the monitor
/// notices it at its next suspension point. Requesting a stop more than once,
/// or after the monitor finished, does nothing.
pub struct MonitorHandle {
    job_id: JobId,
    cancel: CancellationToken,
    task: Option<JoinHandle<error::Result<MonitorOutcome>>>,
    updates: Option<mpsc::UnboundedReceiver<JobReport>>,
}

impl MonitorHandle {
    pub(super) fn new(
        job_id: JobId,
        cancel: CancellationToken,
        task: JoinHandle<error::Result<MonitorOutcome>>,
        updates: mpsc::UnboundedReceiver<JobReport>,
    ) -> Self {
        Self {
            job_id,
            cancel,
            task: Some(task),
            updates: Some(updates),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn request_stop(&self) {
        if !self.cancel.is_cancelled() {
            debug!(job_id = %self.job_id, "stop requested");
        }
        self.cancel.cancel();
    }

    /// A cloneable way to request a stop, usable after the handle was consumed
    /// by `await_completion`.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Take the stream of status snapshots the monitor observes.
    ///
    /// Returns `None` on every call after the first.
    pub fn take_updates(&mut self) -> Option<mpsc::UnboundedReceiver<JobReport>> {
        self.updates.take()
    }

    /// Wait for the monitor to end.
    pub async fn await_completion(mut self) -> Result<MonitorOutcome, MonitorError> {
        let task = self.task.take().ok_or(MonitorError::Aborted)?;
        match task.await {
            Ok(result) => result.map_err(MonitorError::from),
            Err(e) => {
                debug!(job_id = %self.job_id, error = %e, "monitor task did not complete");
                Err(MonitorError::Aborted)
            }
        }
    }
}

impl Drop for MonitorHandle {
    // a monitor nobody can observe anymore has no reason to keep polling
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Clone, Debug)]
pub struct StopHandle {
    cancel: CancellationToken,
}

impl StopHandle {
    pub fn request_stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
