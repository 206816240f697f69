//! Client side of a remote job service: typed access to the gateway, a
//! cancellable status monitor and the per-session list of started jobs.

mod client;
pub mod error;
#[cfg(test)]
mod fake;
mod orchestrator;
mod registry;
pub mod types;
pub mod wire;

pub use client::{HttpJobClient, JobApi};
pub use error::{JobError, MonitorError};
pub use orchestrator::{
    JobOrchestrator, MonitorHandle, MonitorOutcome, StopHandle, DEFAULT_POLL_INTERVAL,
};
pub use registry::{SelectionError, SessionRegistry};
pub use types::{JobDescriptor, JobId, JobReport, JobStatus};

// the gateway address is handed in already parsed
pub use reqwest::Url;
