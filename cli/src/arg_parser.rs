use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Submit, inspect, cancel and monitor jobs on a job gateway
#[derive(Debug, Parser)]
#[clap(name = "jobs", version)]
pub struct ArgParser {
    /// The address of the gateway, e.g. http://localhost:5000/
    #[clap(short = 's', long = "server")]
    pub server: Option<String>,
    /// Configuration file (defaults to ./jobs-client.toml when present)
    #[clap(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// HTTP request timeout in milliseconds
    #[clap(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,
    /// The sub-command to use; the interactive menu when omitted
    #[clap(subcommand)]
    pub sub_command: Option<SubCommand>,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Subcommand)]
pub enum SubCommand {
    /// run the interactive menu
    Menu,
    /// start a new job
    Start {
        #[clap(long)]
        /// type of the job
        job_type: String,

        #[clap(long)]
        /// name of the job
        job_name: String,
    },
    /// get a job's status
    Status {
        /// Uuid string
        job_id: Uuid,
    },
    /// cancel a job
    Cancel {
        /// Uuid string
        job_id: Uuid,
    },
    /// follow a job until it finishes, press Enter to stop
    Monitor {
        /// Uuid string
        job_id: Uuid,
    },
}
