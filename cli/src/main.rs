mod arg_parser;
mod config;
mod logging;
mod render;
mod shell;

use arg_parser::{ArgParser, SubCommand};
use clap::Parser;
use config::CliConfig;
use joblib::{HttpJobClient, JobOrchestrator};
use shell::Shell;
use std::{io, process::ExitCode};
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = ArgParser::parse();

    let mut config = CliConfig::load(args.config.as_deref())?;
    config.apply_args(args.server.as_deref(), args.timeout_ms);
    config.validate()?;
    let _log_guard = logging::init(&config.logging)?;

    let client = HttpJobClient::new(config.gateway_url()?, config.timeout())?;
    info!(gateway = %client.base_url(), "starting jobs client");
    let orchestrator = JobOrchestrator::new(client).with_poll_interval(config.poll_interval());
    let mut shell = Shell::new(orchestrator, BufReader::new(tokio::io::stdin()), io::stdout());

    // one-shot commands report failure through the exit code
    let succeeded = match args.sub_command.unwrap_or(SubCommand::Menu) {
        SubCommand::Menu => {
            render::banner(&mut io::stdout())?;
            shell.run_menu().await?;
            true
        }
        SubCommand::Start { job_type, job_name } => {
            shell.start_job(&job_type, &job_name).await?.is_some()
        }
        SubCommand::Status { job_id } => shell.show_status(job_id).await?,
        SubCommand::Cancel { job_id } => shell.cancel_job(job_id).await?,
        SubCommand::Monitor { job_id } => shell.monitor_job(job_id).await?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
