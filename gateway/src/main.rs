use clap::Parser;
use std::{error, net::SocketAddr, time::Duration};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run an in-memory job gateway
#[derive(Debug, Parser)]
struct Args {
    /// Address to listen on
    #[clap(long, default_value = "127.0.0.1:5000", env = "JOBS_GATEWAY_LISTEN")]
    listen: SocketAddr,

    /// How long every job runs before it completes, in milliseconds
    #[clap(long, default_value_t = 10_000, env = "JOBS_GATEWAY_JOB_DURATION_MS")]
    job_duration_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let listener = TcpListener::bind(args.listen).await?;
    gateway::serve(
        listener,
        Duration::from_millis(args.job_duration_ms),
        async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        },
    )
    .await?;

    Ok(())
}
