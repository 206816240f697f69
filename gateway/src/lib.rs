//! A small in-memory job gateway speaking the same HTTP interface the
//! client expects. Jobs do no real work: each one stays `Running` for a fixed
//! time and then completes.

mod routes;
mod store;

pub use routes::router;
pub use store::{JobStoreHandle, StoreError};

use std::{future::Future, io, time::Duration};
use tokio::net::TcpListener;
use tracing::info;

/// Capacity of the store's request queue.
pub const STORE_CAPACITY: usize = 1024;

/// Serve the gateway on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, job_duration: Duration, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = JobStoreHandle::spawn(STORE_CAPACITY, job_duration);
    info!(addr = %listener.local_addr()?, ?job_duration, "gateway listening");
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}
