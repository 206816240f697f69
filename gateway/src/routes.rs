use crate::store::{JobStoreHandle, StoreError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use joblib::wire::{CancelJobRequest, JobStatusResponse, StartJobRequest, StartJobResponse};
use joblib::JobId;
use tracing::{debug, warn};

pub fn router(store: JobStoreHandle) -> Router {
    Router::new()
        .route("/jobs", post(start_job))
        .route("/jobs/cancel", post(cancel_job))
        .route("/jobs/{job_id}", get(job_status))
        .with_state(store)
}

async fn start_job(
    State(store): State<JobStoreHandle>,
    Json(request): Json<StartJobRequest>,
) -> Result<Json<StartJobResponse>, StoreError> {
    let job_id = store.start_job(request.job_type, request.job_name).await?;
    Ok(Json(StartJobResponse {
        job_id: Some(job_id),
    }))
}

async fn job_status(
    State(store): State<JobStoreHandle>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobStatusResponse>, StoreError> {
    let report = store.job_status(job_id).await?;
    debug!(job_id = %job_id, status = %report.status, "status requested");
    Ok(Json(report.into()))
}

async fn cancel_job(
    State(store): State<JobStoreHandle>,
    Json(request): Json<CancelJobRequest>,
) -> Result<StatusCode, StoreError> {
    store.cancel_job(request.job_id).await?;
    Ok(StatusCode::OK)
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            // not-found and not-cancellable share a status: clients treat both as "nothing to do"
            StoreError::NotFound(_) | StoreError::NotCancellable { .. } => StatusCode::NOT_FOUND,
            StoreError::Closed => StatusCode::SERVICE_UNAVAILABLE,
        };
        warn!(status = %status, error = %self, "request rejected");
        (status, self.to_string()).into_response()
    }
}
