//! Job status endpoint.

use crate::dto::JobStatusResponse;
use crate::WebResult;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use todo_kv_core::JobId;

/// Current status of a background job.
///
/// ```bash
/// curl http://localhost:8000/api/jobs/6f1c...
/// # {"id":"6f1c...","status":"finished","result":{"completed":3,"message":"Completed 3 tasks"},"error":null}
/// ```
pub async fn get_job(
    Path(job_id): Path<String>,
    State(state): State<AppState>,
) -> WebResult<Json<JobStatusResponse>> {
    let record = state.jobs.status(&JobId::from_string(job_id)).await?;
    Ok(Json(record.into()))
}
