use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::RANGE;
use axum::http::HeaderMap;
use axum::response::Response;
use meetflow_error::AppResult;
use uuid::Uuid;

pub async fn stream_audio(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let range_header = headers.get(RANGE).and_then(|v| v.to_str().ok());
    meetflow_streaming::serve_audio(state.job_repo.as_ref(), &state.artifacts, job_id, range_header).await
}
