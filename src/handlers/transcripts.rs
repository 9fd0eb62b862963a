use super::jobs::require_job_basename;
use crate::dto::{MessageResponse, TranscriptResponse, TranscriptUpdateRequest};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use meetflow_error::{AppError, AppResult};
use uuid::Uuid;

pub async fn get_transcript(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<TranscriptResponse>> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;
    let base = super::basename(&job.file_name).to_string();

    let view = meetflow_cache::get_transcript(&state.artifacts, &base).await?;
    let full_transcript = serde_json::to_string(&view.segments)
        .map_err(|e| AppError::Internal(format!("failed to serialize transcript: {e}")))?;

    Ok(Json(TranscriptResponse {
        uuid: job_id.to_string(),
        status: "exists",
        full_transcript,
        file_name: job.file_name,
        status_code: 200,
        is_edited: view.is_edited,
    }))
}

pub async fn update_transcript(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<TranscriptUpdateRequest>,
) -> AppResult<Json<MessageResponse>> {
    let base = require_job_basename(&state, job_id).await?;
    meetflow_cache::put_edited_transcript(&state.artifacts, &base, job_id, &request.transcript).await?;

    Ok(Json(MessageResponse {
        uuid: job_id.to_string(),
        status: "success",
        message: "Transcript updated successfully".to_string(),
    }))
}
