use super::jobs::require_job_basename;
use crate::dto::{MessageResponse, SummarizeRequest, SummaryResponse, UpdateSummaryRequest};
use crate::state::AppState;
use axum::extract::{Json as JsonExtractor, Path, State};
use axum::Json;
use meetflow_error::{AppError, AppResult};
use uuid::Uuid;

async fn formatted_transcript(state: &AppState, base: &str) -> AppResult<String> {
    let view = meetflow_cache::get_transcript(&state.artifacts, base).await?;
    let pairs: Vec<(String, String)> =
        view.segments.into_iter().map(|s| (s.speaker, s.text)).collect();
    Ok(meetflow_llm::format_transcript_for_llm(&pairs, &Default::default()))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<SummaryResponse>> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    if let Some(cached) = meetflow_llm::get_cached_summary(&state.artifacts, job_id).await? {
        return Ok(Json(SummaryResponse {
            uuid: job_id.to_string(),
            file_name: job.file_name,
            status: "cached",
            status_code: 200,
            summary: cached,
        }));
    }

    let base = super::basename(&job.file_name).to_string();
    let transcript = formatted_transcript(&state, &base).await?;
    let summary = meetflow_llm::summarize(&state.llm, &transcript, None, None).await?;
    meetflow_llm::save_summary(&state.artifacts, job_id, &summary).await?;

    Ok(Json(SummaryResponse {
        uuid: job_id.to_string(),
        file_name: job.file_name,
        status: "generated",
        status_code: 200,
        summary,
    }))
}

pub async fn create_summary(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    body: Option<JsonExtractor<SummarizeRequest>>,
) -> AppResult<Json<SummaryResponse>> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;
    let request = body.map(|JsonExtractor(r)| r).unwrap_or_default();

    let base = super::basename(&job.file_name).to_string();
    let transcript = formatted_transcript(&state, &base).await?;
    let summary = meetflow_llm::summarize(
        &state.llm,
        &transcript,
        request.custom_prompt.as_deref(),
        request.system_prompt.as_deref(),
    )
    .await?;
    meetflow_llm::save_summary(&state.artifacts, job_id, &summary).await?;

    Ok(Json(SummaryResponse {
        uuid: job_id.to_string(),
        file_name: job.file_name,
        status: "generated",
        status_code: 200,
        summary,
    }))
}

pub async fn update_summary(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<UpdateSummaryRequest>,
) -> AppResult<Json<SummaryResponse>> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    meetflow_llm::save_summary(&state.artifacts, job_id, &request.summary).await?;

    Ok(Json(SummaryResponse {
        uuid: job_id.to_string(),
        file_name: job.file_name,
        status: "updated",
        status_code: 200,
        summary: request.summary,
    }))
}

pub async fn delete_summary(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    require_job_basename(&state, job_id).await?;

    if meetflow_llm::get_cached_summary(&state.artifacts, job_id).await?.is_none() {
        return Err(AppError::NotFound("no cached summary found".to_string()));
    }
    meetflow_llm::delete_summary(&state.artifacts, job_id).await;

    Ok(Json(MessageResponse {
        uuid: job_id.to_string(),
        status: "success",
        message: "Summary deleted successfully".to_string(),
    }))
}
