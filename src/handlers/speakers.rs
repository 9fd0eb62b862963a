use super::jobs::require_job_basename;
use crate::dto::{
    SpeakerIdentificationRequest, SpeakerIdentificationResponse, SpeakerNameMapping,
    SpeakerUpdateResponse,
};
use crate::state::AppState;
use axum::extract::{Json as JsonExtractor, Path, State};
use axum::Json;
use meetflow_error::{AppError, AppResult};
use meetflow_llm::SpeakerIdentificationOutcome;
use uuid::Uuid;

pub async fn update_speakers(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<SpeakerNameMapping>,
) -> AppResult<Json<SpeakerUpdateResponse>> {
    let base = require_job_basename(&state, job_id).await?;
    let segments =
        meetflow_cache::rename_speakers(&state.artifacts, &base, job_id, &request.mapping).await?;

    Ok(Json(SpeakerUpdateResponse {
        uuid: job_id.to_string(),
        status: "success",
        message: "Speaker names updated successfully",
        transcript: segments,
    }))
}

pub async fn identify_speakers(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    body: Option<JsonExtractor<SpeakerIdentificationRequest>>,
) -> AppResult<Json<SpeakerIdentificationResponse>> {
    let base = require_job_basename(&state, job_id).await?;
    let request = body.map(|JsonExtractor(r)| r).unwrap_or_default();

    let view = meetflow_cache::get_transcript(&state.artifacts, &base).await?;
    let pairs: Vec<(String, String)> =
        view.segments.into_iter().map(|s| (s.speaker, s.text)).collect();
    let transcript = meetflow_llm::format_transcript_for_llm(&pairs, &Default::default());

    let outcome =
        meetflow_llm::identify_speakers(&state.llm, &transcript, request.context.as_deref()).await?;

    let suggestions = match outcome {
        SpeakerIdentificationOutcome::Suggestions(suggestions) => suggestions,
        SpeakerIdentificationOutcome::ParseError(message) => {
            return Err(AppError::Internal(message));
        }
    };

    Ok(Json(SpeakerIdentificationResponse { uuid: job_id.to_string(), status: "success", suggestions }))
}
