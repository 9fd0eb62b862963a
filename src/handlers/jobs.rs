use super::{basename, job_status_response};
use crate::dto::{
    DiarizationDataResponse, JobListResponse, JobResponse, JobStatusResponse, MessageResponse,
    RenameJobRequest, RenameResponse, TranscriptionDataResponse, WorkflowActionResponse,
};
use crate::state::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meetflow_error::{AppError, AppResult};
use meetflow_ingest::{IngestOutcome, StreamingHasher};
use meetflow_pipeline::Stage;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    100
}

/// Axum's own multipart body limit (`DefaultBodyLimit`, see `lib.rs`) is
/// set generously above `max_file_size` to tolerate framing overhead, so
/// the byte-exact `413` boundary is enforced solely by `StreamingHasher`.
/// If the multipart layer itself still rejects the body as oversized
/// (a client sending far beyond even that generous limit), surface the
/// same `PayloadTooLarge` the hasher would have produced; any other
/// multipart parse failure is a client validation error.
fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(e.body_text())
    }
}

/// `POST /jobs` (multipart, field `file`): hash the upload while reading it,
/// then hand it to the Ingest component (C3) for dedup + normalization.
pub async fn create_job(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Response> {
    let mut file_name = None;
    let mut hasher = StreamingHasher::new();
    let mut bytes = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        file_name = field.file_name().map(str::to_string);
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            hasher.update(&chunk, state.max_file_size)?;
            bytes.extend_from_slice(&chunk);
        }
    }

    let original_name = file_name.ok_or_else(|| AppError::Validation("missing file field".to_string()))?;
    let file_hash = hasher.finalize();
    let is_wav = original_name.to_ascii_lowercase().ends_with(".wav");

    let outcome = state.ingest.ingest(&bytes, &file_hash, &original_name, is_wav).await?;

    let (status, job) = match outcome {
        IngestOutcome::Existing(job) => (StatusCode::OK, job),
        IngestOutcome::Created(job) => (StatusCode::ACCEPTED, job),
    };

    Ok((
        status,
        Json(JobResponse {
            uuid: job.id.to_string(),
            file_name: job.file_name,
            status_code: job.status_code,
        }),
    )
        .into_response())
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<JobListResponse>> {
    let (jobs, total) = state.job_repo.list(query.limit, query.offset).await?;
    let jobs = jobs
        .iter()
        .map(|job| (job.id.to_string(), job_status_response(job)))
        .collect();

    Ok(Json(JobListResponse { jobs, total, limit: query.limit, offset: query.offset }))
}

pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<JobStatusResponse>> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    Ok(Json(job_status_response(&job)))
}

pub async fn rename_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<RenameJobRequest>,
) -> AppResult<Json<RenameResponse>> {
    state.orchestrator.rename_job(job_id, &request.file_name).await?;
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    Ok(Json(RenameResponse { uuid: job_id.to_string(), status: "success", new_name: job.file_name }))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.orchestrator.delete_job(job_id).await?;
    Ok(Json(MessageResponse {
        uuid: job_id.to_string(),
        status: "success",
        message: "Job deleted successfully".to_string(),
    }))
}

async fn start_stage(
    state: &AppState,
    job_id: Uuid,
    stage: Stage,
    message: &'static str,
) -> AppResult<Json<WorkflowActionResponse>> {
    let (status_code, workflow_state) = state.orchestrator.start_stage(job_id, stage).await?;
    Ok(Json(WorkflowActionResponse {
        uuid: job_id.to_string(),
        workflow_state: workflow_state.to_string(),
        status_code,
        message,
    }))
}

pub async fn start_transcription(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<WorkflowActionResponse>> {
    start_stage(&state, job_id, Stage::Transcribe, "Transcription started").await
}

pub async fn start_diarization(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<WorkflowActionResponse>> {
    start_stage(&state, job_id, Stage::Diarize, "Diarization started").await
}

pub async fn start_alignment(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<WorkflowActionResponse>> {
    start_stage(&state, job_id, Stage::Align, "Alignment started").await
}

pub async fn get_transcription_data(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<TranscriptionDataResponse>> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;
    let transcription_data = job
        .transcription_data
        .ok_or_else(|| AppError::NotFound("transcription data not available yet".to_string()))?;

    Ok(Json(TranscriptionDataResponse {
        uuid: job_id.to_string(),
        transcription_data,
        workflow_state: job.workflow_state.to_string(),
    }))
}

pub async fn get_diarization_data(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<DiarizationDataResponse>> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;
    let diarization_data = job
        .diarization_data
        .ok_or_else(|| AppError::NotFound("diarization data not available yet".to_string()))?;

    Ok(Json(DiarizationDataResponse {
        uuid: job_id.to_string(),
        diarization_data,
        workflow_state: job.workflow_state.to_string(),
    }))
}

/// Shared by the transcript/summary/speaker handlers: resolve a job's
/// basename for artifact lookup, 404ing if the job itself doesn't exist.
pub(crate) async fn require_job_basename(state: &AppState, job_id: Uuid) -> AppResult<String> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;
    Ok(basename(&job.file_name).to_string())
}
