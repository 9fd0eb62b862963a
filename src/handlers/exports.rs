use crate::dto::{CreateExportRequest, ExportJobResponse, ExportJobStatusResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meetflow_error::{AppError, AppResult};
use meetflow_store::ExportType;
use std::str::FromStr;
use uuid::Uuid;

pub async fn create_export(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<CreateExportRequest>,
) -> AppResult<Json<ExportJobResponse>> {
    let export_type = ExportType::from_str(&request.export_type)
        .map_err(|_| AppError::Validation(format!("unknown export type {}", request.export_type)))?;

    let export = meetflow_export::create_export(
        state.job_repo.as_ref(),
        state.export_repo.as_ref(),
        job_id,
        export_type,
    )
    .await?;

    tokio::spawn(meetflow_export::run_export(
        state.job_repo.clone(),
        state.export_repo.clone(),
        state.artifacts.clone(),
        state.llm.clone(),
        job_id,
        export.id,
    ));

    Ok(Json(ExportJobResponse {
        export_uuid: export.id.to_string(),
        job_uuid: job_id.to_string(),
        export_type: export_type.as_str(),
        status_code: export.status_code,
    }))
}

pub async fn get_export_status(
    State(state): State<AppState>,
    Path((job_id, export_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ExportJobStatusResponse>> {
    let export = state
        .export_repo
        .find_by_id(job_id, export_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("export {export_id} not found")))?;

    let download_url = (export.status_code == 200)
        .then(|| format!("/api/v1/jobs/{job_id}/export-jobs/{export_id}/download"));

    Ok(Json(ExportJobStatusResponse {
        uuid: export.id.to_string(),
        job_uuid: job_id.to_string(),
        export_type: export.export_type.as_str(),
        status_code: export.status_code,
        progress_percentage: export.progress_percentage,
        error_message: export.error_message,
        download_url,
    }))
}

pub async fn download_export(
    State(state): State<AppState>,
    Path((job_id, export_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let job = state
        .job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    let export = state
        .export_repo
        .find_by_id(job_id, export_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("export {export_id} not found")))?;

    let file_path = export
        .file_path
        .ok_or_else(|| AppError::NotFound("export is not ready yet".to_string()))?;

    let bytes = tokio::fs::read(&file_path).await?;
    let content_type = match export.export_type {
        ExportType::Pdf | ExportType::TranscriptPdf => "application/pdf",
        ExportType::Markdown | ExportType::TranscriptMarkdown => "text/markdown",
    };
    let file_name = meetflow_export::download_filename(&job.file_name, export.export_type);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        bytes,
    )
        .into_response())
}
