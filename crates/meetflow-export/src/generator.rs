//! Export generator (C9 step 3): the background task that turns a pending
//! `ExportJob` into downloadable bytes.

use crate::filenames::generate_professional_filename;
use crate::{markdown, pdf};
use chrono::Utc;
use meetflow_artifacts::{ArtifactClass, ArtifactStore};
use meetflow_error::{AppError, AppResult};
use meetflow_llm::LlmClient;
use meetflow_store::{ExportRepository, ExportType, JobRepository};
use std::sync::Arc;
use uuid::Uuid;

fn basename(file_name: &str) -> &str {
    std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Create the `ExportJob` row, precondition-checking that the parent Job is
/// `completed`.
pub async fn create_export(
    job_repo: &dyn JobRepository,
    export_repo: &dyn ExportRepository,
    job_id: Uuid,
    export_type: ExportType,
) -> AppResult<meetflow_store::ExportJob> {
    let job = job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    if job.workflow_state != meetflow_store::WorkflowState::Completed {
        return Err(AppError::Conflict("job is not completed".to_string()));
    }

    export_repo.insert(job_id, export_type).await
}

/// Run the export generator for an already-created `ExportJob`, catching
/// all failures onto the `ExportJob` row rather than propagating them.
pub async fn run_export(
    job_repo: Arc<dyn JobRepository>,
    export_repo: Arc<dyn ExportRepository>,
    artifacts: Arc<ArtifactStore>,
    llm: Arc<LlmClient>,
    job_id: Uuid,
    export_id: Uuid,
) {
    if let Err(e) = run_export_fallible(job_repo, export_repo.clone(), artifacts, llm, job_id, export_id).await {
        tracing::error!(%export_id, error = %e, "export generation failed");
        let _ = export_repo.set_error(export_id, &e.to_string()).await;
    }
}

async fn run_export_fallible(
    job_repo: Arc<dyn JobRepository>,
    export_repo: Arc<dyn ExportRepository>,
    artifacts: Arc<ArtifactStore>,
    llm: Arc<LlmClient>,
    job_id: Uuid,
    export_id: Uuid,
) -> AppResult<()> {
    export_repo.update_progress(export_id, 10).await?;
    let job = job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    let export = export_repo
        .find_by_id(job_id, export_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("export job {export_id} not found")))?;

    let base = basename(&job.file_name);
    let transcript = meetflow_cache::get_transcript(&artifacts, base).await?;
    export_repo.update_progress(export_id, 30).await?;

    let summary = if export.export_type.includes_summary() {
        let summary = match meetflow_llm::get_cached_summary(&artifacts, job_id).await? {
            Some(cached) => cached,
            None => {
                let formatted = meetflow_llm::format_transcript_for_llm(
                    &transcript
                        .segments
                        .iter()
                        .map(|s| (s.speaker.clone(), s.text.clone()))
                        .collect::<Vec<_>>(),
                    &Default::default(),
                );
                let generated = meetflow_llm::summarize(&llm, &formatted, None, None).await?;
                meetflow_llm::save_summary(&artifacts, job_id, &generated).await?;
                generated
            }
        };
        Some(summary)
    } else {
        None
    };
    export_repo.update_progress(export_id, 50).await?;

    let generated_on = Utc::now();
    let bytes = match export.export_type {
        ExportType::Markdown => markdown::generate_summary_markdown(
            base,
            summary.as_deref().unwrap_or_default(),
            &transcript.segments,
            generated_on,
        ),
        ExportType::TranscriptMarkdown => {
            markdown::generate_transcript_markdown(base, &transcript.segments, generated_on)
        }
        ExportType::Pdf => pdf::generate_summary_pdf(
            base,
            summary.as_deref().unwrap_or_default(),
            &transcript.segments,
            generated_on,
        )?,
        ExportType::TranscriptPdf => pdf::generate_transcript_pdf(base, &transcript.segments, generated_on)?,
    };
    export_repo.update_progress(export_id, 80).await?;

    let file_name = format!("{export_id}.{}", export.export_type.extension());
    let path = artifacts.write(ArtifactClass::Export, &file_name, &bytes).await?;
    export_repo.complete(export_id, &path.to_string_lossy()).await?;

    Ok(())
}

/// Download filename for a completed export.
#[must_use]
pub fn download_filename(meeting_title: &str, export_type: ExportType) -> String {
    generate_professional_filename(meeting_title, export_type, Utc::now())
}
