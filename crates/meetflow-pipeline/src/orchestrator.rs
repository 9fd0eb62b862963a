//! Orchestrator (C6): gatekeeper for stage initiation, rename, and delete.
//! Never blocks on ML work — it validates preconditions and enqueues,
//! backed by the Job Store's single-row atomic update as the
//! serialization point (spec.md §5).

use crate::executor::{self, Stage};
use meetflow_artifacts::{sanitize_filename, ArtifactClass, ArtifactStore};
use meetflow_engines::{AsrEngine, DiarizationEngine};
use meetflow_error::{AppError, AppResult};
use meetflow_store::{JobRepository, WorkflowState};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use uuid::Uuid;

fn basename(file_name: &str) -> &str {
    std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Owns the background task set that Stage Executor runs detached against,
/// so shutdown can observe or abandon in-flight stages.
pub struct Orchestrator {
    repo: Arc<dyn JobRepository>,
    artifacts: Arc<ArtifactStore>,
    asr: Arc<dyn AsrEngine>,
    diarization: Arc<dyn DiarizationEngine>,
    tasks: Mutex<JoinSet<()>>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        repo: Arc<dyn JobRepository>,
        artifacts: Arc<ArtifactStore>,
        asr: Arc<dyn AsrEngine>,
        diarization: Arc<dyn DiarizationEngine>,
    ) -> Self {
        Self {
            repo,
            artifacts,
            asr,
            diarization,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Validate the precondition for `stage` against the Job's current
    /// state, transition it, and enqueue the Stage Executor. Returns the
    /// `(status_code, next_state)` pair the caller surfaces as 202.
    pub async fn start_stage(&self, job_id: Uuid, stage: Stage) -> AppResult<(u16, WorkflowState)> {
        let job = self
            .repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

        if job.workflow_state != stage.precondition() {
            return Err(AppError::Conflict("invalid workflow state transition".to_string()));
        }

        self.repo
            .update_stage_progress(job_id, stage.in_progress_state(), 0)
            .await?;

        let repo = self.repo.clone();
        let artifacts = self.artifacts.clone();
        let asr = self.asr.clone();
        let diarization = self.diarization.clone();

        self.tasks.lock().await.spawn(async move {
            executor::run_stage(repo, artifacts, asr, diarization, job_id, stage).await;
        });

        Ok((202, stage.in_progress_state()))
    }

    /// Sanitize and uniquify `new_name`, rename the audio and transcript
    /// artifacts to track it, and update the Job Store.
    pub async fn rename_job(&self, job_id: Uuid, new_name: &str) -> AppResult<()> {
        let job = self
            .repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

        let sanitized = sanitize_filename(new_name);
        let existing_names: Vec<String> = self
            .artifacts
            .list_with_mtime(ArtifactClass::Upload)
            .await?
            .into_iter()
            .filter_map(|(path, _)| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .filter(|name| name != &job.file_name)
            .collect();
        let unique_name = meetflow_ingest::unique_filename(&sanitized, &existing_names);

        self.artifacts
            .rename(ArtifactClass::Upload, &job.file_name, &unique_name)
            .await?;

        let old_basename = basename(&job.file_name).to_string();
        let new_basename = basename(&unique_name).to_string();
        let old_transcript_name = format!("{old_basename}.json");
        let new_transcript_name = format!("{new_basename}.json");
        self.artifacts
            .rename(ArtifactClass::Transcript, &old_transcript_name, &new_transcript_name)
            .await?;
        self.artifacts
            .rename(ArtifactClass::TranscriptEdited, &old_transcript_name, &new_transcript_name)
            .await?;

        self.repo.rename(job_id, &unique_name).await?;
        Ok(())
    }

    /// Remove the Job (cascading ExportJobs at the store level) and delete
    /// its audio, canonical transcript, edited transcript, and summary.
    /// Missing files are silently tolerated.
    pub async fn delete_job(&self, job_id: Uuid) -> AppResult<()> {
        let job = self
            .repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

        let base = basename(&job.file_name).to_string();
        let transcript_name = format!("{base}.json");

        self.repo.delete(job_id).await?;

        self.artifacts.delete(ArtifactClass::Upload, &job.file_name).await?;
        self.artifacts.delete(ArtifactClass::Transcript, &transcript_name).await?;
        self.artifacts.delete(ArtifactClass::TranscriptEdited, &transcript_name).await?;
        meetflow_llm::delete_summary(&self.artifacts, job_id).await;

        Ok(())
    }
}
