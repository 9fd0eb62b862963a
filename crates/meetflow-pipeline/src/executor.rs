//! Stage Executor (C4): performs one pipeline stage and reports progress at
//! fixed checkpoints. Always runs detached, owned by the Orchestrator's
//! background task set.

use meetflow_align::align;
use meetflow_artifacts::{ArtifactClass, ArtifactStore};
use meetflow_engines::{AsrEngine, DiarizationEngine};
use meetflow_error::{AppError, AppResult};
use meetflow_store::{JobRepository, WorkflowState};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcribe,
    Diarize,
    Align,
}

impl Stage {
    #[must_use]
    pub fn precondition(self) -> WorkflowState {
        match self {
            Self::Transcribe => WorkflowState::Uploaded,
            Self::Diarize => WorkflowState::Transcribed,
            Self::Align => WorkflowState::Diarized,
        }
    }

    #[must_use]
    pub fn in_progress_state(self) -> WorkflowState {
        match self {
            Self::Transcribe => WorkflowState::Transcribing,
            Self::Diarize => WorkflowState::Diarizing,
            Self::Align => WorkflowState::Aligning,
        }
    }

    #[must_use]
    pub fn resting_state(self) -> WorkflowState {
        match self {
            Self::Transcribe => WorkflowState::Transcribed,
            Self::Diarize => WorkflowState::Diarized,
            Self::Align => WorkflowState::Completed,
        }
    }
}

fn basename(file_name: &str) -> &str {
    std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Run `stage` for `job_id` to completion, capturing any failure on the Job
/// rather than letting it propagate past this call.
pub async fn run_stage(
    repo: Arc<dyn JobRepository>,
    artifacts: Arc<ArtifactStore>,
    asr: Arc<dyn AsrEngine>,
    diarization: Arc<dyn DiarizationEngine>,
    job_id: Uuid,
    stage: Stage,
) {
    if let Err(e) = run_stage_fallible(repo.clone(), artifacts, asr, diarization, job_id, stage).await {
        tracing::error!(%job_id, stage = ?stage, error = %e, "stage failed");
        let _ = repo.set_error(job_id, &e.to_string()).await;
    }
}

async fn run_stage_fallible(
    repo: Arc<dyn JobRepository>,
    artifacts: Arc<ArtifactStore>,
    asr: Arc<dyn AsrEngine>,
    diarization: Arc<dyn DiarizationEngine>,
    job_id: Uuid,
    stage: Stage,
) -> AppResult<()> {
    repo.update_stage_progress(job_id, stage.in_progress_state(), 0).await?;

    let job = repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    match stage {
        Stage::Transcribe => {
            repo.update_stage_progress(job_id, stage.in_progress_state(), 10).await?;
            let wav_path = artifacts.safe_path(ArtifactClass::Upload, &job.file_name)?;
            let data = asr.transcribe(&wav_path, None).await?;
            repo.update_stage_progress(job_id, stage.in_progress_state(), 90).await?;
            repo.set_transcription_data(job_id, data).await?;
            repo.update_stage_progress(job_id, stage.resting_state(), 100).await?;
        }
        Stage::Diarize => {
            repo.update_stage_progress(job_id, stage.in_progress_state(), 10).await?;
            let wav_path = artifacts.safe_path(ArtifactClass::Upload, &job.file_name)?;
            let data = diarization.diarize(&wav_path).await?;
            repo.update_stage_progress(job_id, stage.in_progress_state(), 90).await?;
            repo.set_diarization_data(job_id, data).await?;
            repo.update_stage_progress(job_id, stage.resting_state(), 100).await?;
        }
        Stage::Align => {
            repo.update_stage_progress(job_id, stage.in_progress_state(), 10).await?;
            let transcription = job
                .transcription_data
                .ok_or_else(|| AppError::Conflict("job has no transcription data".to_string()))?;
            let diarization_data = job
                .diarization_data
                .ok_or_else(|| AppError::Conflict("job has no diarization data".to_string()))?;
            repo.update_stage_progress(job_id, stage.in_progress_state(), 30).await?;

            let attributed = align(&transcription.segments, &diarization_data.turns);
            repo.update_stage_progress(job_id, stage.in_progress_state(), 50).await?;

            let bytes = serde_json::to_vec(&attributed)
                .map_err(|e| AppError::Internal(format!("failed to serialize transcript: {e}")))?;
            let file_name = format!("{}.json", basename(&job.file_name));
            artifacts.write(ArtifactClass::Transcript, &file_name, &bytes).await?;
            repo.update_stage_progress(job_id, stage.in_progress_state(), 80).await?;

            repo.complete(job_id).await?;
        }
    }

    Ok(())
}
