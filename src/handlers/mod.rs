pub mod audio;
pub mod exports;
pub mod jobs;
pub mod speakers;
pub mod summaries;
pub mod transcripts;

use crate::dto::JobStatusResponse;
use meetflow_store::{Job, WorkflowState};

fn basename(file_name: &str) -> &str {
    std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Actions the client may request next, keyed off `workflow_state`, per the
/// table in `original_source/backend/api/v1/jobs.py::get_job_status`.
fn available_actions(state: WorkflowState) -> Vec<&'static str> {
    match state {
        WorkflowState::Uploaded => vec!["transcribe", "delete"],
        WorkflowState::Transcribed => vec!["diarize", "delete"],
        WorkflowState::Diarized => vec!["align", "delete"],
        WorkflowState::Completed => vec!["export", "delete"],
        _ => vec![],
    }
}

fn job_status_response(job: &Job) -> JobStatusResponse {
    JobStatusResponse {
        uuid: job.id.to_string(),
        file_name: job.file_name.clone(),
        status_code: job.status_code,
        status: match job.workflow_state {
            WorkflowState::Completed => "completed",
            WorkflowState::Error => "error",
            _ => "processing",
        }
        .to_string(),
        workflow_state: job.workflow_state.to_string(),
        current_step_progress: job.current_step_progress,
        available_actions: available_actions(job.workflow_state),
        error_message: job.error_message.clone(),
    }
}
