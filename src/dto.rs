//! HTTP request/response bodies for the `/api/v1` surface, field-for-field
//! matches of `original_source/backend/models.py`'s Pydantic models.

use meetflow_align::AlignedSegment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub uuid: String,
    pub file_name: String,
    pub status_code: u16,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub uuid: String,
    pub file_name: String,
    pub status_code: u16,
    pub status: String,
    pub workflow_state: String,
    pub current_step_progress: u8,
    pub available_actions: Vec<&'static str>,
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: HashMap<String, JobStatusResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct RenameJobRequest {
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct RenameResponse {
    pub uuid: String,
    pub status: &'static str,
    pub new_name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub uuid: String,
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct WorkflowActionResponse {
    pub uuid: String,
    pub workflow_state: String,
    pub status_code: u16,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TranscriptionDataResponse {
    pub uuid: String,
    pub transcription_data: meetflow_store::TranscriptionData,
    pub workflow_state: String,
}

#[derive(Debug, Serialize)]
pub struct DiarizationDataResponse {
    pub uuid: String,
    pub diarization_data: meetflow_store::DiarizationData,
    pub workflow_state: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub uuid: String,
    pub status: &'static str,
    pub full_transcript: String,
    pub file_name: String,
    pub status_code: u16,
    pub is_edited: bool,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptUpdateRequest {
    pub transcript: Vec<AlignedSegment>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub uuid: String,
    pub file_name: String,
    pub status: &'static str,
    pub status_code: u16,
    pub summary: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct SummarizeRequest {
    pub custom_prompt: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSummaryRequest {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeakerNameMapping {
    pub mapping: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct SpeakerUpdateResponse {
    pub uuid: String,
    pub status: &'static str,
    pub message: &'static str,
    pub transcript: Vec<AlignedSegment>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SpeakerIdentificationRequest {
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpeakerIdentificationResponse {
    pub uuid: String,
    pub status: &'static str,
    pub suggestions: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExportRequest {
    pub export_type: String,
}

#[derive(Debug, Serialize)]
pub struct ExportJobResponse {
    pub export_uuid: String,
    pub job_uuid: String,
    pub export_type: &'static str,
    pub status_code: u16,
}

#[derive(Debug, Serialize)]
pub struct ExportJobStatusResponse {
    pub uuid: String,
    pub job_uuid: String,
    pub export_type: &'static str,
    pub status_code: u16,
    pub progress_percentage: u8,
    pub error_message: Option<String>,
    pub download_url: Option<String>,
}
