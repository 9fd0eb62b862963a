use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job lifecycle states, forming the DAG described in spec.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Uploaded,
    Transcribing,
    Transcribed,
    Diarizing,
    Diarized,
    Aligning,
    Completed,
    Error,
}

impl WorkflowState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Transcribing => "transcribing",
            Self::Transcribed => "transcribed",
            Self::Diarizing => "diarizing",
            Self::Diarized => "diarized",
            Self::Aligning => "aligning",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowState {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "uploaded" => Self::Uploaded,
            "transcribing" => Self::Transcribing,
            "transcribed" => Self::Transcribed,
            "diarizing" => Self::Diarizing,
            "diarized" => Self::Diarized,
            "aligning" => Self::Aligning,
            "completed" => Self::Completed,
            "error" => Self::Error,
            other => return Err(format!("unknown workflow state: {other}")),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionData {
    pub text: String,
    pub language: String,
    pub segments: Vec<AsrSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerTurn {
    pub start: f64,
    pub end: f64,
    pub speaker_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizationData {
    pub turns: Vec<SpeakerTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub file_name: String,
    pub file_hash: String,
    pub workflow_state: WorkflowState,
    pub status_code: u16,
    pub current_step_progress: u8,
    pub error_message: Option<String>,
    pub transcription_data: Option<TranscriptionData>,
    pub diarization_data: Option<DiarizationData>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub file_name: String,
    pub file_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportType {
    Pdf,
    Markdown,
    TranscriptPdf,
    TranscriptMarkdown,
}

impl ExportType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::TranscriptPdf => "transcript_pdf",
            Self::TranscriptMarkdown => "transcript_markdown",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf | Self::TranscriptPdf => "pdf",
            Self::Markdown | Self::TranscriptMarkdown => "md",
        }
    }

    #[must_use]
    pub fn includes_summary(self) -> bool {
        matches!(self, Self::Pdf | Self::Markdown)
    }
}

impl std::str::FromStr for ExportType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pdf" => Self::Pdf,
            "markdown" => Self::Markdown,
            "transcript_pdf" => Self::TranscriptPdf,
            "transcript_markdown" => Self::TranscriptMarkdown,
            other => return Err(format!("unknown export type: {other}")),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub id: Uuid,
    pub job_id: Uuid,
    pub export_type: ExportType,
    pub status_code: u16,
    pub progress_percentage: u8,
    pub file_path: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
