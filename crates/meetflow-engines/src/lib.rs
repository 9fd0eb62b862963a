//! Collaborator interfaces for the ML engines named "out of scope, specified
//! only at the interface" — the ASR engine, the speaker-diarization engine,
//! and the audio transcoder. Real implementations live outside this
//! workspace; this crate defines the seam plus fakes usable in tests and as
//! default wiring when no real engine is configured.

use async_trait::async_trait;
use meetflow_error::AppResult;
use meetflow_store::{AsrSegment, DiarizationData, SpeakerTurn, TranscriptionData};
use std::path::Path;

/// Produces timestamped text segments from a 16 kHz mono WAV file.
#[async_trait]
pub trait AsrEngine: Send + Sync {
    async fn transcribe(&self, wav_path: &Path, language_hint: Option<&str>) -> AppResult<TranscriptionData>;
}

/// Produces timestamped speaker turns from a 16 kHz mono WAV file.
#[async_trait]
pub trait DiarizationEngine: Send + Sync {
    async fn diarize(&self, wav_path: &Path) -> AppResult<DiarizationData>;
}

/// Normalizes an arbitrary audio format into 16 kHz mono WAV.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn to_wav(&self, input: &Path, output: &Path) -> AppResult<()>;
}

/// Fixed-output ASR stand-in for tests and environments with no real engine
/// configured. Returns a single segment spanning the whole (assumed) clip.
pub struct FakeAsrEngine {
    pub text: String,
    pub language: String,
}

impl Default for FakeAsrEngine {
    fn default() -> Self {
        Self {
            text: "this is a placeholder transcript".to_string(),
            language: "en".to_string(),
        }
    }
}

#[async_trait]
impl AsrEngine for FakeAsrEngine {
    async fn transcribe(&self, _wav_path: &Path, language_hint: Option<&str>) -> AppResult<TranscriptionData> {
        Ok(TranscriptionData {
            text: self.text.clone(),
            language: language_hint.map(str::to_string).unwrap_or_else(|| self.language.clone()),
            segments: vec![AsrSegment {
                start: 0.0,
                end: 1.0,
                text: self.text.clone(),
            }],
        })
    }
}

/// Fixed single-speaker diarization stand-in.
#[derive(Default)]
pub struct FakeDiarizationEngine;

#[async_trait]
impl DiarizationEngine for FakeDiarizationEngine {
    async fn diarize(&self, _wav_path: &Path) -> AppResult<DiarizationData> {
        Ok(DiarizationData {
            turns: vec![SpeakerTurn {
                start: 0.0,
                end: 1.0,
                speaker_label: "SPEAKER_00".to_string(),
            }],
        })
    }
}

/// Copies the input file to the output path unchanged. Suitable only for
/// tests and local development where every upload is already WAV.
#[derive(Default)]
pub struct PassthroughTranscoder;

#[async_trait]
impl Transcoder for PassthroughTranscoder {
    async fn to_wav(&self, input: &Path, output: &Path) -> AppResult<()> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}
