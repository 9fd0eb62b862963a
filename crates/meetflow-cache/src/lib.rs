//! Artifact Cache (C7): transcript reads prefer the edited copy over the
//! canonical one, and any mutation that could change summarization input
//! invalidates the cached summary (spec.md §4.7).

use meetflow_align::AlignedSegment;
use meetflow_artifacts::{ArtifactClass, ArtifactStore};
use meetflow_error::{AppError, AppResult};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug)]
pub struct TranscriptView {
    pub segments: Vec<AlignedSegment>,
    pub is_edited: bool,
}

fn transcript_file_name(basename: &str) -> String {
    format!("{basename}.json")
}

/// Resolve `<basename>`'s transcript, preferring the edited copy.
/// 404 if neither the edited nor the canonical transcript exists.
pub async fn get_transcript(artifacts: &ArtifactStore, basename: &str) -> AppResult<TranscriptView> {
    let name = transcript_file_name(basename);

    match artifacts.read(ArtifactClass::TranscriptEdited, &name).await {
        Ok(bytes) => {
            let segments = parse_segments(&bytes)?;
            return Ok(TranscriptView { segments, is_edited: true });
        }
        Err(AppError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let bytes = artifacts.read(ArtifactClass::Transcript, &name).await?;
    let segments = parse_segments(&bytes)?;
    Ok(TranscriptView { segments, is_edited: false })
}

fn parse_segments(bytes: &[u8]) -> AppResult<Vec<AlignedSegment>> {
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::Internal(format!("corrupt transcript: {e}")))
}

/// Validate `segments` as an ordered array of the segment shape, write it
/// to the edited path, and invalidate the cached summary for `job_id`.
pub async fn put_edited_transcript(
    artifacts: &ArtifactStore,
    basename: &str,
    job_id: Uuid,
    segments: &[AlignedSegment],
) -> AppResult<()> {
    if segments.is_empty() {
        return Err(AppError::Validation("transcript must contain at least one segment".to_string()));
    }
    let bytes = serde_json::to_vec(segments)
        .map_err(|e| AppError::Internal(format!("failed to serialize transcript: {e}")))?;
    artifacts
        .write(ArtifactClass::TranscriptEdited, &transcript_file_name(basename), &bytes)
        .await?;

    meetflow_llm::delete_summary(artifacts, job_id).await;
    Ok(())
}

/// Apply a speaker-label substitution to the current transcript (preferring
/// the edited copy), write the result to the edited path, and invalidate
/// the cached summary.
pub async fn rename_speakers(
    artifacts: &ArtifactStore,
    basename: &str,
    job_id: Uuid,
    mapping: &HashMap<String, String>,
) -> AppResult<Vec<AlignedSegment>> {
    let current = get_transcript(artifacts, basename).await?;
    let renamed: Vec<AlignedSegment> = current
        .segments
        .into_iter()
        .map(|mut segment| {
            if let Some(new_label) = mapping.get(&segment.speaker) {
                segment.speaker = new_label.clone();
            }
            segment
        })
        .collect();

    let bytes = serde_json::to_vec(&renamed)
        .map_err(|e| AppError::Internal(format!("failed to serialize transcript: {e}")))?;
    artifacts
        .write(ArtifactClass::TranscriptEdited, &transcript_file_name(basename), &bytes)
        .await?;

    meetflow_llm::delete_summary(artifacts, job_id).await;
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetflow_config::Config;
    use std::path::Path;

    fn test_config(root: &Path) -> Config {
        Config {
            db_url: "sqlite::memory:".into(),
            llm_api_url: "http://localhost".into(),
            llm_model_name: "test".into(),
            llm_api_key: None,
            llm_timeout_secs: 60,
            asr_model_name: "whisper".into(),
            diarization_model_name: "pyannote".into(),
            ml_credentials_token: None,
            upload_dir: root.join("uploads"),
            transcript_dir: root.join("transcripts"),
            transcript_edited_dir: root.join("transcripts_edited"),
            summary_dir: root.join("summaries"),
            export_dir: root.join("exports"),
            logs_dir: root.join("logs"),
            max_file_size: 1024,
            allowed_audio_types: vec!["audio/wav".into()],
            compute_device: None,
            cleanup_interval_hours: 1.0,
            job_retention_hours: 12.0,
            export_retention_hours: 24.0,
            timezone_offset: "+00:00".into(),
            db_pool_min: 1,
            db_pool_max: 1,
            log_level: "info".into(),
            log_file: root.join("logs/meetflow.log"),
            log_max_bytes: 1024,
            log_backup_count: 1,
            log_to_console: false,
        }
    }

    fn sample_segment(speaker: &str) -> AlignedSegment {
        AlignedSegment {
            speaker: speaker.to_string(),
            text: "hello".to_string(),
            start: "0.00".to_string(),
            end: "1.00".to_string(),
        }
    }

    #[tokio::test]
    async fn read_falls_back_to_canonical_when_no_edit_exists() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(&test_config(dir.path()));
        artifacts.ensure_dirs().await.unwrap();
        let segments = vec![sample_segment("SPEAKER_00")];
        artifacts
            .write(ArtifactClass::Transcript, "meeting.json", &serde_json::to_vec(&segments).unwrap())
            .await
            .unwrap();

        let view = get_transcript(&artifacts, "meeting").await.unwrap();
        assert!(!view.is_edited);
        assert_eq!(view.segments.len(), 1);
    }

    #[tokio::test]
    async fn read_prefers_edited_over_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(&test_config(dir.path()));
        artifacts.ensure_dirs().await.unwrap();
        let canonical = vec![sample_segment("SPEAKER_00")];
        let edited = vec![sample_segment("Alice")];
        artifacts
            .write(ArtifactClass::Transcript, "meeting.json", &serde_json::to_vec(&canonical).unwrap())
            .await
            .unwrap();
        artifacts
            .write(ArtifactClass::TranscriptEdited, "meeting.json", &serde_json::to_vec(&edited).unwrap())
            .await
            .unwrap();

        let view = get_transcript(&artifacts, "meeting").await.unwrap();
        assert!(view.is_edited);
        assert_eq!(view.segments[0].speaker, "Alice");
    }

    #[tokio::test]
    async fn missing_transcript_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(&test_config(dir.path()));
        artifacts.ensure_dirs().await.unwrap();
        let err = get_transcript(&artifacts, "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn put_edited_transcript_invalidates_summary() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(&test_config(dir.path()));
        artifacts.ensure_dirs().await.unwrap();
        let job_id = Uuid::new_v4();
        meetflow_llm::save_summary(&artifacts, job_id, "cached").await.unwrap();

        put_edited_transcript(&artifacts, "meeting", job_id, &[sample_segment("SPEAKER_00")])
            .await
            .unwrap();

        assert!(meetflow_llm::get_cached_summary(&artifacts, job_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rename_speakers_substitutes_labels() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(&test_config(dir.path()));
        artifacts.ensure_dirs().await.unwrap();
        let segments = vec![sample_segment("SPEAKER_00")];
        artifacts
            .write(ArtifactClass::Transcript, "meeting.json", &serde_json::to_vec(&segments).unwrap())
            .await
            .unwrap();

        let mut mapping = HashMap::new();
        mapping.insert("SPEAKER_00".to_string(), "Bob".to_string());
        let renamed = rename_speakers(&artifacts, "meeting", Uuid::new_v4(), &mapping)
            .await
            .unwrap();
        assert_eq!(renamed[0].speaker, "Bob");
    }
}
