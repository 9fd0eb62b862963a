//! Filesystem-backed summary cache: one `<job_id>.txt` per job under
//! `summaries/`, mirroring `SummaryService.get_cached_summary` /
//! `save_summary` / `delete_summary`.

use meetflow_artifacts::{ArtifactClass, ArtifactStore};
use meetflow_error::{AppError, AppResult};
use uuid::Uuid;

fn file_name(job_id: Uuid) -> String {
    format!("{job_id}.txt")
}

pub async fn get_cached_summary(artifacts: &ArtifactStore, job_id: Uuid) -> AppResult<Option<String>> {
    match artifacts.read(ArtifactClass::Summary, &file_name(job_id)).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn save_summary(artifacts: &ArtifactStore, job_id: Uuid, summary: &str) -> AppResult<()> {
    artifacts
        .write(ArtifactClass::Summary, &file_name(job_id), summary.as_bytes())
        .await
        .map(|_| ())
}

/// Best-effort invalidation: failures are logged, not surfaced, since an
/// edit should never fail because the old summary couldn't be removed.
pub async fn delete_summary(artifacts: &ArtifactStore, job_id: Uuid) {
    if let Err(e) = artifacts.delete(ArtifactClass::Summary, &file_name(job_id)).await {
        tracing::warn!(error = %e, %job_id, "failed to invalidate cached summary");
    }
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

    #[tokio::test]
    async fn round_trips_cached_summary() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(&test_config(dir.path()));
        artifacts.ensure_dirs().await.unwrap();
        let job_id = Uuid::new_v4();

        assert!(get_cached_summary(&artifacts, job_id).await.unwrap().is_none());
        save_summary(&artifacts, job_id, "# Summary").await.unwrap();
        assert_eq!(
            get_cached_summary(&artifacts, job_id).await.unwrap().unwrap(),
            "# Summary"
        );
        delete_summary(&artifacts, job_id).await;
        assert!(get_cached_summary(&artifacts, job_id).await.unwrap().is_none());
    }
}
