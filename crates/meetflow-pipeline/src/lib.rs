//! Stage Executor (C4) and Orchestrator (C6): the job state machine and its
//! gatekeeper.

pub mod executor;
pub mod orchestrator;

pub use executor::{run_stage, Stage};
pub use orchestrator::Orchestrator;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meetflow_artifacts::{ArtifactClass, ArtifactStore};
    use meetflow_config::Config;
    use meetflow_engines::{FakeAsrEngine, FakeDiarizationEngine};
    use meetflow_error::{AppError, AppResult};
    use meetflow_store::{DiarizationData, Job, JobRepository, NewJob, TranscriptionData, WorkflowState};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct InMemoryJobRepository {
        jobs: Mutex<HashMap<Uuid, Job>>,
    }

    #[async_trait]
    impl JobRepository for InMemoryJobRepository {
        async fn insert(&self, new_job: NewJob) -> AppResult<Job> {
            let job = Job {
                id: Uuid::new_v4(),
                file_name: new_job.file_name,
                file_hash: new_job.file_hash,
                workflow_state: WorkflowState::Uploaded,
                status_code: 202,
                current_step_progress: 0,
                error_message: None,
                transcription_data: None,
                diarization_data: None,
                created_at: chrono::Utc::now(),
            };
            self.jobs.lock().unwrap().insert(job.id, job.clone());
            Ok(job)
        }

        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
            Ok(self.jobs.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_hash(&self, file_hash: &str) -> AppResult<Option<Job>> {
            Ok(self.jobs.lock().unwrap().values().find(|j| j.file_hash == file_hash).cloned())
        }

        async fn list(&self, _limit: i64, _offset: i64) -> AppResult<(Vec<Job>, i64)> {
            let jobs: Vec<Job> = self.jobs.lock().unwrap().values().cloned().collect();
            let total = jobs.len() as i64;
            Ok((jobs, total))
        }

        async fn update_stage_progress(&self, id: Uuid, state: WorkflowState, progress: u8) -> AppResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs.get_mut(&id).ok_or_else(|| AppError::NotFound("job".to_string()))?;
            job.workflow_state = state;
            job.current_step_progress = progress;
            Ok(())
        }

        async fn set_status_code(&self, id: Uuid, status_code: u16) -> AppResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs.get_mut(&id).ok_or_else(|| AppError::NotFound("job".to_string()))?;
            job.status_code = status_code;
            Ok(())
        }

        async fn set_error(&self, id: Uuid, message: &str) -> AppResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs.get_mut(&id).ok_or_else(|| AppError::NotFound("job".to_string()))?;
            job.workflow_state = WorkflowState::Error;
            job.status_code = 500;
            job.error_message = Some(message.to_string());
            Ok(())
        }

        async fn rename(&self, id: Uuid, new_file_name: &str) -> AppResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs.get_mut(&id).ok_or_else(|| AppError::NotFound("job".to_string()))?;
            job.file_name = new_file_name.to_string();
            Ok(())
        }

        async fn set_transcription_data(&self, id: Uuid, data: TranscriptionData) -> AppResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs.get_mut(&id).ok_or_else(|| AppError::NotFound("job".to_string()))?;
            job.transcription_data = Some(data);
            Ok(())
        }

        async fn set_diarization_data(&self, id: Uuid, data: DiarizationData) -> AppResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs.get_mut(&id).ok_or_else(|| AppError::NotFound("job".to_string()))?;
            job.diarization_data = Some(data);
            Ok(())
        }

        async fn complete(&self, id: Uuid) -> AppResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs.get_mut(&id).ok_or_else(|| AppError::NotFound("job".to_string()))?;
            job.workflow_state = WorkflowState::Completed;
            job.status_code = 200;
            job.current_step_progress = 100;
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> AppResult<bool> {
            Ok(self.jobs.lock().unwrap().remove(&id).is_some())
        }

        async fn delete_older_than(&self, _hours: f64) -> AppResult<Vec<Job>> {
            Ok(vec![])
        }
    }

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

    async fn wait_until_resting(repo: &InMemoryJobRepository, job_id: Uuid, target: WorkflowState) -> Job {
        for _ in 0..200 {
            if let Some(job) = repo.find_by_id(job_id).await.unwrap() {
                if job.workflow_state == target || job.workflow_state == WorkflowState::Error {
                    return job;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("stage never reached {target:?}");
    }

    #[tokio::test]
    async fn start_stage_rejects_wrong_precondition() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Arc::new(ArtifactStore::new(&test_config(dir.path())));
        artifacts.ensure_dirs().await.unwrap();
        let repo = Arc::new(InMemoryJobRepository::default());
        let job = repo
            .insert(NewJob { file_name: "a.wav".to_string(), file_hash: "h1".to_string() })
            .await
            .unwrap();

        let orchestrator = Orchestrator::new(
            repo,
            artifacts,
            Arc::new(FakeAsrEngine::default()),
            Arc::new(FakeDiarizationEngine),
        );

        let err = orchestrator.start_stage(job.id, Stage::Diarize).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn full_pipeline_reaches_completed() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Arc::new(ArtifactStore::new(&test_config(dir.path())));
        artifacts.ensure_dirs().await.unwrap();
        artifacts.write(ArtifactClass::Upload, "a.wav", b"fake audio").await.unwrap();

        let repo = Arc::new(InMemoryJobRepository::default());
        let job = repo
            .insert(NewJob { file_name: "a.wav".to_string(), file_hash: "h1".to_string() })
            .await
            .unwrap();

        let orchestrator = Orchestrator::new(
            repo.clone(),
            artifacts.clone(),
            Arc::new(FakeAsrEngine::default()),
            Arc::new(FakeDiarizationEngine),
        );

        orchestrator.start_stage(job.id, Stage::Transcribe).await.unwrap();
        wait_until_resting(&repo, job.id, WorkflowState::Transcribed).await;

        orchestrator.start_stage(job.id, Stage::Diarize).await.unwrap();
        wait_until_resting(&repo, job.id, WorkflowState::Diarized).await;

        orchestrator.start_stage(job.id, Stage::Align).await.unwrap();
        let final_job = wait_until_resting(&repo, job.id, WorkflowState::Completed).await;
        assert_eq!(final_job.workflow_state, WorkflowState::Completed);
        assert_eq!(final_job.status_code, 200);

        let transcript = artifacts.read(ArtifactClass::Transcript, "a.json").await.unwrap();
        assert!(!transcript.is_empty());
    }

    #[tokio::test]
    async fn delete_job_removes_record_and_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Arc::new(ArtifactStore::new(&test_config(dir.path())));
        artifacts.ensure_dirs().await.unwrap();
        let repo = Arc::new(InMemoryJobRepository::default());
        let job = repo
            .insert(NewJob { file_name: "a.wav".to_string(), file_hash: "h1".to_string() })
            .await
            .unwrap();

        let orchestrator = Orchestrator::new(
            repo.clone(),
            artifacts,
            Arc::new(FakeAsrEngine::default()),
            Arc::new(FakeDiarizationEngine),
        );

        orchestrator.delete_job(job.id).await.unwrap();
        assert!(repo.find_by_id(job.id).await.unwrap().is_none());
    }
}
