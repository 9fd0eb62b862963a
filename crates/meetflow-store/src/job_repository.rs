use async_trait::async_trait;
use chrono::Utc;
use meetflow_error::{AppError, AppResult};
use sqlx::SqlitePool;
use sqlx::Row;
use uuid::Uuid;

use crate::models::{DiarizationData, Job, NewJob, TranscriptionData, WorkflowState};

/// Persistence surface for Job records (spec.md §4.1).
///
/// Every method is a single-row atomic operation; there is no multi-row
/// transaction requirement. Object-safe so callers can hold
/// `Arc<dyn JobRepository>` in application state without a generic
/// parameter, mirroring the `LlmBackend` trait in `xchecker-llm`.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, new_job: NewJob) -> AppResult<Job>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>>;
    async fn find_by_hash(&self, file_hash: &str) -> AppResult<Option<Job>>;
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Job>, i64)>;
    async fn update_stage_progress(
        &self,
        id: Uuid,
        state: WorkflowState,
        progress: u8,
    ) -> AppResult<()>;
    async fn set_status_code(&self, id: Uuid, status_code: u16) -> AppResult<()>;
    async fn set_error(&self, id: Uuid, message: &str) -> AppResult<()>;
    async fn rename(&self, id: Uuid, new_file_name: &str) -> AppResult<()>;
    async fn set_transcription_data(&self, id: Uuid, data: TranscriptionData) -> AppResult<()>;
    async fn set_diarization_data(&self, id: Uuid, data: DiarizationData) -> AppResult<()>;
    async fn complete(&self, id: Uuid) -> AppResult<()>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn delete_older_than(&self, hours: f64) -> AppResult<Vec<Job>>;
}

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> AppResult<Job> {
    let id: String = row.try_get("id")?;
    let workflow_state: String = row.try_get("workflow_state")?;
    let status_code: i64 = row.try_get("status_code")?;
    let current_step_progress: i64 = row.try_get("current_step_progress")?;
    let transcription_data: Option<String> = row.try_get("transcription_data")?;
    let diarization_data: Option<String> = row.try_get("diarization_data")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Job {
        id: Uuid::parse_str(&id).map_err(|e| AppError::Internal(e.to_string()))?,
        file_name: row.try_get("file_name")?,
        file_hash: row.try_get("file_hash")?,
        workflow_state: workflow_state
            .parse()
            .map_err(AppError::Internal)?,
        status_code: status_code as u16,
        current_step_progress: current_step_progress as u8,
        error_message: row.try_get("error_message")?,
        transcription_data: transcription_data
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?,
        diarization_data: diarization_data
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?,
        created_at: created_at
            .parse()
            .map_err(|e: chrono::ParseError| AppError::Internal(e.to_string()))?,
    })
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
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
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO jobs (id, file_name, file_hash, workflow_state, status_code, \
             current_step_progress, error_message, transcription_data, diarization_data, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, NULL, NULL, NULL, ?)",
        )
        .bind(job.id.to_string())
        .bind(&job.file_name)
        .bind(&job.file_hash)
        .bind(job.workflow_state.as_str())
        .bind(i64::from(job.status_code))
        .bind(i64::from(job.current_step_progress))
        .bind(job.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(job)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_job).transpose()
    }

    async fn find_by_hash(&self, file_hash: &str) -> AppResult<Option<Job>> {
        let row = sqlx::query(
            "SELECT * FROM jobs WHERE file_hash = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(file_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_job).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Job>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query("SELECT * FROM jobs ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let jobs = rows.iter().map(row_to_job).collect::<AppResult<Vec<_>>>()?;
        Ok((jobs, total))
    }

    async fn update_stage_progress(
        &self,
        id: Uuid,
        state: WorkflowState,
        progress: u8,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET workflow_state = ?, current_step_progress = ? WHERE id = ?",
        )
        .bind(state.as_str())
        .bind(i64::from(progress))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status_code(&self, id: Uuid, status_code: u16) -> AppResult<()> {
        sqlx::query("UPDATE jobs SET status_code = ? WHERE id = ?")
            .bind(i64::from(status_code))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET workflow_state = ?, status_code = 500, error_message = ?, \
             current_step_progress = 0 WHERE id = ?",
        )
        .bind(WorkflowState::Error.as_str())
        .bind(message)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn rename(&self, id: Uuid, new_file_name: &str) -> AppResult<()> {
        sqlx::query("UPDATE jobs SET file_name = ? WHERE id = ?")
            .bind(new_file_name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_transcription_data(&self, id: Uuid, data: TranscriptionData) -> AppResult<()> {
        let json = serde_json::to_string(&data).map_err(|e| AppError::Internal(e.to_string()))?;
        sqlx::query("UPDATE jobs SET transcription_data = ? WHERE id = ?")
            .bind(json)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_diarization_data(&self, id: Uuid, data: DiarizationData) -> AppResult<()> {
        let json = serde_json::to_string(&data).map_err(|e| AppError::Internal(e.to_string()))?;
        sqlx::query("UPDATE jobs SET diarization_data = ? WHERE id = ?")
            .bind(json)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn complete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET workflow_state = ?, status_code = 200, current_step_progress = 100 \
             WHERE id = ?",
        )
        .bind(WorkflowState::Completed.as_str())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_older_than(&self, hours: f64) -> AppResult<Vec<Job>> {
        let cutoff = Utc::now() - chrono::Duration::milliseconds((hours * 3_600_000.0) as i64);
        let rows = sqlx::query("SELECT * FROM jobs WHERE created_at < ?")
            .bind(cutoff.to_rfc3339())
            .fetch_all(&self.pool)
            .await?;
        let jobs = rows.iter().map(row_to_job).collect::<AppResult<Vec<_>>>()?;

        sqlx::query("DELETE FROM jobs WHERE created_at < ?")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(jobs)
    }
}
