use async_trait::async_trait;
use chrono::Utc;
use meetflow_error::{AppError, AppResult};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{ExportJob, ExportType};

#[async_trait]
pub trait ExportRepository: Send + Sync {
    async fn insert(&self, job_id: Uuid, export_type: ExportType) -> AppResult<ExportJob>;
    async fn find_by_id(&self, job_id: Uuid, id: Uuid) -> AppResult<Option<ExportJob>>;
    async fn update_progress(&self, id: Uuid, progress: u8) -> AppResult<()>;
    async fn complete(&self, id: Uuid, file_path: &str) -> AppResult<()>;
    async fn set_error(&self, id: Uuid, message: &str) -> AppResult<()>;
    async fn delete_older_than(&self, hours: f64) -> AppResult<Vec<ExportJob>>;
}

pub struct SqliteExportRepository {
    pool: SqlitePool,
}

impl SqliteExportRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_export(row: &sqlx::sqlite::SqliteRow) -> AppResult<ExportJob> {
    let id: String = row.try_get("id")?;
    let job_id: String = row.try_get("job_id")?;
    let export_type: String = row.try_get("export_type")?;
    let status_code: i64 = row.try_get("status_code")?;
    let progress_percentage: i64 = row.try_get("progress_percentage")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(ExportJob {
        id: Uuid::parse_str(&id).map_err(|e| AppError::Internal(e.to_string()))?,
        job_id: Uuid::parse_str(&job_id).map_err(|e| AppError::Internal(e.to_string()))?,
        export_type: export_type.parse().map_err(AppError::Internal)?,
        status_code: status_code as u16,
        progress_percentage: progress_percentage as u8,
        file_path: row.try_get("file_path")?,
        error_message: row.try_get("error_message")?,
        created_at: created_at
            .parse()
            .map_err(|e: chrono::ParseError| AppError::Internal(e.to_string()))?,
    })
}

#[async_trait]
impl ExportRepository for SqliteExportRepository {
    async fn insert(&self, job_id: Uuid, export_type: ExportType) -> AppResult<ExportJob> {
        let export = ExportJob {
            id: Uuid::new_v4(),
            job_id,
            export_type,
            status_code: 202,
            progress_percentage: 0,
            file_path: None,
            error_message: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO export_jobs (id, job_id, export_type, status_code, \
             progress_percentage, file_path, error_message, created_at) \
             VALUES (?, ?, ?, ?, 0, NULL, NULL, ?)",
        )
        .bind(export.id.to_string())
        .bind(export.job_id.to_string())
        .bind(export.export_type.as_str())
        .bind(i64::from(export.status_code))
        .bind(export.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(export)
    }

    async fn find_by_id(&self, job_id: Uuid, id: Uuid) -> AppResult<Option<ExportJob>> {
        let row = sqlx::query("SELECT * FROM export_jobs WHERE id = ? AND job_id = ?")
            .bind(id.to_string())
            .bind(job_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_export).transpose()
    }

    async fn update_progress(&self, id: Uuid, progress: u8) -> AppResult<()> {
        sqlx::query("UPDATE export_jobs SET progress_percentage = ? WHERE id = ?")
            .bind(i64::from(progress))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn complete(&self, id: Uuid, file_path: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE export_jobs SET status_code = 200, progress_percentage = 100, \
             file_path = ? WHERE id = ?",
        )
        .bind(file_path)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE export_jobs SET status_code = 500, error_message = ? WHERE id = ?",
        )
        .bind(message)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_older_than(&self, hours: f64) -> AppResult<Vec<ExportJob>> {
        let cutoff = Utc::now() - chrono::Duration::milliseconds((hours * 3_600_000.0) as i64);
        let rows = sqlx::query("SELECT * FROM export_jobs WHERE created_at < ?")
            .bind(cutoff.to_rfc3339())
            .fetch_all(&self.pool)
            .await?;
        let exports = rows
            .iter()
            .map(row_to_export)
            .collect::<AppResult<Vec<_>>>()?;

        sqlx::query("DELETE FROM export_jobs WHERE created_at < ?")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(exports)
    }
}
