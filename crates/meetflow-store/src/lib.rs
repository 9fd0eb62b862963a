//! Durable persistence for Job and ExportJob records (spec.md §4.1).
//!
//! Backed by SQLite through `sqlx`, grounded on the `sqlx` + SQLite pairing
//! used by meeting/transcript tools in the retrieval pack
//! (`other_examples/manifests/tjameswilliams-meeting-assistant`,
//! `other_examples/manifests/mdornich-hyprnote`).

pub mod export_repository;
pub mod job_repository;
pub mod models;

pub use export_repository::{ExportRepository, SqliteExportRepository};
pub use job_repository::{JobRepository, SqliteJobRepository};
pub use models::*;

use meetflow_error::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Open the Job Store's SQLite pool and run embedded migrations.
///
/// `db_pool_max` bounds `SqlitePoolOptions::max_connections` directly.
/// `sqlx::SqlitePool` has no separate "minimum" knob the way a traditional
/// connection pool does, so `db_pool_min` is honored by pre-warming that
/// many connections immediately rather than lazily on first use.
pub async fn connect(db_url: &str, pool_min: u32, pool_max: u32) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(pool_max.max(1))
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let warm: Vec<_> = futures_util::future::join_all(
        (0..pool_min.min(pool_max)).map(|_| pool.acquire()),
    )
    .await;
    for conn in warm {
        conn.map_err(|e| AppError::Internal(e.to_string()))?;
    }

    Ok(pool)
}
