//! Retention Scheduler (C10): a single long-lived periodic task, cancelled
//! cooperatively on shutdown (spec.md §4.10).

use meetflow_artifacts::{ArtifactClass, ArtifactStore};
use meetflow_error::AppResult;
use meetflow_store::{ExportRepository, JobRepository};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;

const ORPHAN_UPLOAD_AGE: Duration = Duration::from_secs(3600);
const ERROR_BACKOFF: Duration = Duration::from_secs(600);

fn basename(file_name: &str) -> &str {
    std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Delete non-WAV uploads whose modification time is older than one hour —
/// failed-transcode leftovers the ingest pipeline could not clean up itself.
async fn sweep_orphaned_uploads(artifacts: &ArtifactStore) -> AppResult<()> {
    let now = SystemTime::now();
    for (path, mtime) in artifacts.list_with_mtime(ArtifactClass::Upload).await? {
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);
        if is_wav {
            continue;
        }
        let age = now.duration_since(mtime).unwrap_or_default();
        if age > ORPHAN_UPLOAD_AGE {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                artifacts.delete(ArtifactClass::Upload, name).await?;
            }
        }
    }
    Ok(())
}

async fn sweep_jobs(
    job_repo: &dyn JobRepository,
    artifacts: &ArtifactStore,
    job_retention_hours: f64,
) -> AppResult<()> {
    for job in job_repo.delete_older_than(job_retention_hours).await? {
        let base = basename(&job.file_name).to_string();
        let transcript_name = format!("{base}.json");
        artifacts.delete(ArtifactClass::Upload, &job.file_name).await?;
        artifacts.delete(ArtifactClass::Transcript, &transcript_name).await?;
        artifacts.delete(ArtifactClass::TranscriptEdited, &transcript_name).await?;
        meetflow_llm::delete_summary(artifacts, job.id).await;
    }
    Ok(())
}

async fn sweep_exports(
    export_repo: &dyn ExportRepository,
    artifacts: &ArtifactStore,
    export_retention_hours: f64,
) -> AppResult<()> {
    for export in export_repo.delete_older_than(export_retention_hours).await? {
        if let Some(file_path) = export.file_path {
            if let Some(name) = std::path::Path::new(&file_path).file_name().and_then(|n| n.to_str()) {
                artifacts.delete(ArtifactClass::Export, name).await?;
            }
        }
    }
    Ok(())
}

/// Run one sweep pass: orphaned uploads, then expired jobs, then expired
/// exports.
pub async fn sweep_once(
    job_repo: &dyn JobRepository,
    export_repo: &dyn ExportRepository,
    artifacts: &ArtifactStore,
    job_retention_hours: f64,
    export_retention_hours: f64,
) -> AppResult<()> {
    sweep_orphaned_uploads(artifacts).await?;
    sweep_jobs(job_repo, artifacts, job_retention_hours).await?;
    sweep_exports(export_repo, artifacts, export_retention_hours).await?;
    Ok(())
}

/// Drive `sweep_once` on a `cleanup_interval_hours` cadence until
/// `cancel` fires. A sweep error logs and backs off 10 minutes rather than
/// stopping the loop.
pub async fn run(
    job_repo: Arc<dyn JobRepository>,
    export_repo: Arc<dyn ExportRepository>,
    artifacts: Arc<ArtifactStore>,
    cleanup_interval_hours: f64,
    job_retention_hours: f64,
    export_retention_hours: f64,
    cancel: CancellationToken,
) {
    let interval_duration = Duration::from_secs_f64((cleanup_interval_hours * 3600.0).max(1.0));
    let mut interval = tokio::time::interval(interval_duration);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("retention scheduler shutting down");
                return;
            }
            _ = interval.tick() => {
                if let Err(e) = sweep_once(
                    job_repo.as_ref(),
                    export_repo.as_ref(),
                    artifacts.as_ref(),
                    job_retention_hours,
                    export_retention_hours,
                ).await {
                    tracing::error!(error = %e, "retention sweep failed, backing off");
                    tokio::select! {
                        () = cancel.cancelled() => return,
                        () = tokio::time::sleep(ERROR_BACKOFF) => {}
                    }
                }
            }
        }
    }
}
