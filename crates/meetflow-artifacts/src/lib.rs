//! Filesystem-backed blob storage (C2) and path-safety checks (C12).
//!
//! Each artifact class lives under its own directory from `Config`
//! (`uploads/`, `transcripts/`, `transcripts_edited/`, `summaries/`,
//! `exports/`). Writes create-or-replace; deletes are best-effort and treat
//! a missing file as success, matching the Python source's
//! `Path.unlink(missing_ok=True)` semantics.

pub mod safety;

use meetflow_config::Config;
use meetflow_error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub use safety::sanitize_filename;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactClass {
    Upload,
    Transcript,
    TranscriptEdited,
    Summary,
    Export,
}

/// Directory-per-class blob store over the paths in `Config`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    upload_dir: PathBuf,
    transcript_dir: PathBuf,
    transcript_edited_dir: PathBuf,
    summary_dir: PathBuf,
    export_dir: PathBuf,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            upload_dir: config.upload_dir.clone(),
            transcript_dir: config.transcript_dir.clone(),
            transcript_edited_dir: config.transcript_edited_dir.clone(),
            summary_dir: config.summary_dir.clone(),
            export_dir: config.export_dir.clone(),
        }
    }

    #[must_use]
    pub fn dir_for(&self, class: ArtifactClass) -> &Path {
        match class {
            ArtifactClass::Upload => &self.upload_dir,
            ArtifactClass::Transcript => &self.transcript_dir,
            ArtifactClass::TranscriptEdited => &self.transcript_edited_dir,
            ArtifactClass::Summary => &self.summary_dir,
            ArtifactClass::Export => &self.export_dir,
        }
    }

    /// Ensure every class directory exists. Call once at startup.
    pub async fn ensure_dirs(&self) -> AppResult<()> {
        for dir in [
            &self.upload_dir,
            &self.transcript_dir,
            &self.transcript_edited_dir,
            &self.summary_dir,
            &self.export_dir,
        ] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Write `bytes` to `<class_dir>/<file_name>`, creating or replacing it.
    pub async fn write(
        &self,
        class: ArtifactClass,
        file_name: &str,
        bytes: &[u8],
    ) -> AppResult<PathBuf> {
        let dir = self.dir_for(class);
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Read `<class_dir>/<file_name>`, resolving path safety first. Returns
    /// `NotFound` both when the file is absent and when the path escapes
    /// `class`'s directory, so callers cannot distinguish the two cases.
    pub async fn read(&self, class: ArtifactClass, file_name: &str) -> AppResult<Vec<u8>> {
        let path = self.safe_path(class, file_name)?;
        tokio::fs::read(&path).await.map_err(AppError::from)
    }

    /// Resolve `file_name` within `class`'s directory without reading it.
    /// Used by the streaming component (C11) to open its own file handle.
    pub fn safe_path(&self, class: ArtifactClass, file_name: &str) -> AppResult<PathBuf> {
        let dir = self.dir_for(class);
        safety::resolve_within(dir, file_name)
            .ok_or_else(|| AppError::NotFound(format!("artifact not found: {file_name}")))
    }

    /// Best-effort delete: a missing file is not an error.
    pub async fn delete(&self, class: ArtifactClass, file_name: &str) -> AppResult<()> {
        let path = self.dir_for(class).join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::from(e)),
        }
    }

    /// Rename within the same class directory, used when a job is renamed.
    pub async fn rename(
        &self,
        class: ArtifactClass,
        old_name: &str,
        new_name: &str,
    ) -> AppResult<()> {
        let dir = self.dir_for(class);
        let old_path = dir.join(old_name);
        let new_path = dir.join(new_name);
        match tokio::fs::rename(&old_path, &new_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::from(e)),
        }
    }

    /// List entries directly under `class`'s directory along with their
    /// modification time, used by the retention scheduler's orphan sweep.
    pub async fn list_with_mtime(
        &self,
        class: ArtifactClass,
    ) -> AppResult<Vec<(PathBuf, std::time::SystemTime)>> {
        let dir = self.dir_for(class);
        let mut out = Vec::new();
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(AppError::from(e)),
        };
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                out.push((entry.path(), metadata.modified()?));
            }
        }
        Ok(out)
    }

    /// Deterministic fallback filename for an upload whose original name
    /// could not be sanitized into anything usable.
    #[must_use]
    pub fn fallback_name(extension: &str) -> String {
        let short_id = &Uuid::new_v4().simple().to_string()[..8];
        format!("{short_id}.{extension}")
    }
}
