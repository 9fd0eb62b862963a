//! Ingest (C3): content-addressed dedup, path-safe naming, and format
//! normalization for uploaded recordings.
//!
//! Grounded on `original_source/backend/utils/file_utils.py` for the naming
//! rules and `original_source/backend/api/v1/jobs.py` for the upload
//! sequence; streamed hashing mirrors the `sha2` usage seen in the
//! retrieval pack's `EffortlessMetrics-agent-backplane`.

use meetflow_artifacts::{sanitize_filename, ArtifactClass, ArtifactStore};
use meetflow_engines::Transcoder;
use meetflow_error::{AppError, AppResult};
use meetflow_store::{Job, JobRepository, NewJob};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

/// Streaming SHA-256 accumulator. Feed chunks as they arrive off the wire so
/// the whole body never needs buffering just to hash it.
#[derive(Default)]
pub struct StreamingHasher {
    hasher: Sha256,
    bytes_seen: u64,
}

impl StreamingHasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, aborting early with `PayloadTooLarge` once `max_bytes`
    /// is exceeded rather than hashing (and buffering) the rest of an
    /// oversized upload.
    pub fn update(&mut self, chunk: &[u8], max_bytes: u64) -> AppResult<()> {
        self.bytes_seen += chunk.len() as u64;
        if self.bytes_seen > max_bytes {
            return Err(AppError::PayloadTooLarge);
        }
        self.hasher.update(chunk);
        Ok(())
    }

    #[must_use]
    pub fn finalize(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }

    #[must_use]
    pub fn bytes_seen(&self) -> u64 {
        self.bytes_seen
    }
}

/// Resolve a collision-free name within `existing`, following
/// `get_unique_filename`: first collision becomes `"{name} (Copy){ext}"`,
/// then `"{name} (Copy {n}){ext}"` for `n = 2, 3, ...`.
#[must_use]
pub fn unique_filename(desired: &str, existing: &[String]) -> String {
    if !existing.iter().any(|n| n == desired) {
        return desired.to_string();
    }

    let path = Path::new(desired);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(desired);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let first_copy = format!("{stem} (Copy){ext}");
    if !existing.iter().any(|n| n == &first_copy) {
        return first_copy;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{stem} (Copy {n}){ext}");
        if !existing.iter().any(|n| n == &candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Outcome of an ingest attempt: either a freshly created job, or the
/// existing job matching the same content hash (dedup, spec.md §4.3 step 4).
pub enum IngestOutcome {
    Existing(Job),
    Created(Job),
}

/// Ingest a fully-buffered upload (the multipart layer has already hashed
/// and size-checked it via [`StreamingHasher`]).
///
/// `original_name` is the client-supplied filename; `is_wav` tells whether
/// the uploaded bytes are already 16 kHz mono WAV, skipping the transcoder.
pub async fn ingest(
    repo: &dyn JobRepository,
    artifacts: &ArtifactStore,
    transcoder: &dyn Transcoder,
    bytes: &[u8],
    file_hash: &str,
    original_name: &str,
    is_wav: bool,
) -> AppResult<IngestOutcome> {
    if let Some(existing) = repo.find_by_hash(file_hash).await? {
        return Ok(IngestOutcome::Existing(existing));
    }

    let sanitized = sanitize_filename(original_name);
    let existing_names: Vec<String> = artifacts
        .list_with_mtime(ArtifactClass::Upload)
        .await?
        .into_iter()
        .filter_map(|(path, _)| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    let unique_name = unique_filename(&sanitized, &existing_names);

    let stored_path = artifacts
        .write(ArtifactClass::Upload, &unique_name, bytes)
        .await?;

    if !is_wav {
        let wav_name = with_wav_extension(&unique_name);
        let wav_path = artifacts.dir_for(ArtifactClass::Upload).join(&wav_name);
        match transcoder.to_wav(&stored_path, &wav_path).await {
            Ok(()) => {
                let _ = tokio::fs::remove_file(&stored_path).await;
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&stored_path).await;
                let _ = tokio::fs::remove_file(&wav_path).await;
                return Err(AppError::ExternalDependencyFailure(format!(
                    "conversion failed: {e}"
                )));
            }
        }
    }

    let job = repo
        .insert(NewJob {
            file_name: unique_name,
            file_hash: file_hash.to_string(),
        })
        .await?;

    Ok(IngestOutcome::Created(job))
}

fn with_wav_extension(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    format!("{stem}.wav")
}

/// Shared handle bundling the collaborators ingest needs, for wiring into
/// the HTTP layer.
pub struct IngestService {
    pub repo: Arc<dyn JobRepository>,
    pub artifacts: Arc<ArtifactStore>,
    pub transcoder: Arc<dyn Transcoder>,
}

impl IngestService {
    pub async fn ingest(
        &self,
        bytes: &[u8],
        file_hash: &str,
        original_name: &str,
        is_wav: bool,
    ) -> AppResult<IngestOutcome> {
        ingest(
            self.repo.as_ref(),
            self.artifacts.as_ref(),
            self.transcoder.as_ref(),
            bytes,
            file_hash,
            original_name,
            is_wav,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hasher_matches_known_digest() {
        let mut hasher = StreamingHasher::new();
        hasher.update(b"hello world", 1024).unwrap();
        assert_eq!(
            hasher.finalize(),
            "b94d27b9934d3e08a52e52d7da7dacefbe87be08b3c6afbbb9f7f7bbd47ff0f1"
        );
    }

    #[test]
    fn hasher_aborts_past_max_bytes() {
        let mut hasher = StreamingHasher::new();
        let err = hasher.update(&[0u8; 10], 5).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge));
    }

    #[test]
    fn unique_filename_passes_through_when_free() {
        assert_eq!(unique_filename("a.wav", &[]), "a.wav");
    }

    #[test]
    fn unique_filename_first_collision_appends_copy() {
        let existing = vec!["a.wav".to_string()];
        assert_eq!(unique_filename("a.wav", &existing), "a (Copy).wav");
    }

    #[test]
    fn unique_filename_numbers_subsequent_collisions() {
        let existing = vec![
            "a.wav".to_string(),
            "a (Copy).wav".to_string(),
            "a (Copy 2).wav".to_string(),
        ];
        assert_eq!(unique_filename("a.wav", &existing), "a (Copy 3).wav");
    }
}
