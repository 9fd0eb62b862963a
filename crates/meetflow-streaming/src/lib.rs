//! Audio Range Streamer (C11): serves a job's stored upload with HTTP Range
//! semantics, built on `axum::body::Body::from_stream` over a chunked
//! `tokio::fs::File` read — the same "wrap an `AsyncRead` in a stream and
//! hand it to `Body::from_stream`" shape used for live audio delivery in
//! `other_examples/bf47d198_brew-lab-thaumic-cast__packages-thaumic-core-src-api-stream.rs.rs`,
//! adapted here to a seekable file instead of a broadcast channel.

pub mod range;

pub use range::{content_type_for, parse_range, ByteRange};

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use meetflow_artifacts::{ArtifactClass, ArtifactStore};
use meetflow_error::{AppError, AppResult};
use meetflow_store::JobRepository;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Resolve `job_id` to its stored upload and stream it, honoring an
/// optional `Range` header value.
pub async fn serve_audio(
    job_repo: &dyn JobRepository,
    artifacts: &ArtifactStore,
    job_id: Uuid,
    range_header: Option<&str>,
) -> AppResult<Response> {
    let job = job_repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    let path = artifacts.safe_path(ArtifactClass::Upload, &job.file_name)?;
    let metadata = tokio::fs::metadata(&path).await?;
    let size = metadata.len();
    let content_type = content_type_for(&job.file_name);

    match parse_range(range_header, size) {
        Some(range) => stream_partial(&path, size, content_type, range).await,
        None => stream_full(&path, size, content_type).await,
    }
}

async fn stream_full(path: &std::path::Path, size: u64, content_type: &'static str) -> AppResult<Response> {
    let file = tokio::fs::File::open(path).await?;
    let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);
    let body = Body::from_stream(stream);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .into_response())
}

async fn stream_partial(
    path: &std::path::Path,
    size: u64,
    content_type: &'static str,
    range: ByteRange,
) -> AppResult<Response> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(std::io::SeekFrom::Start(range.start)).await?;
    let limited = file.take(range.len());
    let stream = ReaderStream::with_capacity(limited, CHUNK_SIZE);
    let body = Body::from_stream(stream);

    Ok(Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, range.len().to_string())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end, size),
        )
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .into_response())
}
