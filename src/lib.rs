//! HTTP surface for the meeting-recording processing service: wires the
//! `/api/v1` routes onto the Job Orchestration Engine's components.

pub mod dto;
pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;
use state::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Headroom added on top of `max_file_size` for axum's own body-size guard.
/// Multipart framing (boundary markers, part headers, the filename field)
/// adds a small amount of overhead on top of the raw file bytes, so the
/// axum-level limit must sit above `max_file_size` or a legitimate upload
/// of exactly `max_file_size` bytes would be rejected before the
/// byte-accurate `StreamingHasher` ever runs (spec.md §8: "upload of
/// exactly `max_file_size` bytes succeeds"). This layer is a generous
/// backstop only — `StreamingHasher` in `meetflow-ingest` is the sole
/// byte-exact enforcement point for the `413` boundary.
const MULTIPART_FRAMING_HEADROOM: usize = 1024 * 1024;

#[must_use]
pub fn build_router(state: AppState) -> Router {
    let max_body = state.max_file_size as usize + MULTIPART_FRAMING_HEADROOM;

    let api = Router::new()
        .route("/jobs", post(handlers::jobs::create_job).get(handlers::jobs::list_jobs))
        .route(
            "/jobs/{job_id}",
            get(handlers::jobs::get_job_status)
                .patch(handlers::jobs::rename_job)
                .delete(handlers::jobs::delete_job),
        )
        .route(
            "/jobs/{job_id}/transcriptions",
            post(handlers::jobs::start_transcription).get(handlers::jobs::get_transcription_data),
        )
        .route(
            "/jobs/{job_id}/diarizations",
            post(handlers::jobs::start_diarization).get(handlers::jobs::get_diarization_data),
        )
        .route("/jobs/{job_id}/alignments", post(handlers::jobs::start_alignment))
        .route(
            "/jobs/{job_id}/transcripts",
            get(handlers::transcripts::get_transcript).patch(handlers::transcripts::update_transcript),
        )
        .route(
            "/jobs/{job_id}/summaries",
            get(handlers::summaries::get_summary)
                .post(handlers::summaries::create_summary)
                .patch(handlers::summaries::update_summary)
                .delete(handlers::summaries::delete_summary),
        )
        .route("/jobs/{job_id}/speakers", patch(handlers::speakers::update_speakers))
        .route(
            "/jobs/{job_id}/speaker-identifications",
            post(handlers::speakers::identify_speakers),
        )
        .route("/jobs/{job_id}/audio", get(handlers::audio::stream_audio))
        .route("/jobs/{job_id}/export-jobs", post(handlers::exports::create_export))
        .route(
            "/jobs/{job_id}/export-jobs/{export_id}",
            get(handlers::exports::get_export_status),
        )
        .route(
            "/jobs/{job_id}/export-jobs/{export_id}/download",
            get(handlers::exports::download_export),
        );

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}
