//! End-to-end workflow tests driving the assembled router in-process via
//! `tower::ServiceExt::oneshot`, covering the concrete scenarios enumerated
//! in the job-processing pipeline's testable-properties section.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use meetflow::state::AppState;
use meetflow_artifacts::ArtifactStore;
use meetflow_config::Config;
use meetflow_engines::{FakeAsrEngine, FakeDiarizationEngine, PassthroughTranscoder};
use meetflow_llm::LlmClient;
use meetflow_store::{connect, SqliteExportRepository, SqliteJobRepository};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const BODY_LIMIT: usize = 16 * 1024 * 1024;

fn test_config(root: &std::path::Path) -> Config {
    Config {
        db_url: format!("sqlite://{}/meetflow.db", root.display()),
        llm_api_url: "http://127.0.0.1:1".to_string(),
        llm_model_name: "test-model".to_string(),
        llm_api_key: None,
        llm_timeout_secs: 5,
        asr_model_name: "whisper".to_string(),
        diarization_model_name: "pyannote".to_string(),
        ml_credentials_token: None,
        upload_dir: root.join("uploads"),
        transcript_dir: root.join("transcripts"),
        transcript_edited_dir: root.join("transcripts_edited"),
        summary_dir: root.join("summaries"),
        export_dir: root.join("exports"),
        logs_dir: root.join("logs"),
        max_file_size: 8 * 1024 * 1024,
        allowed_audio_types: vec!["audio/wav".to_string()],
        compute_device: None,
        cleanup_interval_hours: 1.0,
        job_retention_hours: 12.0,
        export_retention_hours: 24.0,
        timezone_offset: "+00:00".to_string(),
        db_pool_min: 1,
        db_pool_max: 4,
        log_level: "error".to_string(),
        log_file: root.join("logs/meetflow.log"),
        log_max_bytes: 1024,
        log_backup_count: 1,
        log_to_console: false,
    }
}

async fn build_test_app() -> (axum::Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());

    let pool = connect(&config.db_url, config.db_pool_min, config.db_pool_max).await.unwrap();
    let job_repo: Arc<dyn meetflow_store::JobRepository> = Arc::new(SqliteJobRepository::new(pool.clone()));
    let export_repo: Arc<dyn meetflow_store::ExportRepository> =
        Arc::new(SqliteExportRepository::new(pool));

    let artifacts = Arc::new(ArtifactStore::new(&config));
    artifacts.ensure_dirs().await.unwrap();

    let asr = Arc::new(FakeAsrEngine::default());
    let diarization = Arc::new(FakeDiarizationEngine);
    let transcoder = Arc::new(PassthroughTranscoder);
    let llm = Arc::new(LlmClient::new(
        config.llm_api_url.clone(),
        config.llm_model_name.clone(),
        None,
        config.llm_timeout_secs,
    ));

    let state = AppState::new(job_repo, export_repo, artifacts, asr, diarization, transcoder, llm, config.max_file_size);
    (meetflow::build_router(state), dir)
}

fn wav_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"RIFF\0\0\0\0WAVEfmt ".to_vec();
    bytes.resize(len, 0xAB);
    bytes
}

fn multipart_body(boundary: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

async fn upload(app: &axum::Router, content: &[u8]) -> (StatusCode, Value) {
    let boundary = "meetflow-test-boundary";
    let body = multipart_body(boundary, "meeting.wav", content);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/jobs")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn post_empty(app: &axum::Router, uri: &str) -> StatusCode {
    let request = Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

async fn wait_for_state(app: &axum::Router, job_id: &str, expected: &str) -> Value {
    for _ in 0..200 {
        let (status, body) = get_json(app, &format!("/api/v1/jobs/{job_id}")).await;
        assert_eq!(status, StatusCode::OK);
        if body["workflow_state"] == expected {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never reached state {expected}");
}

#[tokio::test]
async fn happy_path_transcribes_diarizes_aligns_and_completes() {
    let (app, _dir) = build_test_app().await;

    let (status, job) = upload(&app, &wav_bytes(1024)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = job["uuid"].as_str().unwrap().to_string();

    assert_eq!(post_empty(&app, &format!("/api/v1/jobs/{job_id}/transcriptions")).await, StatusCode::ACCEPTED);
    wait_for_state(&app, &job_id, "transcribed").await;

    assert_eq!(post_empty(&app, &format!("/api/v1/jobs/{job_id}/diarizations")).await, StatusCode::ACCEPTED);
    wait_for_state(&app, &job_id, "diarized").await;

    assert_eq!(post_empty(&app, &format!("/api/v1/jobs/{job_id}/alignments")).await, StatusCode::ACCEPTED);
    wait_for_state(&app, &job_id, "completed").await;

    let (status, transcript) = get_json(&app, &format!("/api/v1/jobs/{job_id}/transcripts")).await;
    assert_eq!(status, StatusCode::OK);
    let segments: Vec<Value> = serde_json::from_str(transcript["full_transcript"].as_str().unwrap()).unwrap();
    assert!(!segments.is_empty());
}

#[tokio::test]
async fn duplicate_upload_returns_the_existing_job() {
    let (app, _dir) = build_test_app().await;
    let bytes = wav_bytes(2048);

    let (status_a, job_a) = upload(&app, &bytes).await;
    assert_eq!(status_a, StatusCode::ACCEPTED);

    let (status_b, job_b) = upload(&app, &bytes).await;
    assert_eq!(status_b, StatusCode::OK);
    assert_eq!(job_a["uuid"], job_b["uuid"]);
}

#[tokio::test]
async fn upload_at_the_size_cap_succeeds_and_one_byte_over_is_413() {
    let (app, _dir) = build_test_app().await;

    let (status, _) = upload(&app, &wav_bytes(8 * 1024 * 1024)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = upload(&app, &wav_bytes(8 * 1024 * 1024 + 1)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn illegal_transition_is_rejected_and_state_is_unchanged() {
    let (app, _dir) = build_test_app().await;
    let (_, job) = upload(&app, &wav_bytes(512)).await;
    let job_id = job["uuid"].as_str().unwrap().to_string();

    let status = post_empty(&app, &format!("/api/v1/jobs/{job_id}/alignments")).await;
    assert!(status.is_client_error());

    let (_, status_body) = get_json(&app, &format!("/api/v1/jobs/{job_id}")).await;
    assert_eq!(status_body["workflow_state"], "uploaded");
}

#[tokio::test]
async fn range_request_returns_the_requested_slice() {
    let (app, _dir) = build_test_app().await;
    let content = wav_bytes(2_097_152);
    let (_, job) = upload(&app, &content).await;
    let job_id = job["uuid"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri(format!("/api/v1/jobs/{job_id}/audio"))
        .header(header::RANGE, "bytes=1048576-1572863")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes 1048576-1572863/2097152"
    );
    assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "524288");

    let bytes = to_bytes(response.into_body(), BODY_LIMIT + 1024).await.unwrap();
    assert_eq!(bytes.len(), 524_288);
    assert_eq!(&bytes[..], &content[1_048_576..=1_572_863]);
}

#[tokio::test]
async fn delete_removes_the_job_and_a_second_delete_is_not_found() {
    let (app, _dir) = build_test_app().await;
    let (_, job) = upload(&app, &wav_bytes(256)).await;
    let job_id = job["uuid"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/jobs/{job_id}"))
        .body(Body::empty())
        .unwrap();
    let status = app.clone().oneshot(request).await.unwrap().status();
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&app, &format!("/api/v1/jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/jobs/{job_id}"))
        .body(Body::empty())
        .unwrap();
    let status = app.clone().oneshot(request).await.unwrap().status();
    assert_eq!(status, StatusCode::NOT_FOUND);
}
