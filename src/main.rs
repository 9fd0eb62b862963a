use meetflow::state::AppState;
use meetflow_artifacts::ArtifactStore;
use meetflow_config::Config;
use meetflow_engines::{FakeAsrEngine, FakeDiarizationEngine, PassthroughTranscoder};
use meetflow_llm::LlmClient;
use meetflow_store::{connect, SqliteExportRepository, SqliteJobRepository};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.log_to_console {
        builder.init();
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .expect("failed to open log file");
        builder
            .with_writer(move || file.try_clone().expect("failed to clone log file handle"))
            .with_ansi(false)
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("invalid configuration");
    init_tracing(&config);

    let pool = connect(&config.db_url, config.db_pool_min, config.db_pool_max)
        .await
        .expect("failed to connect to the job store");

    let job_repo: Arc<dyn meetflow_store::JobRepository> = Arc::new(SqliteJobRepository::new(pool.clone()));
    let export_repo: Arc<dyn meetflow_store::ExportRepository> =
        Arc::new(SqliteExportRepository::new(pool));

    let artifacts = Arc::new(ArtifactStore::new(&config));
    artifacts.ensure_dirs().await.expect("failed to prepare artifact directories");

    let asr: Arc<dyn meetflow_engines::AsrEngine> = Arc::new(FakeAsrEngine::default());
    let diarization: Arc<dyn meetflow_engines::DiarizationEngine> = Arc::new(FakeDiarizationEngine);
    let transcoder: Arc<dyn meetflow_engines::Transcoder> = Arc::new(PassthroughTranscoder);

    let llm = Arc::new(LlmClient::new(
        config.llm_api_url.clone(),
        config.llm_model_name.clone(),
        config.llm_api_key.clone(),
        config.llm_timeout_secs,
    ));

    let state = AppState::new(
        job_repo.clone(),
        export_repo.clone(),
        artifacts.clone(),
        asr,
        diarization,
        transcoder,
        llm,
        config.max_file_size,
    );

    let cancel = CancellationToken::new();
    let retention_handle = tokio::spawn(meetflow_retention::run(
        job_repo,
        export_repo,
        artifacts,
        config.cleanup_interval_hours,
        config.job_retention_hours,
        config.export_retention_hours,
        cancel.clone(),
    ));

    let app = meetflow::build_router(state);
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000")
        .await
        .expect("failed to bind listener");
    tracing::info!("meetflow listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    cancel.cancel();
    let _ = retention_handle.await;
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("failed to listen for ctrl-c");
    tracing::info!("shutdown signal received");
}
