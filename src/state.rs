//! Process-global collaborators, constructed once at startup and cloned
//! (cheaply, via `Arc`) into every request handler — the singleton wiring
//! described in spec.md §5 ("no global in-memory mutable state besides the
//! ML engine singletons, the HTTP client, and the Retention Scheduler
//! handle").

use meetflow_artifacts::ArtifactStore;
use meetflow_engines::{AsrEngine, DiarizationEngine, Transcoder};
use meetflow_ingest::IngestService;
use meetflow_llm::LlmClient;
use meetflow_pipeline::Orchestrator;
use meetflow_store::{ExportRepository, JobRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub job_repo: Arc<dyn JobRepository>,
    pub export_repo: Arc<dyn ExportRepository>,
    pub artifacts: Arc<ArtifactStore>,
    pub ingest: Arc<IngestService>,
    pub orchestrator: Arc<Orchestrator>,
    pub llm: Arc<LlmClient>,
    pub max_file_size: u64,
}

impl AppState {
    #[must_use]
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        export_repo: Arc<dyn ExportRepository>,
        artifacts: Arc<ArtifactStore>,
        asr: Arc<dyn AsrEngine>,
        diarization: Arc<dyn DiarizationEngine>,
        transcoder: Arc<dyn Transcoder>,
        llm: Arc<LlmClient>,
        max_file_size: u64,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            job_repo.clone(),
            artifacts.clone(),
            asr,
            diarization,
        ));
        let ingest = Arc::new(IngestService {
            repo: job_repo.clone(),
            artifacts: artifacts.clone(),
            transcoder,
        });
        Self {
            job_repo,
            export_repo,
            artifacts,
            ingest,
            orchestrator,
            llm,
            max_file_size,
        }
    }
}
