//! Configuration as a record (spec.md §9): a single frozen `Config` struct
//! populated from the environment once at startup. No component re-reads
//! the environment after `Config::from_env()` returns.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,

    pub llm_api_url: String,
    pub llm_model_name: String,
    pub llm_api_key: Option<String>,
    pub llm_timeout_secs: u64,

    pub asr_model_name: String,
    pub diarization_model_name: String,
    pub ml_credentials_token: Option<String>,

    pub upload_dir: PathBuf,
    pub transcript_dir: PathBuf,
    pub transcript_edited_dir: PathBuf,
    pub summary_dir: PathBuf,
    pub export_dir: PathBuf,
    pub logs_dir: PathBuf,

    pub max_file_size: u64,
    pub allowed_audio_types: Vec<String>,
    pub compute_device: Option<String>,

    pub cleanup_interval_hours: f64,
    pub job_retention_hours: f64,
    pub export_retention_hours: f64,

    pub timezone_offset: String,

    pub db_pool_min: u32,
    pub db_pool_max: u32,

    pub log_level: String,
    pub log_file: PathBuf,
    pub log_max_bytes: u64,
    pub log_backup_count: u32,
    pub log_to_console: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from the process environment, applying the
    /// defaults named in spec.md §9.
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_url = env_or("DATABASE_URL", "sqlite://meetflow.db");

        let llm_api_url = std::env::var("LLM_API_URL")
            .map_err(|_| ConfigError::Missing("LLM_API_URL"))?;
        let llm_model_name = std::env::var("LLM_MODEL_NAME")
            .map_err(|_| ConfigError::Missing("LLM_MODEL_NAME"))?;

        let allowed_audio_types = env_or(
            "ALLOWED_AUDIO_TYPES",
            "audio/wav,audio/mpeg,audio/mp4,audio/x-m4a,audio/webm,audio/flac,audio/ogg",
        )
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

        Ok(Self {
            db_url,
            llm_api_url,
            llm_model_name,
            llm_api_key: env_opt("LLM_API_KEY"),
            llm_timeout_secs: env_parse("LLM_TIMEOUT_SECS", 60)?,

            asr_model_name: env_or("ASR_MODEL_NAME", "whisper-turbo"),
            diarization_model_name: env_or(
                "DIARIZATION_MODEL_NAME",
                "pyannote/speaker-diarization-3.1",
            ),
            ml_credentials_token: env_opt("ML_CREDENTIALS_TOKEN"),

            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "data/uploads")),
            transcript_dir: PathBuf::from(env_or("TRANSCRIPT_DIR", "data/transcripts")),
            transcript_edited_dir: PathBuf::from(env_or(
                "TRANSCRIPT_EDITED_DIR",
                "data/transcripts_edited",
            )),
            summary_dir: PathBuf::from(env_or("SUMMARY_DIR", "data/summaries")),
            export_dir: PathBuf::from(env_or("EXPORT_DIR", "data/exports")),
            logs_dir: PathBuf::from(env_or("LOGS_DIR", "data/logs")),

            max_file_size: env_parse("MAX_FILE_SIZE", 100 * 1024 * 1024)?,
            allowed_audio_types,
            compute_device: env_opt("COMPUTE_DEVICE"),

            cleanup_interval_hours: env_parse("CLEANUP_INTERVAL_HOURS", 1.0)?,
            job_retention_hours: env_parse("JOB_RETENTION_HOURS", 12.0)?,
            export_retention_hours: env_parse("EXPORT_RETENTION_HOURS", 24.0)?,

            timezone_offset: env_or("TIMEZONE_OFFSET", "+00:00"),

            db_pool_min: env_parse("DB_POOL_MIN", 5)?,
            db_pool_max: env_parse("DB_POOL_MAX", 20)?,

            log_level: env_or("LOG_LEVEL", "info"),
            log_file: PathBuf::from(env_or("LOG_FILE", "data/logs/meetflow.log")),
            log_max_bytes: env_parse("LOG_MAX_BYTES", 10 * 1024 * 1024)?,
            log_backup_count: env_parse("LOG_BACKUP_COUNT", 5)?,
            log_to_console: env_parse("LOG_TO_CONSOLE", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variable mutation races across test threads; serialize.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn from_env_requires_llm_settings() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("LLM_API_URL");
        std::env::remove_var("LLM_MODEL_NAME");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("LLM_API_URL")));
    }

    #[test]
    fn from_env_applies_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("LLM_API_URL", "http://localhost:11434");
        std::env::set_var("LLM_MODEL_NAME", "test-model");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.max_file_size, 100 * 1024 * 1024);
        assert_eq!(cfg.job_retention_hours, 12.0);
        assert_eq!(cfg.allowed_audio_types.len(), 7);
        std::env::remove_var("LLM_API_URL");
        std::env::remove_var("LLM_MODEL_NAME");
    }
}
