//! Configuration module
//!
//! This module loads server, storage, transcription and text-generation settings
//! from the environment. Configuration is resolved once at start-up; pipeline jobs
//! never consult the environment while running.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_VIDEO_SIZE_MB: usize = 500;
const MAX_CONCURRENT_JOBS: usize = 4;
const TRANSCODE_TIMEOUT_SECS: u64 = 600;
const POLL_INTERVAL_SECS: u64 = 5;
const POLL_MAX_ATTEMPTS: u32 = 240;
const FETCH_MAX_RETRIES: u32 = 3;
const FETCH_BACKOFF_BASE_SECS: u64 = 2;
const FETCH_ATTEMPT_TIMEOUT_SECS: u64 = 30;
const GENERATION_MAX_TOKENS: u32 = 2048;
const GENERATION_TEMPERATURE: f32 = 0.3;
const GENERATION_TIMEOUT_SECS: u64 = 120;

const DEFAULT_VIDEO_EXTENSIONS: &str = "mp4,webm,mov,avi,mkv,m4v";
const DEFAULT_VIDEO_CONTENT_TYPES: &str =
    "video/mp4,video/webm,video/quicktime,video/x-msvideo,video/x-matroska,video/x-m4v";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_OPENAI_MODEL: &str = "llama-3.3-70b-versatile";

/// Speech-to-text backend used by the transcription stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionProvider {
    /// AWS Transcribe batch jobs (requires S3 storage)
    Aws,
    /// Local Whisper binary wrapped behind the same submit/poll contract
    Whisper,
}

impl FromStr for TranscriptionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" | "aws-transcribe" => Ok(TranscriptionProvider::Aws),
            "whisper" | "local" => Ok(TranscriptionProvider::Whisper),
            _ => Err(anyhow::anyhow!("Invalid transcription provider: {}", s)),
        }
    }
}

impl Display for TranscriptionProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TranscriptionProvider::Aws => write!(f, "aws"),
            TranscriptionProvider::Whisper => write!(f, "whisper"),
        }
    }
}

/// Text-generation backend used for notes and transcript cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationProvider {
    /// Anthropic Messages API
    Anthropic,
    /// Any OpenAI-compatible chat completions endpoint (Groq by default)
    OpenAi,
}

impl FromStr for GenerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(GenerationProvider::Anthropic),
            "openai" | "groq" | "openai-compatible" => Ok(GenerationProvider::OpenAi),
            _ => Err(anyhow::anyhow!("Invalid generation provider: {}", s)),
        }
    }
}

impl Display for GenerationProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            GenerationProvider::Anthropic => write!(f, "anthropic"),
            GenerationProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// When unset the in-memory repository is used
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Full Lectern configuration
#[derive(Clone, Debug)]
pub struct LecternConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Upload configuration
    pub max_video_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    pub upload_video: bool,
    pub work_dir: Option<PathBuf>,
    pub max_concurrent_jobs: usize,
    // Audio extraction
    pub ffmpeg_path: String,
    pub audio_codec: String,
    pub transcode_timeout_secs: u64,
    // Transcription
    pub transcription_provider: TranscriptionProvider,
    pub transcription_language: String,
    pub whisper_path: String,
    pub whisper_model: String,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    // Transcript fetch
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_secs: u64,
    pub fetch_attempt_timeout_secs: u64,
    // Text generation
    pub generation_provider: GenerationProvider,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub generation_max_tokens: u32,
    pub generation_temperature: f32,
    pub generation_timeout_secs: u64,
    pub clean_transcript: bool,
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                database_url: None,
                db_max_connections: MAX_CONNECTIONS,
                db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            },
            storage_backend: StorageBackend::S3,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: "./data/storage".to_string(),
            local_storage_base_url: format!("http://localhost:{}/files", SERVER_PORT),
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            video_allowed_extensions: split_list(DEFAULT_VIDEO_EXTENSIONS),
            video_allowed_content_types: split_list(DEFAULT_VIDEO_CONTENT_TYPES),
            upload_video: true,
            work_dir: None,
            max_concurrent_jobs: MAX_CONCURRENT_JOBS,
            ffmpeg_path: "ffmpeg".to_string(),
            audio_codec: "libmp3lame".to_string(),
            transcode_timeout_secs: TRANSCODE_TIMEOUT_SECS,
            transcription_provider: TranscriptionProvider::Aws,
            transcription_language: "en-US".to_string(),
            whisper_path: "whisper".to_string(),
            whisper_model: "base".to_string(),
            poll_interval_secs: POLL_INTERVAL_SECS,
            poll_max_attempts: POLL_MAX_ATTEMPTS,
            fetch_max_retries: FETCH_MAX_RETRIES,
            fetch_backoff_base_secs: FETCH_BACKOFF_BASE_SECS,
            fetch_attempt_timeout_secs: FETCH_ATTEMPT_TIMEOUT_SECS,
            generation_provider: GenerationProvider::OpenAi,
            anthropic_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            generation_max_tokens: GENERATION_MAX_TOKENS,
            generation_temperature: GENERATION_TEMPERATURE,
            generation_timeout_secs: GENERATION_TIMEOUT_SECS,
            clean_transcript: false,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a numeric knob; unset means default, malformed is an error
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, anyhow::Error> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, value)),
        _ => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl LecternConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = LecternConfig::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env_opt("DATABASE_URL"),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
        };

        let storage_backend = match env_opt("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.storage_backend,
        };
        let transcription_provider = match env_opt("TRANSCRIPTION_PROVIDER") {
            Some(value) => value.parse()?,
            None => defaults.transcription_provider,
        };
        let generation_provider = match env_opt("GENERATION_PROVIDER") {
            Some(value) => value.parse()?,
            None => defaults.generation_provider,
        };

        let max_video_size_mb = env_or("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)?;

        let config = LecternConfig {
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/files", base.server_port)),
            base,
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            aws_region: env_opt("AWS_REGION"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH")
                .unwrap_or(defaults.local_storage_path),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            video_allowed_extensions: env_opt("VIDEO_ALLOWED_EXTENSIONS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.video_allowed_extensions),
            video_allowed_content_types: env_opt("VIDEO_ALLOWED_CONTENT_TYPES")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.video_allowed_content_types),
            upload_video: env_flag("UPLOAD_VIDEO", defaults.upload_video),
            work_dir: env_opt("WORK_DIR").map(PathBuf::from),
            max_concurrent_jobs: env_or("MAX_CONCURRENT_JOBS", MAX_CONCURRENT_JOBS)?,
            ffmpeg_path: env_opt("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            audio_codec: env_opt("AUDIO_CODEC").unwrap_or(defaults.audio_codec),
            transcode_timeout_secs: env_or("TRANSCODE_TIMEOUT_SECS", TRANSCODE_TIMEOUT_SECS)?,
            transcription_provider,
            transcription_language: env_opt("TRANSCRIPTION_LANGUAGE")
                .unwrap_or(defaults.transcription_language),
            whisper_path: env_opt("WHISPER_PATH").unwrap_or(defaults.whisper_path),
            whisper_model: env_opt("WHISPER_MODEL").unwrap_or(defaults.whisper_model),
            poll_interval_secs: env_or("POLL_INTERVAL_SECS", POLL_INTERVAL_SECS)?,
            poll_max_attempts: env_or("POLL_MAX_ATTEMPTS", POLL_MAX_ATTEMPTS)?,
            fetch_max_retries: env_or("FETCH_MAX_RETRIES", FETCH_MAX_RETRIES)?,
            fetch_backoff_base_secs: env_or("FETCH_BACKOFF_BASE_SECS", FETCH_BACKOFF_BASE_SECS)?,
            fetch_attempt_timeout_secs: env_or(
                "FETCH_ATTEMPT_TIMEOUT_SECS",
                FETCH_ATTEMPT_TIMEOUT_SECS,
            )?,
            generation_provider,
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_model: env_opt("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            openai_api_key: env_opt("OPENAI_API_KEY").or_else(|| env_opt("GROQ_API_KEY")),
            openai_base_url: env_opt("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: env_opt("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            generation_max_tokens: env_or("GENERATION_MAX_TOKENS", GENERATION_MAX_TOKENS)?,
            generation_temperature: env_or("GENERATION_TEMPERATURE", GENERATION_TEMPERATURE)?,
            generation_timeout_secs: env_or("GENERATION_TIMEOUT_SECS", GENERATION_TIMEOUT_SECS)?,
            clean_transcript: env_flag("CLEAN_TRANSCRIPT", defaults.clean_transcript),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(url) = &self.base.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        if self.max_concurrent_jobs == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_JOBS must be greater than zero"));
        }

        if self.poll_interval_secs == 0 || self.poll_max_attempts == 0 {
            return Err(anyhow::anyhow!(
                "POLL_INTERVAL_SECS and POLL_MAX_ATTEMPTS must be greater than zero"
            ));
        }

        // Validate storage backend configuration
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        // AWS Transcribe reads media from S3 locators only
        if self.transcription_provider == TranscriptionProvider::Aws {
            if self.storage_backend != StorageBackend::S3 {
                return Err(anyhow::anyhow!(
                    "TRANSCRIPTION_PROVIDER=aws requires STORAGE_BACKEND=s3"
                ));
            }
            if self.transcribe_region().is_none() {
                return Err(anyhow::anyhow!(
                    "AWS_REGION or S3_REGION must be set when using AWS Transcribe"
                ));
            }
        }

        // Local Whisper reads the uploaded audio through a file:// locator
        if self.transcription_provider == TranscriptionProvider::Whisper
            && self.storage_backend != StorageBackend::Local
        {
            return Err(anyhow::anyhow!(
                "TRANSCRIPTION_PROVIDER=whisper requires STORAGE_BACKEND=local"
            ));
        }

        match self.generation_provider {
            GenerationProvider::Anthropic if self.anthropic_api_key.is_none() => {
                return Err(anyhow::anyhow!(
                    "ANTHROPIC_API_KEY must be set when GENERATION_PROVIDER=anthropic"
                ));
            }
            GenerationProvider::OpenAi if self.openai_api_key.is_none() => {
                return Err(anyhow::anyhow!(
                    "OPENAI_API_KEY (or GROQ_API_KEY) must be set when GENERATION_PROVIDER=openai"
                ));
            }
            _ => {}
        }

        if !(0.0..=2.0).contains(&self.generation_temperature) {
            return Err(anyhow::anyhow!(
                "GENERATION_TEMPERATURE must be between 0.0 and 2.0"
            ));
        }

        Ok(())
    }

    /// Region for the transcription client: AWS_REGION wins over S3_REGION
    pub fn transcribe_region(&self) -> Option<&str> {
        self.aws_region.as_deref().or(self.s3_region.as_deref())
    }
}

/// Application configuration
///
/// Boxed so the handle stays cheap to clone into request state.
#[derive(Clone, Debug)]
pub struct Config(pub Box<LecternConfig>);

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = LecternConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.0.validate()
    }

    pub fn as_lectern(&self) -> &LecternConfig {
        &self.0
    }

    pub fn server_port(&self) -> u16 {
        self.0.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.0.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.0.base.environment
    }

    pub fn is_production(&self) -> bool {
        self.0.is_production()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.0.base.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.0.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.0.base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.0.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.0.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.0.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.0.s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.0.aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.0.local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.0.local_storage_base_url
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.0.max_video_size_bytes
    }

    pub fn video_allowed_extensions(&self) -> &[String] {
        &self.0.video_allowed_extensions
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.0.video_allowed_content_types
    }

    pub fn upload_video(&self) -> bool {
        self.0.upload_video
    }

    pub fn work_dir(&self) -> Option<&PathBuf> {
        self.0.work_dir.as_ref()
    }

    pub fn max_concurrent_jobs(&self) -> usize {
        self.0.max_concurrent_jobs
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.0.ffmpeg_path
    }

    pub fn audio_codec(&self) -> &str {
        &self.0.audio_codec
    }

    pub fn transcode_timeout(&self) -> Duration {
        Duration::from_secs(self.0.transcode_timeout_secs)
    }

    pub fn transcription_provider(&self) -> TranscriptionProvider {
        self.0.transcription_provider
    }

    pub fn transcription_language(&self) -> &str {
        &self.0.transcription_language
    }

    pub fn transcribe_region(&self) -> Option<&str> {
        self.0.transcribe_region()
    }

    pub fn whisper_path(&self) -> &str {
        &self.0.whisper_path
    }

    pub fn whisper_model(&self) -> &str {
        &self.0.whisper_model
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.0.poll_interval_secs)
    }

    pub fn poll_max_attempts(&self) -> u32 {
        self.0.poll_max_attempts
    }

    pub fn fetch_max_retries(&self) -> u32 {
        self.0.fetch_max_retries
    }

    pub fn fetch_backoff_base(&self) -> Duration {
        Duration::from_secs(self.0.fetch_backoff_base_secs)
    }

    pub fn fetch_attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.0.fetch_attempt_timeout_secs)
    }

    pub fn generation_provider(&self) -> GenerationProvider {
        self.0.generation_provider
    }

    pub fn anthropic_api_key(&self) -> Option<&str> {
        self.0.anthropic_api_key.as_deref()
    }

    pub fn anthropic_model(&self) -> &str {
        &self.0.anthropic_model
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.0.openai_api_key.as_deref()
    }

    pub fn openai_base_url(&self) -> &str {
        &self.0.openai_base_url
    }

    pub fn openai_model(&self) -> &str {
        &self.0.openai_model
    }

    pub fn generation_max_tokens(&self) -> u32 {
        self.0.generation_max_tokens
    }

    pub fn generation_temperature(&self) -> f32 {
        self.0.generation_temperature
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.0.generation_timeout_secs)
    }

    pub fn clean_transcript(&self) -> bool {
        self.0.clean_transcript
    }
}

impl From<LecternConfig> for Config {
    fn from(config: LecternConfig) -> Self {
        Config(Box::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_config() -> LecternConfig {
        LecternConfig {
            s3_bucket: Some("lectures".to_string()),
            aws_region: Some("us-east-1".to_string()),
            openai_api_key: Some("gsk_test".to_string()),
            ..LecternConfig::default()
        }
    }

    #[test]
    fn test_s3_config_is_valid() {
        assert!(s3_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_s3_bucket() {
        let config = LecternConfig {
            s3_bucket: None,
            ..s3_config()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("S3_BUCKET"), "got: {}", err);
    }

    #[test]
    fn test_aws_transcribe_requires_s3_backend() {
        let config = LecternConfig {
            storage_backend: StorageBackend::Local,
            ..s3_config()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("STORAGE_BACKEND=s3"), "got: {}", err);
    }

    #[test]
    fn test_whisper_requires_local_backend() {
        let config = LecternConfig {
            transcription_provider: TranscriptionProvider::Whisper,
            ..s3_config()
        };
        assert_eq!(config.storage_backend, StorageBackend::S3);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("STORAGE_BACKEND=local"), "got: {}", err);
    }

    #[test]
    fn test_env_or_rejects_malformed_number() {
        std::env::set_var("LECTERN_TEST_POLL_MAX_ATTEMPTS", "abc");
        let err = env_or("LECTERN_TEST_POLL_MAX_ATTEMPTS", 240u32)
            .unwrap_err()
            .to_string();
        assert!(err.contains("LECTERN_TEST_POLL_MAX_ATTEMPTS"), "got: {}", err);

        std::env::set_var("LECTERN_TEST_POLL_MAX_ATTEMPTS", " 12 ");
        assert_eq!(env_or("LECTERN_TEST_POLL_MAX_ATTEMPTS", 240u32).unwrap(), 12);

        std::env::remove_var("LECTERN_TEST_POLL_MAX_ATTEMPTS");
        assert_eq!(env_or("LECTERN_TEST_POLL_MAX_ATTEMPTS", 240u32).unwrap(), 240);
    }

    #[test]
    fn test_local_storage_with_whisper_is_valid() {
        let config = LecternConfig {
            storage_backend: StorageBackend::Local,
            transcription_provider: TranscriptionProvider::Whisper,
            s3_bucket: None,
            aws_region: None,
            ..s3_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generation_provider_requires_key() {
        let config = LecternConfig {
            generation_provider: GenerationProvider::Anthropic,
            anthropic_api_key: None,
            ..s3_config()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("ANTHROPIC_API_KEY"), "got: {}", err);
    }

    #[test]
    fn test_production_rejects_wildcard_cors() {
        let mut config = s3_config();
        config.base.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.base.cors_origins = vec!["https://notes.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_match_pipeline_policy() {
        let config = Config::from(s3_config());
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.poll_max_attempts(), 240);
        assert_eq!(config.fetch_max_retries(), 3);
        assert_eq!(config.fetch_backoff_base(), Duration::from_secs(2));
        assert_eq!(config.fetch_attempt_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_video_size_bytes(), 500 * 1024 * 1024);
        assert_eq!(config.audio_codec(), "libmp3lame");
        assert_eq!(config.transcription_language(), "en-US");
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!(
            "Groq".parse::<GenerationProvider>().unwrap(),
            GenerationProvider::OpenAi
        );
        assert_eq!(
            "claude".parse::<GenerationProvider>().unwrap(),
            GenerationProvider::Anthropic
        );
        assert_eq!(
            "whisper".parse::<TranscriptionProvider>().unwrap(),
            TranscriptionProvider::Whisper
        );
        assert!("azure".parse::<TranscriptionProvider>().is_err());
    }
}
