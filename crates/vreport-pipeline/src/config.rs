//! Pipeline configuration.

use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Transcription provider endpoint
    pub caption_api_url: String,
    /// Transcription provider bearer token
    pub caption_api_key: String,
    /// Caption locale requested from the provider
    pub caption_locale: String,
    /// Timeout for one caption request
    pub caption_timeout: Duration,
    /// Generative model API key
    pub gemini_api_key: String,
    /// Generative model name
    pub gemini_model: String,
    /// Per-call model timeout
    pub model_timeout: Duration,
    /// Maximum concurrent visualization renders
    pub max_render_parallel: usize,
    /// Retries for one model call (not counting the initial attempt)
    pub model_max_retries: u32,
    /// Base backoff delay between model-call retries
    pub model_retry_base_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            caption_api_url: "https://vidcap.xyz/api/v1/youtube/caption".to_string(),
            caption_api_key: String::new(),
            caption_locale: "en".to_string(),
            caption_timeout: Duration::from_secs(30),
            gemini_api_key: String::new(),
            gemini_model: "gemini-2.5-flash".to_string(),
            model_timeout: Duration::from_secs(60),
            max_render_parallel: 4,
            model_max_retries: 2,
            model_retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            caption_api_url: std::env::var("CAPTION_API_URL")
                .unwrap_or(defaults.caption_api_url),
            caption_api_key: std::env::var("CAPTION_API_KEY").unwrap_or_default(),
            caption_locale: std::env::var("CAPTION_LOCALE").unwrap_or(defaults.caption_locale),
            caption_timeout: Duration::from_secs(
                std::env::var("CAPTION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            model_timeout: Duration::from_secs(
                std::env::var("MODEL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            max_render_parallel: std::env::var("RENDER_MAX_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            model_max_retries: std::env::var("MODEL_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            model_retry_base_delay: Duration::from_millis(
                std::env::var("MODEL_RETRY_BASE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
        }
    }
}
