//! Caption extraction stage.
//!
//! Fetches a transcript for a source video from the transcription
//! provider. Failure is normalized into a sentinel string rather than an
//! error so downstream stages can short-circuit without unwinding.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// Prefix of the sentinel returned when caption extraction fails.
pub const CAPTION_ERROR_PREFIX: &str = "[caption-error]";

/// True when a transcript is empty or carries the failure sentinel.
pub fn is_caption_failure(transcript: &str) -> bool {
    transcript.trim().is_empty() || transcript.starts_with(CAPTION_ERROR_PREFIX)
}

/// Seam for the transcription provider.
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for `url`. Never fails: any error is folded
    /// into a `CAPTION_ERROR_PREFIX` sentinel string.
    fn extract(&self, url: &str) -> impl Future<Output = String> + Send;
}

/// Transcription provider HTTP client.
///
/// One attempt per invocation; retry policy, if any, belongs to the
/// caller.
#[derive(Debug)]
pub struct CaptionClient {
    api_url: String,
    api_key: String,
    locale: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct CaptionResponse {
    #[serde(default)]
    data: CaptionData,
}

#[derive(Debug, Default, Deserialize)]
struct CaptionData {
    #[serde(default)]
    content: String,
}

impl CaptionClient {
    /// Create a client from pipeline configuration.
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        Self::with_endpoint(
            &config.caption_api_url,
            &config.caption_api_key,
            &config.caption_locale,
            config.caption_timeout,
        )
    }

    /// Create a client against an explicit endpoint.
    pub fn with_endpoint(
        api_url: &str,
        api_key: &str,
        locale: &str,
        timeout: Duration,
    ) -> PipelineResult<Self> {
        if api_key.is_empty() {
            return Err(PipelineError::config("CAPTION_API_KEY not set"));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            locale: locale.to_string(),
            http,
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, String> {
        let response = self
            .http
            .get(&self.api_url)
            .query(&[("url", url), ("locale", self.locale.as_str())])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    "caption request timed out".to_string()
                } else {
                    format!("caption request failed: {}", e)
                }
            })?;

        if !response.status().is_success() {
            return Err(format!(
                "caption provider returned {}",
                response.status()
            ));
        }

        let parsed: CaptionResponse = response
            .json()
            .await
            .map_err(|e| format!("caption response unreadable: {}", e))?;

        if parsed.data.content.is_empty() {
            return Err("no captions available for this video".to_string());
        }

        Ok(parsed.data.content)
    }
}

impl TranscriptSource for CaptionClient {
    fn extract(&self, url: &str) -> impl Future<Output = String> + Send {
        async move {
            info!(url, "Extracting captions");

            match self.fetch(url).await {
                Ok(content) => {
                    info!(chars = content.chars().count(), "Caption extraction complete");
                    content
                }
                Err(reason) => {
                    warn!(url, reason, "Caption extraction failed");
                    format!("{} {}", CAPTION_ERROR_PREFIX, reason)
                }
            }
        }
    }
}
