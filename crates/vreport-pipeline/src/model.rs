//! Generative model client.
//!
//! Single-turn request/response against the Gemini `generateContent`
//! endpoint: system instructions plus user content in, free-form text
//! out. Structured extraction from that text lives in
//! [`crate::json_extract`].

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::retry::{retry_async, RetryConfig};

/// Seam for the generative model. Stage code is generic over this so
/// tests can script replies without a network.
pub trait GenerativeModel: Send + Sync {
    /// One model turn: system instructions + user content → reply text.
    fn generate(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = PipelineResult<String>> + Send;
}

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client.
#[derive(Debug)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    http: Client,
    retry: RetryConfig,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    /// Create a client from pipeline configuration.
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        if config.gemini_api_key.is_empty() {
            return Err(PipelineError::config("GEMINI_API_KEY not set"));
        }

        let http = Client::builder()
            .timeout(config.model_timeout)
            .build()
            .map_err(|e| PipelineError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            http,
            retry: RetryConfig::new("gemini_generate")
                .with_max_retries(config.model_max_retries)
                .with_base_delay(config.model_retry_base_delay),
        })
    }

    /// Point the client at a different endpoint base.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call_api(&self, system: &str, user: &str) -> PipelineResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: user.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 4096,
            },
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::transport(format!("model request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::transport(format!(
                "model endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            PipelineError::transport(format!("failed to read model response: {}", e))
        })?;

        parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| PipelineError::contract("no content in model response"))
    }
}

impl GenerativeModel for GeminiClient {
    fn generate(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = PipelineResult<String>> + Send {
        async move {
            retry_async(&self.retry, PipelineError::is_retryable, || {
                self.call_api(system, user)
            })
            .await
        }
    }
}
