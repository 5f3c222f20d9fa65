// LLM Provider Service
// Local Ollama text generation behind a small generator trait

use crate::services::config_store::LlmConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("Ollama request failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ProviderError>,
    },
}

/// Anything that turns a prompt into raw model text.
pub trait TextGenerator {
    fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
    retry_backoff: Duration,
}

impl OllamaClient {
    /// `model` overrides the configured default model.
    pub fn new(config: &LlmConfig, model: Option<&str>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&config.model)
            .to_string();

        Self {
            client,
            endpoint: format!("{}/api/generate", config.host.trim_end_matches('/')),
            model,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_once(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
            },
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        Ok(data.response.unwrap_or_default())
    }
}

impl TextGenerator for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ProviderError> {
        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let mut last_err: Option<ProviderError> = None;

        for attempt in 1..=self.max_retries {
            let start = Instant::now();
            let res = tokio::time::timeout(
                timeout_duration,
                self.generate_once(prompt, max_tokens, temperature),
            )
            .await;

            match res {
                Ok(Ok(text)) => {
                    info!(
                        "[OLLAMA] ok model={} attempt={} latency_ms={} chars={}",
                        self.model,
                        attempt,
                        start.elapsed().as_millis(),
                        text.len()
                    );
                    return Ok(text);
                }
                Ok(Err(e)) => {
                    warn!("[OLLAMA] error model={} attempt={} : {}", self.model, attempt, e);
                    last_err = Some(e);
                }
                Err(_) => {
                    warn!(
                        "[OLLAMA] timeout model={} attempt={} ({}s)",
                        self.model, attempt, self.timeout_secs
                    );
                    last_err = Some(ProviderError::Timeout(self.timeout_secs));
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(self.retry_backoff).await;
            }
        }

        Err(ProviderError::RetriesExhausted {
            attempts: self.max_retries,
            last: Box::new(last_err.unwrap_or(ProviderError::Timeout(self.timeout_secs))),
        })
    }
}
