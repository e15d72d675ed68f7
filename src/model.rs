//! The generative-model seam: a trait for the black-box service and a
//! reqwest-backed default implementation.
//!
//! The pipeline never talks to a model vendor directly — it hands a
//! [`ModelRequest`] to whatever [`GenerativeModel`] the configuration
//! resolved. Tests inject a fake; production uses [`HttpModel`], which
//! speaks the OpenAI-compatible chat-completions wire format that OpenAI,
//! Gemini, and most self-hosted gateways all expose.
//!
//! ## Schema-constrained generation
//!
//! Every request carries `response_format: {type: "json_schema", ...}` with
//! the steps schema from [`crate::prompts::steps_schema`]. The endpoint is
//! thereby contractually obliged to return text that parses as
//! `{"steps": [...]}` — the mechanism that turns free-form generation into
//! a machine-parseable result. Parsing (and parse failure) is still handled
//! downstream in [`crate::pipeline::synthesize`]; this module only moves
//! bytes.

use crate::config::GuideConfig;
use crate::error::GuideError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One synthesis request, fully assembled by the caller.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// JSON schema the response text must conform to.
    pub response_schema: Value,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A black-box generative service: prompt + schema in, raw text out.
///
/// Exactly one call per pipeline invocation; no retries happen at this seam
/// or above it — a transient model failure is immediately fatal to the run.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<String, GuideError>;
}

/// Resolve the model to use, from most-specific to least-specific:
/// a pre-built override wins; otherwise an [`HttpModel`] is constructed from
/// the endpoint/credential fields (failing with
/// [`GuideError::MissingApiKey`] when no credential was injected).
pub fn resolve_model(config: &GuideConfig) -> Result<Arc<dyn GenerativeModel>, GuideError> {
    if let Some(ref model) = config.model_override {
        return Ok(Arc::clone(model));
    }
    Ok(Arc::new(HttpModel::from_config(config)?))
}

/// Default model client for OpenAI-compatible chat-completions endpoints.
pub struct HttpModel {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpModel {
    /// Build a client from the endpoint/credential fields of the config.
    pub fn from_config(config: &GuideConfig) -> Result<Self, GuideError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GuideError::MissingApiKey)?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| GuideError::ModelCall {
                detail: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(HttpModel {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl GenerativeModel for HttpModel {
    async fn generate(&self, request: &ModelRequest) -> Result<String, GuideError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "guide_steps",
                    "strict": true,
                    "schema": request.response_schema,
                },
            },
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| GuideError::ModelCall {
                detail: format!("request to {} failed: {e}", self.api_url),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GuideError::ModelCall {
                detail: format!("HTTP {status}: {}", truncate(&text, 300)),
            });
        }

        let payload: Value = response.json().await.map_err(|e| GuideError::ModelCall {
            detail: format!("invalid JSON envelope: {e}"),
        })?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| GuideError::ModelCall {
                detail: format!(
                    "response carried no message content: {}",
                    truncate(&payload.to_string(), 300)
                ),
            })?;

        debug!(chars = content.len(), model = %self.model, "model response received");
        Ok(content.to_string())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
