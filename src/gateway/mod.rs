// LLM gateway - the one parametrized wrapper around the external
// text-generation and image-generation APIs. Callers supply the prompt,
// timeout, and output budget; the gateway guarantees "valid JSON object"
// or a typed error, never field-level shape.

use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::MockupImage;

/// Environment variable holding the API credential
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Timeout for the read-only connectivity probe
const PROBE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No API credential configured (set {0})")]
    CredentialMissing(String),

    #[error("The AI request timed out after {0} ms")]
    Timeout(u64),

    #[error("AI service error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("AI reply was not usable: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// Whether the failure was the per-call deadline expiring, as opposed
    /// to any other upstream problem. Both block the same way, but the UI
    /// wording differs.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout(_))
    }
}

/// Gateway configuration, resolved once at startup. The credential itself
/// is deliberately not cached: it is re-read from the environment on every
/// call so a missing key is a recoverable per-request condition.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Chat model used for all text generation calls
    pub model: String,
    /// Model used for mockup image generation
    pub image_model: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            image_model: "dall-e-3".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Build a config from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key_env: defaults.api_key_env,
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("DESIGN_INTAKE_MODEL").unwrap_or(defaults.model),
            image_model: std::env::var("DESIGN_INTAKE_IMAGE_MODEL").unwrap_or(defaults.image_model),
        }
    }
}

/// Client for the external model APIs
pub struct LlmGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl LlmGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Whether a credential is currently present in the environment
    pub fn key_set(&self) -> bool {
        self.api_key().is_ok()
    }

    fn api_key(&self) -> Result<String, GatewayError> {
        std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GatewayError::CredentialMissing(self.config.api_key_env.clone()))
    }

    /// Run one chat-completion call and parse a JSON object out of the
    /// reply text. The call is bounded by `timeout_ms`; expiry cancels the
    /// in-flight request and maps to `GatewayError::Timeout`.
    pub async fn call(
        &self,
        system_prompt: &str,
        user_content: &str,
        timeout_ms: u64,
        max_output_tokens: u32,
    ) -> Result<Value, GatewayError> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.config.base_url);

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content },
            ],
            "max_tokens": max_output_tokens,
            "temperature": 0.4,
        });

        // One deadline covers the request and the body read
        let reply: Value = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| GatewayError::Upstream {
                    status: 0,
                    message: format!("Request failed: {}", e),
                })?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                return Err(upstream_error(
                    status,
                    response.text().await.unwrap_or_default(),
                ));
            }

            response.json::<Value>().await.map_err(|e| {
                GatewayError::MalformedResponse(format!("Invalid response body: {}", e))
            })
        })
        .await
        .map_err(|_| GatewayError::Timeout(timeout_ms))??;

        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("");

        parse_json_reply(content)
    }

    /// Generate a mockup image. Accepts either an inline base64 payload or
    /// a remote URL from the API, whichever the model returns.
    pub async fn generate_image(
        &self,
        prompt: &str,
        timeout_ms: u64,
    ) -> Result<MockupImage, GatewayError> {
        let api_key = self.api_key()?;
        let url = format!("{}/images/generations", self.config.base_url);

        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
        });

        // One deadline covers the request and the body read
        let reply: Value = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| GatewayError::Upstream {
                    status: 0,
                    message: format!("Request failed: {}", e),
                })?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                return Err(upstream_error(
                    status,
                    response.text().await.unwrap_or_default(),
                ));
            }

            response.json::<Value>().await.map_err(|e| {
                GatewayError::MalformedResponse(format!("Invalid response body: {}", e))
            })
        })
        .await
        .map_err(|_| GatewayError::Timeout(timeout_ms))??;

        if let Some(b64) = reply["data"][0]["b64_json"].as_str() {
            return Ok(MockupImage::Inline(b64.to_string()));
        }
        if let Some(url) = reply["data"][0]["url"].as_str() {
            return Ok(MockupImage::Url(url.to_string()));
        }

        let upstream_message = reply["error"]["message"]
            .as_str()
            .unwrap_or("image payload missing from response")
            .to_string();
        Err(GatewayError::MalformedResponse(upstream_message))
    }

    /// Read-only connectivity probe: lists models with a short deadline.
    /// No side effects on the upstream account.
    pub async fn probe(&self) -> Result<(), GatewayError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models", self.config.base_url);

        tokio::time::timeout(Duration::from_millis(PROBE_TIMEOUT_MS), async {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&api_key)
                .send()
                .await
                .map_err(|e| GatewayError::Upstream {
                    status: 0,
                    message: format!("Request failed: {}", e),
                })?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                return Err(upstream_error(
                    status,
                    response.text().await.unwrap_or_default(),
                ));
            }

            Ok(())
        })
        .await
        .map_err(|_| GatewayError::Timeout(PROBE_TIMEOUT_MS))?
    }
}

fn upstream_error(status: u16, body: String) -> GatewayError {
    let message = match status {
        401 => "The AI credential was rejected (unauthorized). Check the API key.".to_string(),
        429 => "The AI service is rate limiting requests. Try again in a moment.".to_string(),
        _ => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unexpected AI service response".to_string()
            } else {
                trimmed.chars().take(300).collect()
            }
        }
    };
    GatewayError::Upstream { status, message }
}

/// Clean up a model reply by removing a markdown code fence wrapper
pub fn strip_code_fence(reply: &str) -> String {
    let trimmed = reply.trim();

    if trimmed.starts_with("```") {
        // Opening fence may carry a language specifier
        if let Some(first_newline) = trimmed.find('\n') {
            let after_opening = &trimmed[first_newline + 1..];
            if let Some(closing_pos) = after_opening.rfind("```") {
                return after_opening[..closing_pos].trim().to_string();
            }
            return after_opening.trim().to_string();
        }
    }

    trimmed.to_string()
}

/// Parse a JSON object out of free-form reply text. Guarantees only
/// "valid JSON object" - callers do their own field-level coercion.
pub fn parse_json_reply(reply: &str) -> Result<Value, GatewayError> {
    let cleaned = strip_code_fence(reply);

    if cleaned.is_empty() {
        return Err(GatewayError::MalformedResponse(
            "AI reply was empty".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| GatewayError::MalformedResponse(format!("AI reply was not JSON: {}", e)))?;

    if !value.is_object() {
        return Err(GatewayError::MalformedResponse(
            "AI reply was JSON but not an object".to_string(),
        ));
    }

    Ok(value)
}
