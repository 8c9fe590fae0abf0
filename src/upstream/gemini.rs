use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use super::types::{Content, ContentPart, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const TEMPERATURE: f32 = 0.9;
const MAX_OUTPUT_TOKENS: u32 = 1000;
const MAX_RETRIES: u32 = 1;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned no text")]
    EmptyResponse,
}

/// Minimal client for the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            base_url: GEMINI_API_BASE.into(),
            model: DEFAULT_GEMINI_MODEL.into(),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generate text for `user_input` under `system_prompt`. One retry on failure.
    pub async fn generate(&self, system_prompt: &str, user_input: &str) -> Result<String, GeminiError> {
        let mut attempt = 0;
        loop {
            match self.generate_once(system_prompt, user_input).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < MAX_RETRIES => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, model = %self.model, "Gemini call failed, retrying");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn generate_once(&self, system_prompt: &str, user_input: &str) -> Result<String, GeminiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![ContentPart { text: system_prompt.to_string() }],
            },
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![ContentPart { text: user_input.to_string() }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: GenerateContentResponse = resp.json().await?;
        parsed.first_text().ok_or(GeminiError::EmptyResponse)
    }
}
