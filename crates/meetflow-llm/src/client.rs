//! Shared HTTP client wrapper, patterned on `xchecker-llm`'s backend
//! structs: one `reqwest::Client`, `Bearer` auth applied when an API key is
//! configured, timeout set per request.

use meetflow_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Thin wrapper over a shared `reqwest::Client` targeting an
/// OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_url: String,
    model_name: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl LlmClient {
    #[must_use]
    pub fn new(api_url: String, model_name: String, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            model_name,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> AppResult<String> {
        let url = format!("{}/v1/chat/completions", self.api_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: self.model_name.clone(),
            temperature,
            max_tokens,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt.to_string() },
                ChatMessage { role: "user", content: user_prompt.to_string() },
            ],
        };

        let mut request = self.http.post(&url).timeout(self.timeout).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "LLM request failed");
            AppError::ExternalDependencyFailure("summary service temporarily unavailable".to_string())
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalDependencyFailure(
                "summary service temporarily unavailable".to_string(),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse LLM response");
            AppError::ExternalDependencyFailure("summary service temporarily unavailable".to_string())
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| {
                AppError::ExternalDependencyFailure("summary service returned no content".to_string())
            })?;

        Ok(content)
    }
}
