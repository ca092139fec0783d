//! Model Client - OpenAI-compatible chat completions over HTTP
//!
//! Used by the optional model tier of the classifier and by the flood
//! advice chat. Nothing here is required for the pipeline to work: every
//! caller has a deterministic fallback.

use crate::config::ClassifierConfig;
use crate::error::FloodError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One turn of a conversation sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "model"
    pub role: String,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: &str) -> Self {
        Self { role: "user".to_string(), text: text.to_string() }
    }

    pub fn model(text: &str) -> Self {
        Self { role: "model".to_string(), text: text.to_string() }
    }

    fn openai_role(&self) -> &'static str {
        match self.role.as_str() {
            "model" | "assistant" => "assistant",
            _ => "user",
        }
    }
}

/// Slice the JSON object out of a model answer.
///
/// Models often wrap the object in a markdown fence or a sentence of prose
/// even in JSON mode.
pub fn extract_json(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text.trim(),
    }
}

/// HTTP client for the external model
pub struct ModelClient {
    config: ClassifierConfig,
    http: reqwest::Client,
}

impl ModelClient {
    pub fn new(config: ClassifierConfig) -> Result<Self, FloodError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FloodError::Model(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.config.timeout_secs
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.endpoint.is_empty()
    }

    /// Ask for a JSON object answer and parse it
    pub async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<serde_json::Value, FloodError> {
        let text = self
            .chat(system_prompt, &[ChatTurn::user(user_prompt)], true)
            .await?;

        serde_json::from_str(extract_json(&text))
            .map_err(|e| FloodError::Model(format!("Model output is not valid JSON: {}", e)))
    }

    /// Free-text answer to a conversation
    pub async fn complete_text(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
    ) -> Result<String, FloodError> {
        self.chat(system_prompt, turns, false).await
    }

    async fn chat(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
        json_mode: bool,
    ) -> Result<String, FloodError> {
        if !self.is_enabled() {
            return Err(FloodError::Model("model tier is disabled".to_string()));
        }

        let url = format!("{}/v1/chat/completions", self.config.endpoint.trim_end_matches('/'));

        let mut messages = vec![serde_json::json!({"role": "system", "content": system_prompt})];
        messages.extend(
            turns
                .iter()
                .map(|t| serde_json::json!({"role": t.openai_role(), "content": t.text})),
        );

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
        });
        if json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        debug!("Calling model {} at {}", self.config.model, url);
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FloodError::Timeout(self.config.timeout_secs)
            } else {
                FloodError::Model(format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(FloodError::Model(format!("HTTP {} from model endpoint", response.status())));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FloodError::Model(format!("Failed to parse response: {}", e)))?;

        let content = response_json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::trim)
            .unwrap_or("");

        if content.is_empty() {
            return Err(FloodError::Model("model returned an empty response".to_string()));
        }

        Ok(content.to_string())
    }
}
