// src/model/mod.rs

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model response contained no content")]
    EmptyResponse,
}

/// A text-completion backend. Both the planner and the calculator chain talk to one.
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt`, cutting generation at the first of `stop`.
    fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, ModelError>;
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiChatModel {
    client: reqwest::blocking::Client,
    api_key: String,
    pub model: String,
    pub temperature: f32,
    base_url: String,
}

impl OpenAiChatModel {
    pub fn new(
        api_key: &str,
        model: &str,
        temperature: f32,
        base_url: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LanguageModel for OpenAiChatModel {
    fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
        });
        if !stop.is_empty() {
            payload["stop"] = json!(stop);
        }

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json()?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}
