//! Azure OpenAI chat-completions backend for the [`TextGenerator`] trait.

use std::env;

use async_trait::async_trait;
use serde_json::json;

use crate::contract::{GenerateError, TextGenerator};

/// Default API version used when `AZURE_OPENAI_API_VERSION` is not set.
const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

pub struct AzureOpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
}

impl AzureOpenAiClient {
    /// Construct from `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY` and
    /// `AZURE_OPENAI_DEPLOYMENT`, with an optional
    /// `AZURE_OPENAI_API_VERSION` override.
    pub fn new_from_env() -> Result<Self, GenerateError> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        match (
            env::var("AZURE_OPENAI_ENDPOINT"),
            env::var("AZURE_OPENAI_API_KEY"),
            env::var("AZURE_OPENAI_DEPLOYMENT"),
        ) {
            (Ok(endpoint), Ok(api_key), Ok(deployment)) => {
                let api_version = env::var("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());
                tracing::info!(
                    endpoint = %endpoint,
                    deployment = %deployment,
                    api_version = %api_version,
                    api_key_set = api_key.len() > 0,
                    "Initialized Azure OpenAI client from environment"
                );
                Ok(AzureOpenAiClient {
                    http: reqwest::Client::new(),
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    deployment,
                    api_version,
                    api_key,
                })
            }
            (Err(e), _, _) => {
                tracing::error!(error = ?e, "AZURE_OPENAI_ENDPOINT missing in environment");
                Err(Box::new(e))
            }
            (_, Err(e), _) => {
                tracing::error!(error = ?e, "AZURE_OPENAI_API_KEY missing in environment");
                Err(Box::new(e))
            }
            (_, _, Err(e)) => {
                tracing::error!(error = ?e, "AZURE_OPENAI_DEPLOYMENT missing in environment");
                Err(Box::new(e))
            }
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl TextGenerator for AzureOpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        tracing::debug!(prompt_chars = prompt.len(), "Sending chat completion request");
        let body = json!({
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.2,
        });
        let response = self
            .http
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, detail = %detail, "Chat completion request failed");
            return Err(format!("chat completion failed with status {status}: {detail}").into());
        }

        let payload: serde_json::Value = response.json().await?;
        match payload["choices"][0]["message"]["content"].as_str() {
            Some(text) => Ok(text.to_string()),
            None => {
                tracing::error!(payload = %payload, "Chat completion response had no message content");
                Err("chat completion response had no message content".into())
            }
        }
    }
}
