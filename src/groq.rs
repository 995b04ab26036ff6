//! Groq chat-completion client.
//!
//! Thin wrapper over the OpenAI-compatible `/chat/completions` endpoint:
//! role-tagged messages, a temperature and a max-token bound go in, trimmed
//! text comes out. No retries; provider errors propagate to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::GroqConfig;

#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Trimmed text of the first choice; empty when the provider sent none.
    pub fn first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

impl GroqClient {
    /// Fails with a configuration error when no API key is set — checked
    /// before any network call is attempted.
    pub fn new(config: &GroqConfig) -> Result<Self, String> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| "GROQ_API_KEY não definida. Exporte a variável de ambiente.".to_string())?;

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One blocking round trip to the completion endpoint.
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_message: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message },
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Groq request: model={} max_tokens={max_tokens}", self.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("falha na chamada à API Groq: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(format!("Groq API {status}: {detail}"));
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| format!("resposta Groq inválida: {e}"))?;

        Ok(data.first_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_content_trims_first_choice() {
        let raw = r#"{"choices":[{"message":{"content":"  Silêncio e deserto.  "}}]}"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_content(), "Silêncio e deserto.");
    }

    #[test]
    fn missing_content_yields_empty_string() {
        let resp: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(resp.first_content(), "");

        let resp: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(resp.first_content(), "");
    }

    #[test]
    fn new_requires_api_key() {
        let config = GroqConfig::default();
        assert!(GroqClient::new(&config).is_err());
    }
}
