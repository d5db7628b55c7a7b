//! Ollama client, speaking the native `/api/chat` REST API.
//!
//! No authentication — just needs Ollama running locally. Images travel as
//! an `images` array of raw base64 strings on the user message, without
//! any data-URL framing.

use super::{post_json, ProviderClient};
use crate::config::ProviderSettings;
use crate::error::BridgeResult;
use crate::image::ResolvedImage;
use crate::types::{ChatMessage, ProviderResponse, Role};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(settings: &ProviderSettings, model: &str) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout: settings.timeout(),
            http: reqwest::Client::new(),
        }
    }

    /// Assemble the `/api/chat` request body. Images attach to the final
    /// message; `stream` is always off — the bridge returns one reply.
    fn build_body(&self, messages: &[ChatMessage], images: &[ResolvedImage]) -> serde_json::Value {
        let mut wire: Vec<WireMessage> = messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
                images: Vec::new(),
            })
            .collect();

        if !images.is_empty() {
            let encoded: Vec<String> = images.iter().map(|i| i.data.clone()).collect();
            match wire.last_mut() {
                Some(message) => message.images = encoded,
                None => wire.push(WireMessage {
                    role: Role::User,
                    content: String::new(),
                    images: encoded,
                }),
            }
        }

        serde_json::json!({
            "model": self.model,
            "messages": wire,
            "stream": false,
        })
    }
}

#[derive(Serialize)]
struct WireMessage {
    role: Role,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[async_trait]
impl ProviderClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        images: &[ResolvedImage],
        _temperature: f32,
    ) -> BridgeResult<ProviderResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_body(messages, images);
        tracing::debug!(model = %self.model, images = images.len(), "Calling Ollama");

        let raw = post_json(&self.http, self.name(), &url, None, &body, self.timeout).await?;

        Ok(ProviderResponse {
            provider: self.name().to_string(),
            raw,
        })
    }
}
