//! LM Studio client, speaking the OpenAI-compatible chat-completions API.
//!
//! Images ride inside the final user message as a part array of
//! `input_text` / `input_image` entries, with each image rendered as a
//! base64 data URL.

use super::{post_json, ProviderClient};
use crate::config::ProviderSettings;
use crate::error::BridgeResult;
use crate::image::ResolvedImage;
use crate::types::{ChatMessage, ProviderResponse, Role};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug)]
pub struct LmStudioClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl LmStudioClient {
    pub fn new(settings: &ProviderSettings, model: &str) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: model.to_string(),
            timeout: settings.timeout(),
            http: reqwest::Client::new(),
        }
    }

    /// Assemble the chat-completions request body.
    ///
    /// With no images every message keeps plain string content — a pure
    /// chat call carries no image fields at all. With images, the final
    /// message's content becomes a part array carrying its text plus one
    /// `input_image` part per image.
    fn build_body(
        &self,
        messages: &[ChatMessage],
        images: &[ResolvedImage],
        temperature: f32,
    ) -> serde_json::Value {
        let mut wire: Vec<WireMessage> = messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: WireContent::Text(m.content.clone()),
            })
            .collect();

        if !images.is_empty() {
            let (role, text) = match wire.pop() {
                Some(message) => match message.content {
                    WireContent::Text(text) => (message.role, text),
                    WireContent::Parts(_) => unreachable!("messages start as plain text"),
                },
                None => (Role::User, String::new()),
            };
            let mut parts = vec![ContentPart::Text { text }];
            parts.extend(images.iter().map(|image| ContentPart::Image {
                image: image.data_url(),
            }));
            wire.push(WireMessage {
                role,
                content: WireContent::Parts(parts),
            });
        }

        serde_json::json!({
            "model": self.model,
            "messages": wire,
            "temperature": temperature,
        })
    }
}

#[derive(Serialize)]
struct WireMessage {
    role: Role,
    content: WireContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "input_text")]
    Text { text: String },
    #[serde(rename = "input_image")]
    Image { image: String },
}

#[async_trait]
impl ProviderClient for LmStudioClient {
    fn name(&self) -> &str {
        "lmstudio"
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
        temperature: f32,
    ) -> BridgeResult<ProviderResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_body(messages, images, temperature);
        tracing::debug!(model = %self.model, images = images.len(), "Calling LM Studio");

        let raw = post_json(
            &self.http,
            self.name(),
            &url,
            self.api_key.as_deref(),
            &body,
            self.timeout,
        )
        .await?;

        Ok(ProviderResponse {
            provider: self.name().to_string(),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LmStudioClient {
        LmStudioClient::new(&ProviderSettings::default(), "test-model")
    }

    fn image(media_type: &str) -> ResolvedImage {
        ResolvedImage {
            data: "aGVsbG8=".to_string(),
            media_type: media_type.to_string(),
        }
    }

    #[test]
    fn test_chat_body_has_no_image_fields() {
        let messages = vec![
            ChatMessage {
                role: Role::System,
                content: "You are a photo assistant.".to_string(),
            },
            ChatMessage::user("What lens should I use?"),
        ];
        let body = client().build_body(&messages, &[], 0.2);

        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        // Plain string content end to end, no part arrays
        assert_eq!(body["messages"][1]["content"], "What lens should I use?");
        assert!(body.to_string().find("input_image").is_none());
    }

    #[test]
    fn test_vision_body_embeds_images_as_parts() {
        let messages = vec![ChatMessage::user("Describe the image")];
        let images = vec![image("image/jpeg"), image("image/png")];
        let body = client().build_body(&messages, &images, 0.2);

        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "input_text");
        assert_eq!(content[0]["text"], "Describe the image");
        assert_eq!(content[1]["type"], "input_image");
        assert_eq!(content[1]["image"], "data:image/jpeg;base64,aGVsbG8=");
        assert_eq!(content[2]["image"], "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_vision_parts_keep_final_message_role() {
        let messages = vec![
            ChatMessage {
                role: Role::System,
                content: "Critique the composition.".to_string(),
            },
            ChatMessage {
                role: Role::Assistant,
                content: "Here is my critique so far.".to_string(),
            },
        ];
        let body = client().build_body(&messages, &[image("image/png")], 0.2);

        // The part array replaces the final message in place, keeping
        // whatever role that message carried.
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][1]["content"][0]["type"], "input_text");
        assert_eq!(body["messages"][1]["content"][1]["type"], "input_image");
    }

    #[test]
    fn test_image_order_preserved() {
        let messages = vec![ChatMessage::user("compare")];
        let images = vec![image("image/png"), image("image/webp"), image("image/gif")];
        let body = client().build_body(&messages, &images, 0.2);

        let content = body["messages"][0]["content"].as_array().unwrap();
        let urls: Vec<&str> = content[1..]
            .iter()
            .map(|part| part["image"].as_str().unwrap())
            .collect();
        assert!(urls[0].starts_with("data:image/png"));
        assert!(urls[1].starts_with("data:image/webp"));
        assert!(urls[2].starts_with("data:image/gif"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let settings = ProviderSettings {
            base_url: "http://localhost:1234/".to_string(),
            ..ProviderSettings::default()
        };
        let client = LmStudioClient::new(&settings, "m");
        assert_eq!(client.base_url, "http://localhost:1234");
    }
}
