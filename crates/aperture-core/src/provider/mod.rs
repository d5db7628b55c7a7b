//! Provider abstraction over the two supported LLM backends.
//!
//! LM Studio speaks the OpenAI chat-completions dialect and embeds images
//! as structured message parts; Ollama's native REST API takes images as a
//! separate base64 array on the message. That divergence lives entirely
//! inside the two client implementations — callers dispatch through
//! `dyn ProviderClient` and never branch on provider kind.

pub(crate) mod lmstudio;
pub(crate) mod ollama;
pub(crate) mod registry;

pub use lmstudio::LmStudioClient;
pub use ollama::OllamaClient;
pub use registry::{ClientResolver, ProviderRegistry};

use crate::error::{BridgeError, BridgeResult};
use crate::image::ResolvedImage;
use crate::types::{ChatMessage, ProviderResponse};
use async_trait::async_trait;
use std::time::Duration;

/// One configured backend client.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the registry hands out `Box<dyn ProviderClient>`).
#[async_trait]
pub trait ProviderClient: Send + Sync + std::fmt::Debug {
    /// Provider name for logging and error context ("lmstudio", "ollama").
    fn name(&self) -> &str;

    /// Model this client was configured with (default or per-request override).
    fn model(&self) -> &str;

    /// Per-request timeout configured for this provider.
    fn timeout(&self) -> Duration;

    /// Run one completion: an ordered message sequence plus zero or more
    /// already-resolved images. Returns the backend's reply uninterpreted.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        images: &[ResolvedImage],
        temperature: f32,
    ) -> BridgeResult<ProviderResponse>;
}

/// POST a JSON body and decode the reply as opaque JSON, mapping transport
/// and protocol failures into the bridge taxonomy. Shared by both clients.
pub(crate) async fn post_json(
    http: &reqwest::Client,
    provider: &str,
    url: &str,
    api_key: Option<&str>,
    body: &serde_json::Value,
    timeout: Duration,
) -> BridgeResult<serde_json::Value> {
    let mut request = http.post(url).json(body).timeout(timeout);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            BridgeError::BackendTimeout {
                provider: provider.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            BridgeError::BackendUnreachable {
                provider: provider.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        tracing::error!("{provider} returned HTTP {status}: {detail}");
        return Err(BridgeError::BackendProtocol {
            provider: provider.to_string(),
            status_code: Some(status.as_u16()),
            message: format!("HTTP {status}: {detail}"),
        });
    }

    response.json().await.map_err(|e| {
        if e.is_timeout() {
            BridgeError::BackendTimeout {
                provider: provider.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            BridgeError::BackendProtocol {
                provider: provider.to_string(),
                status_code: Some(status.as_u16()),
                message: format!("response body is not valid JSON: {e}"),
            }
        }
    })
}
