//! Mock provider clients for dispatch tests.

use crate::error::{BridgeError, BridgeResult};
use crate::image::ResolvedImage;
use crate::provider::{ClientResolver, ProviderClient};
use crate::types::{ChatMessage, ProviderResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configurable in-memory backend. Counters are shared across clones so
/// tests can assert on them after the dispatcher consumed the client.
#[derive(Clone, Debug)]
pub(crate) struct MockClient {
    timeout: Duration,
    delay: Duration,
    /// Per-image-payload delays, keyed by the resolved base64 data. Lets a
    /// test slow individual batch items down independently.
    payload_delays: Arc<HashMap<String, Duration>>,
    fail: bool,
    pub(crate) calls: Arc<AtomicU32>,
    /// Image count seen by the most recent call.
    pub(crate) images_seen: Arc<AtomicU32>,
}

impl MockClient {
    pub(crate) fn new() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            delay: Duration::ZERO,
            payload_delays: Arc::new(HashMap::new()),
            fail: false,
            calls: Arc::new(AtomicU32::new(0)),
            images_seen: Arc::new(AtomicU32::new(0)),
        }
    }

    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn with_payload_delays(mut self, delays: HashMap<String, Duration>) -> Self {
        self.payload_delays = Arc::new(delays);
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl ProviderClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-v1"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn complete(
        &self,
        _messages: &[ChatMessage],
        images: &[ResolvedImage],
        _temperature: f32,
    ) -> BridgeResult<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images_seen.store(images.len() as u32, Ordering::SeqCst);

        let delay = images
            .first()
            .and_then(|image| self.payload_delays.get(&image.data).copied())
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(BridgeError::BackendProtocol {
                provider: self.name().to_string(),
                status_code: Some(500),
                message: "mock backend failure".to_string(),
            });
        }

        Ok(ProviderResponse {
            provider: self.name().to_string(),
            raw: serde_json::json!({
                "message": { "content": "described" },
                "images": images.len(),
            }),
        })
    }
}

/// Resolver that always hands out clones of one mock client, rejecting
/// provider names the real registry would reject.
pub(crate) struct MockResolver {
    client: MockClient,
    pub(crate) resolve_calls: Arc<AtomicU32>,
}

impl MockResolver {
    pub(crate) fn new(client: MockClient) -> Self {
        Self {
            client,
            resolve_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Handle to the shared client for post-hoc assertions.
    pub(crate) fn client(&self) -> MockClient {
        self.client.clone()
    }
}

impl ClientResolver for MockResolver {
    fn resolve(
        &self,
        provider: Option<&str>,
        _model_override: Option<&str>,
    ) -> BridgeResult<Box<dyn ProviderClient>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        match provider {
            None | Some("mock") | Some("lmstudio") | Some("ollama") => {
                Ok(Box::new(self.client.clone()))
            }
            Some(other) => Err(BridgeError::UnknownProvider {
                name: other.to_string(),
            }),
        }
    }
}
