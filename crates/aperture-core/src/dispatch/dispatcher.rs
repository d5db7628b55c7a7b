//! Single-request dispatch.
//!
//! One dispatch is: resolve every image reference, resolve the provider
//! client, make the outbound call. Image resolution completes fully before
//! anything goes on the wire — a request with any malformed or unreadable
//! reference never reaches a backend. Timeout enforcement is centralized
//! here so both provider variants surface the same `BackendTimeout`.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::image::{resolve_image, ResolvedImage};
use crate::provider::{ClientResolver, ProviderClient, ProviderRegistry};
use crate::types::{AnalyzeRequest, ChatMessage, ChatRequest, ProviderResponse};
use std::sync::Arc;

/// Executes logical requests against the configured providers.
#[derive(Clone)]
pub struct Dispatcher {
    resolver: Arc<dyn ClientResolver>,
}

impl Dispatcher {
    /// Dispatcher backed by the standard provider registry.
    pub fn new(config: Arc<BridgeConfig>) -> Self {
        Self::with_resolver(Arc::new(ProviderRegistry::new(config)))
    }

    /// Dispatcher with a custom client resolver (tests, embedding).
    pub fn with_resolver(resolver: Arc<dyn ClientResolver>) -> Self {
        Self { resolver }
    }

    pub(crate) fn resolver(&self) -> &dyn ClientResolver {
        &*self.resolver
    }

    /// Plain chat: arbitrary-length message sequence, no images.
    pub async fn dispatch_chat(&self, request: &ChatRequest) -> BridgeResult<ProviderResponse> {
        let client = self
            .resolver
            .resolve(request.provider.as_deref(), request.model.as_deref())?;
        complete_with_timeout(&*client, &request.messages, &[], request.temperature).await
    }

    /// Vision analysis: one prompt over one or more images.
    pub async fn dispatch_analyze(
        &self,
        request: &AnalyzeRequest,
    ) -> BridgeResult<ProviderResponse> {
        // Resolve every reference, in order, before any outbound call.
        // The first failure aborts the whole dispatch.
        let mut images = Vec::with_capacity(request.images.len());
        for reference in &request.images {
            images.push(resolve_image(reference).await?);
        }

        let client = self
            .resolver
            .resolve(request.provider.as_deref(), request.model.as_deref())?;
        let messages = vec![ChatMessage::user(request.prompt.clone())];
        complete_with_timeout(&*client, &messages, &images, request.temperature).await
    }
}

/// Bound the outbound call by the resolved provider's configured timeout.
async fn complete_with_timeout(
    client: &dyn ProviderClient,
    messages: &[ChatMessage],
    images: &[ResolvedImage],
    temperature: f32,
) -> BridgeResult<ProviderResponse> {
    let timeout = client.timeout();
    match tokio::time::timeout(timeout, client.complete(messages, images, temperature)).await {
        Ok(result) => result,
        Err(_) => Err(BridgeError::BackendTimeout {
            provider: client.name().to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
