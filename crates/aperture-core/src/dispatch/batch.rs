//! Batch orchestration: one shared prompt over N image references.
//!
//! Each reference becomes an independent single-image dispatch. Items run
//! concurrently through an order-preserving buffered stream, so one item's
//! failure never cancels or delays its siblings and the result sequence
//! always matches the input sequence position for position. Dropping the
//! batch future abandons whatever is still in flight — a disconnected
//! caller gets no partial delivery and starts no further items.

use super::dispatcher::Dispatcher;
use crate::error::BridgeResult;
use crate::types::{AnalyzeRequest, BatchItemResult, BatchOutcome, ItemError};
use futures_util::stream::{self, StreamExt};

/// Tuning for batch runs.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum concurrent in-flight dispatches
    pub parallel: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { parallel: 4 }
    }
}

/// Applies the dispatcher to every item of a batch.
#[derive(Clone)]
pub struct BatchOrchestrator {
    dispatcher: Dispatcher,
    options: BatchOptions,
}

impl BatchOrchestrator {
    pub fn new(dispatcher: Dispatcher, options: BatchOptions) -> Self {
        Self {
            dispatcher,
            options,
        }
    }

    /// Run the batch. Returns one result per input reference, in input
    /// order. Per-item failures become `Failure` outcomes; the only way
    /// the whole batch errors is a problem with the batch itself — an
    /// unknown provider name, caught before any item is attempted.
    pub async fn run(&self, request: &AnalyzeRequest) -> BridgeResult<Vec<BatchItemResult>> {
        self.dispatcher
            .resolver()
            .resolve(request.provider.as_deref(), request.model.as_deref())?;

        let parallel = self.options.parallel.max(1);
        let results = stream::iter(request.images.iter().cloned().map(|image| {
            let item = AnalyzeRequest {
                prompt: request.prompt.clone(),
                images: vec![image.clone()],
                provider: request.provider.clone(),
                model: request.model.clone(),
                temperature: request.temperature,
            };
            let source = image;
            async move {
                match self.dispatcher.dispatch_analyze(&item).await {
                    Ok(response) => BatchItemResult {
                        source,
                        outcome: BatchOutcome::Success(response),
                    },
                    Err(e) => {
                        tracing::warn!("Batch item failed: {e}");
                        BatchItemResult {
                            source,
                            outcome: BatchOutcome::Failure(ItemError {
                                kind: e.kind(),
                                message: e.to_string(),
                            }),
                        }
                    }
                }
            }
        }))
        .buffered(parallel)
        .collect::<Vec<_>>()
        .await;

        Ok(results)
    }
}
