//! Aperture Core - provider abstraction for a local LLM bridge.
//!
//! Aperture sits between a photo editor and two interchangeable local LLM
//! backends — LM Studio (OpenAI-compatible) and Ollama (native REST) — and
//! hides their wire-format differences behind one request surface.
//!
//! # Architecture
//!
//! ```text
//! AnalyzeRequest → resolve images → registry → provider client → response
//!                  (all-or-nothing)             (LM Studio | Ollama)
//! ```
//!
//! The core is stateless between requests: configuration is an immutable
//! snapshot shared by reference, clients are built fresh per request, and
//! resolved image payloads die with the request that created them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aperture_core::{BatchOptions, BatchOrchestrator, BridgeConfig, Dispatcher};
//! use std::sync::Arc;
//!
//! let config = Arc::new(BridgeConfig::load(None)?);
//! let dispatcher = Dispatcher::new(config);
//! let batch = BatchOrchestrator::new(dispatcher.clone(), BatchOptions::default());
//! ```

// Module declarations
pub mod config;
pub mod dispatch;
pub mod error;
pub mod image;
pub mod provider;
pub mod types;

// Re-exports for convenient access
pub use config::{BridgeConfig, LoggingConfig, ProviderSettings};
pub use dispatch::{BatchOptions, BatchOrchestrator, Dispatcher};
pub use error::{BridgeError, BridgeResult, ConfigError, ErrorKind};
pub use image::{resolve_image, ResolvedImage};
pub use provider::{ClientResolver, ProviderClient, ProviderRegistry};
pub use types::{
    AnalyzeRequest, BatchItemResult, BatchOutcome, ChatMessage, ChatRequest, ImageReference,
    ItemError, ProviderResponse, Role,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
