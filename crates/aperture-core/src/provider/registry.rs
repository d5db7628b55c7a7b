//! Provider name resolution.
//!
//! Maps a logical provider name plus optional per-request model override to
//! a freshly configured client. Every call builds a new client from the
//! startup config snapshot, so no client state is shared across requests.

use super::{LmStudioClient, OllamaClient, ProviderClient};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use std::sync::Arc;

/// Seam between dispatch and client construction. Production code uses
/// `ProviderRegistry`; tests substitute mock clients through this trait.
pub trait ClientResolver: Send + Sync {
    fn resolve(
        &self,
        provider: Option<&str>,
        model_override: Option<&str>,
    ) -> BridgeResult<Box<dyn ProviderClient>>;
}

/// Registry over the two recognized provider kinds.
pub struct ProviderRegistry {
    config: Arc<BridgeConfig>,
}

impl ProviderRegistry {
    pub fn new(config: Arc<BridgeConfig>) -> Self {
        Self { config }
    }
}

impl ClientResolver for ProviderRegistry {
    fn resolve(
        &self,
        provider: Option<&str>,
        model_override: Option<&str>,
    ) -> BridgeResult<Box<dyn ProviderClient>> {
        let name = provider
            .unwrap_or(&self.config.default_provider)
            .to_ascii_lowercase();
        match name.as_str() {
            "lmstudio" => {
                let settings = &self.config.lmstudio;
                let model = model_override.unwrap_or(&settings.model);
                Ok(Box::new(LmStudioClient::new(settings, model)))
            }
            "ollama" => {
                let settings = &self.config.ollama;
                let model = model_override.unwrap_or(&settings.model);
                Ok(Box::new(OllamaClient::new(settings, model)))
            }
            _ => Err(BridgeError::UnknownProvider { name }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(Arc::new(BridgeConfig::default()))
    }

    #[test]
    fn test_resolves_both_known_providers() {
        let registry = registry();
        assert_eq!(registry.resolve(Some("lmstudio"), None).unwrap().name(), "lmstudio");
        assert_eq!(registry.resolve(Some("ollama"), None).unwrap().name(), "ollama");
    }

    #[test]
    fn test_name_matching_is_case_insensitive() {
        let client = registry().resolve(Some("Ollama"), None).unwrap();
        assert_eq!(client.name(), "ollama");
    }

    #[test]
    fn test_absent_name_uses_default_provider() {
        let mut config = BridgeConfig::default();
        config.default_provider = "ollama".to_string();
        let registry = ProviderRegistry::new(Arc::new(config));
        assert_eq!(registry.resolve(None, None).unwrap().name(), "ollama");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = registry().resolve(Some("llamacpp"), None).unwrap_err();
        match err {
            BridgeError::UnknownProvider { name } => assert_eq!(name, "llamacpp"),
            other => panic!("expected UnknownProvider, got {other:?}"),
        }
    }

    #[test]
    fn test_model_override_replaces_default() {
        let registry = registry();
        let client = registry.resolve(Some("ollama"), Some("qwen2.5vl")).unwrap();
        assert_eq!(client.model(), "qwen2.5vl");

        let client = registry.resolve(Some("ollama"), None).unwrap();
        assert_eq!(client.model(), "llava");
    }

    #[test]
    fn test_timeout_comes_from_settings() {
        let mut config = BridgeConfig::default();
        config.ollama.timeout_secs = 7;
        let registry = ProviderRegistry::new(Arc::new(config));
        let client = registry.resolve(Some("ollama"), None).unwrap();
        assert_eq!(client.timeout(), std::time::Duration::from_secs(7));
    }
}
