//! Configuration management for the bridge.
//!
//! Settings are layered: built-in defaults, then an optional TOML file at
//! the platform config dir, then environment variables. The result is an
//! immutable snapshot loaded once at startup; in-flight requests only ever
//! read it through a shared reference.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for a single provider backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the backend, e.g. `http://localhost:11434`
    pub base_url: String,

    /// Optional API key, sent as a bearer credential when present
    pub api_key: Option<String>,

    /// Default model when a request carries no override
    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            model: String::new(),
            timeout_secs: 60,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Root configuration for the bridge process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Address to bind the HTTP listener on
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Provider used when requests do not name one
    pub default_provider: String,

    /// LM Studio (OpenAI-compatible) backend
    pub lmstudio: ProviderSettings,

    /// Ollama (native REST) backend
    pub ollama: ProviderSettings,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8082,
            default_provider: "lmstudio".to_string(),
            lmstudio: ProviderSettings {
                base_url: "http://localhost:1234".to_string(),
                api_key: None,
                model: "vision".to_string(),
                timeout_secs: 60,
            },
            ollama: ProviderSettings {
                base_url: "http://localhost:11434".to_string(),
                api_key: None,
                model: "llava".to_string(),
                timeout_secs: 60,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration: defaults, overlaid with the config file when one
    /// exists, then environment variables. Validates before returning.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Default config file path, platform-appropriate via `directories`.
    /// Falls back to `~/.aperture/config.toml` if detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "aperture", "aperture")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                std::env::var("HOME")
                    .map(|home| PathBuf::from(home).join(".aperture").join("config.toml"))
                    .unwrap_or_else(|_| PathBuf::from(".aperture/config.toml"))
            })
    }

    /// Overlay environment variables onto the current values.
    fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Env overlay with an injectable source, so tests don't have to touch
    /// process-global state.
    fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(host) = get("APERTURE_HOST") {
            self.host = host;
        }
        if let Some(port) = get("APERTURE_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            } else {
                tracing::warn!("Ignoring unparseable APERTURE_PORT value '{port}'");
            }
        }
        if let Some(provider) = get("APERTURE_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(url) = get("LMSTUDIO_URL") {
            self.lmstudio.base_url = url;
        }
        if let Some(key) = get("LMSTUDIO_API_KEY") {
            self.lmstudio.api_key = Some(key);
        }
        if let Some(model) = get("LMSTUDIO_MODEL") {
            self.lmstudio.model = model;
        }
        if let Some(timeout) = get("LMSTUDIO_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.lmstudio.timeout_secs = secs;
            } else {
                tracing::warn!("Ignoring unparseable LMSTUDIO_TIMEOUT value '{timeout}'");
            }
        }

        if let Some(url) = get("OLLAMA_URL") {
            self.ollama.base_url = url;
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(timeout) = get("OLLAMA_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.ollama.timeout_secs = secs;
            } else {
                tracing::warn!("Ignoring unparseable OLLAMA_TIMEOUT value '{timeout}'");
            }
        }
    }

    /// Reject configurations the process must not serve traffic with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Validation("host must not be empty".into()));
        }
        let provider = self.default_provider.to_ascii_lowercase();
        if provider != "lmstudio" && provider != "ollama" {
            return Err(ConfigError::Validation(format!(
                "default_provider must be 'lmstudio' or 'ollama', got '{}'",
                self.default_provider
            )));
        }
        for (name, settings) in [("lmstudio", &self.lmstudio), ("ollama", &self.ollama)] {
            if settings.base_url.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{name}.base_url must not be empty"
                )));
            }
            if settings.model.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{name}.model must not be empty"
                )));
            }
            if settings.timeout_secs == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name}.timeout_secs must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    /// Diagnostic view with credentials hidden, for the `/config` endpoint.
    pub fn redacted(&self) -> serde_json::Value {
        let provider_view = |settings: &ProviderSettings| {
            serde_json::json!({
                "base_url": settings.base_url,
                "api_key": settings.api_key.as_ref().map(|_| "<hidden>"),
                "model": settings.model,
                "timeout_secs": settings.timeout_secs,
            })
        };
        serde_json::json!({
            "host": self.host,
            "port": self.port,
            "default_provider": self.default_provider,
            "providers": {
                "lmstudio": provider_view(&self.lmstudio),
                "ollama": provider_view(&self.ollama),
            },
        })
    }
}
