//! Error types for the Aperture bridge.
//!
//! Errors are organized along the request lifecycle: caller input problems
//! first (bad image references, unknown provider names), then I/O, then
//! backend failures. Startup configuration problems are a separate type so
//! the binary can refuse to serve on them.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable error kind, surfaced to the transport layer so it can
/// pick a status code without string-matching messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidImageReference,
    ImageReadError,
    UnknownProvider,
    BackendUnreachable,
    BackendTimeout,
    BackendProtocolError,
}

/// Request-scoped errors produced by the core.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The caller supplied an image reference that is not well-formed
    /// (empty path, malformed data URI, empty inline payload).
    #[error("invalid image reference: {message}")]
    InvalidImageReference { message: String },

    /// A path reference pointed at a file that could not be read.
    #[error("failed to read image {path}: {message}")]
    ImageRead { path: PathBuf, message: String },

    /// The requested provider name is not one of the recognized kinds.
    #[error("unknown provider '{name}' (expected 'lmstudio' or 'ollama')")]
    UnknownProvider { name: String },

    /// The backend could not be reached at all (connection refused, DNS).
    #[error("{provider} unreachable: {message}")]
    BackendUnreachable { provider: String, message: String },

    /// The backend did not answer within the configured timeout.
    #[error("{provider} timed out after {timeout_ms}ms")]
    BackendTimeout { provider: String, timeout_ms: u64 },

    /// The backend answered, but not in a shape we can use
    /// (non-success status or a body that is not valid JSON).
    #[error("{provider} protocol error: {message}")]
    BackendProtocol {
        provider: String,
        status_code: Option<u16>,
        message: String,
    },
}

impl ErrorKind {
    /// Stable wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidImageReference => "invalid_image_reference",
            ErrorKind::ImageReadError => "image_read_error",
            ErrorKind::UnknownProvider => "unknown_provider",
            ErrorKind::BackendUnreachable => "backend_unreachable",
            ErrorKind::BackendTimeout => "backend_timeout",
            ErrorKind::BackendProtocolError => "backend_protocol_error",
        }
    }
}

impl BridgeError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::InvalidImageReference { .. } => ErrorKind::InvalidImageReference,
            BridgeError::ImageRead { .. } => ErrorKind::ImageReadError,
            BridgeError::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            BridgeError::BackendUnreachable { .. } => ErrorKind::BackendUnreachable,
            BridgeError::BackendTimeout { .. } => ErrorKind::BackendTimeout,
            BridgeError::BackendProtocol { .. } => ErrorKind::BackendProtocolError,
        }
    }
}

/// Startup configuration errors. These are fatal: the process must not
/// serve traffic with a broken configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Convenience type alias for request-scoped results.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
