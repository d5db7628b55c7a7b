//! Shared request and response types for the bridge.
//!
//! These are the shapes the transport layer hands to the core after JSON
//! parsing, and the shapes the core hands back. The core never interprets
//! model-generated content: backend replies travel through as opaque
//! `serde_json::Value` payloads tagged with the provider that produced them.

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};

/// Message role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in an ordered conversation. Order is semantically
/// significant and preserved end-to-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Build a single user message, the shape analyze dispatches use.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A caller-supplied image, in one of three forms.
///
/// Exactly one variant per instance; anything malformed is a resolution
/// error, never a silent fallback. On the wire a bare JSON string is a
/// filesystem path; objects carry a `path`, `base64` or `data_uri` key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ImageReferenceRepr")]
pub enum ImageReference {
    /// Filesystem path, with an optional caller media-type hint.
    Path {
        path: String,
        media_type: Option<String>,
    },
    /// Base64-encoded bytes with an optional media-type hint.
    Inline {
        base64: String,
        media_type: Option<String>,
    },
    /// A ready-made `data:` URI.
    DataUri(String),
}

impl ImageReference {
    /// Shorthand for a plain path reference.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path {
            path: path.into(),
            media_type: None,
        }
    }
}

/// Wire representation accepted for an image reference.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImageReferenceRepr {
    Bare(String),
    Object {
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        base64: Option<String>,
        #[serde(default)]
        data_uri: Option<String>,
        #[serde(default)]
        media_type: Option<String>,
    },
}

impl TryFrom<ImageReferenceRepr> for ImageReference {
    type Error = String;

    fn try_from(repr: ImageReferenceRepr) -> Result<Self, Self::Error> {
        match repr {
            ImageReferenceRepr::Bare(path) => Ok(ImageReference::Path {
                path,
                media_type: None,
            }),
            ImageReferenceRepr::Object {
                path,
                base64,
                data_uri,
                media_type,
            } => match (path, base64, data_uri) {
                (Some(path), None, None) => Ok(ImageReference::Path { path, media_type }),
                (None, Some(base64), None) => Ok(ImageReference::Inline { base64, media_type }),
                (None, None, Some(uri)) => Ok(ImageReference::DataUri(uri)),
                (None, None, None) => Err(
                    "image reference object needs one of 'path', 'base64' or 'data_uri'"
                        .to_string(),
                ),
                _ => Err(
                    "image reference object must carry exactly one of 'path', 'base64', 'data_uri'"
                        .to_string(),
                ),
            },
        }
    }
}

impl Serialize for ImageReference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        match self {
            // A bare path round-trips as the bare string it arrived as.
            ImageReference::Path {
                path,
                media_type: None,
            } => serializer.serialize_str(path),
            ImageReference::Path {
                path,
                media_type: Some(media_type),
            } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("path", path)?;
                map.serialize_entry("media_type", media_type)?;
                map.end()
            }
            ImageReference::Inline { base64, media_type } => {
                let len = if media_type.is_some() { 2 } else { 1 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("base64", base64)?;
                if let Some(media_type) = media_type {
                    map.serialize_entry("media_type", media_type)?;
                }
                map.end()
            }
            ImageReference::DataUri(uri) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("data_uri", uri)?;
                map.end()
            }
        }
    }
}

fn default_prompt() -> String {
    "Describe the image".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

/// A plain chat request: an ordered message sequence, no images.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// A vision request: one prompt over one or more image references.
/// Also the payload shape for batch runs, where each reference becomes
/// an independent single-image dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    pub images: Vec<ImageReference>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// The backend's full structured reply, uninterpreted, tagged with which
/// provider produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderResponse {
    pub provider: String,
    #[serde(rename = "response")]
    pub raw: serde_json::Value,
}

/// Error details for a failed batch item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Per-item outcome of a batch run.
#[derive(Debug, Serialize)]
pub enum BatchOutcome {
    #[serde(rename = "response")]
    Success(ProviderResponse),
    #[serde(rename = "error")]
    Failure(ItemError),
}

/// One entry in a batch result sequence. The output sequence matches the
/// input references 1:1 by position, however many items failed.
#[derive(Debug, Serialize)]
pub struct BatchItemResult {
    /// The reference as the caller supplied it.
    #[serde(rename = "image")]
    pub source: ImageReference,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchItemResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_string_parses_as_path() {
        let reference: ImageReference = serde_json::from_str("\"/photos/a.jpg\"").unwrap();
        assert_eq!(reference, ImageReference::path("/photos/a.jpg"));
    }

    #[test]
    fn test_object_forms_parse() {
        let reference: ImageReference =
            serde_json::from_str(r#"{"path": "/photos/a.jpg", "media_type": "image/jpeg"}"#)
                .unwrap();
        assert_eq!(
            reference,
            ImageReference::Path {
                path: "/photos/a.jpg".to_string(),
                media_type: Some("image/jpeg".to_string()),
            }
        );

        let reference: ImageReference =
            serde_json::from_str(r#"{"base64": "aGVsbG8=", "media_type": "image/png"}"#).unwrap();
        assert!(matches!(reference, ImageReference::Inline { .. }));

        let reference: ImageReference =
            serde_json::from_str(r#"{"data_uri": "data:image/png;base64,aGVsbG8="}"#).unwrap();
        assert!(matches!(reference, ImageReference::DataUri(_)));
    }

    #[test]
    fn test_ambiguous_object_rejected() {
        let result: Result<ImageReference, _> =
            serde_json::from_str(r#"{"path": "/a.jpg", "base64": "aGVsbG8="}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_object_rejected() {
        let result: Result<ImageReference, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_bare_path_serializes_back_to_string() {
        let json = serde_json::to_string(&ImageReference::path("/photos/a.jpg")).unwrap();
        assert_eq!(json, "\"/photos/a.jpg\"");
    }

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"messages": [{"role": "user", "content": "hi"}]}"#).unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert!(request.provider.is_none());
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_analyze_request_default_prompt() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"images": ["/photos/a.jpg"]}"#).unwrap();
        assert_eq!(request.prompt, "Describe the image");
        assert_eq!(request.images.len(), 1);
    }

    #[test]
    fn test_batch_item_result_shapes() {
        let success = BatchItemResult {
            source: ImageReference::path("/a.jpg"),
            outcome: BatchOutcome::Success(ProviderResponse {
                provider: "ollama".to_string(),
                raw: serde_json::json!({"message": {"content": "a cat"}}),
            }),
        };
        let json = serde_json::to_value(&success).unwrap();
        assert_eq!(json["image"], "/a.jpg");
        assert_eq!(json["response"]["provider"], "ollama");

        let failure = BatchItemResult {
            source: ImageReference::path("/b.jpg"),
            outcome: BatchOutcome::Failure(ItemError {
                kind: ErrorKind::ImageReadError,
                message: "no such file".to_string(),
            }),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["error"]["kind"], "image_read_error");
    }
}
