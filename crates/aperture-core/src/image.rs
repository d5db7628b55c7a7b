//! Image payload resolution.
//!
//! Callers hand the bridge images in three forms: a filesystem path, raw
//! base64 bytes, or a ready-made data URI. Everything downstream works on
//! one canonical shape, `ResolvedImage`, so provider clients never need to
//! know which form a request arrived in.

use crate::error::{BridgeError, BridgeResult};
use crate::types::ImageReference;
use base64::Engine;
use std::path::PathBuf;

/// Fallback when no media type can be derived from the source.
const GENERIC_MEDIA_TYPE: &str = "application/octet-stream";

/// Base64-encoded image bytes with a known media type, ready to send.
///
/// Immutable once produced; owned by the request that created it and
/// discarded after the outbound call completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ResolvedImage {
    /// Render as a `data:` URL, the form OpenAI-style APIs expect.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Turn a caller-supplied reference into encoded bytes with a media type.
///
/// The only side effect is the file read for path references; there is no
/// caching and no shared state, so concurrent calls for unrelated
/// references are safe. Identical input yields identical output.
pub async fn resolve_image(reference: &ImageReference) -> BridgeResult<ResolvedImage> {
    match reference {
        ImageReference::Path { path, media_type } => {
            if path.is_empty() {
                return Err(BridgeError::InvalidImageReference {
                    message: "path must not be empty".to_string(),
                });
            }
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| BridgeError::ImageRead {
                    path: PathBuf::from(path),
                    message: e.to_string(),
                })?;
            let media_type = media_type
                .clone()
                .or_else(|| media_type_for_path(path).map(String::from))
                .unwrap_or_else(|| GENERIC_MEDIA_TYPE.to_string());
            Ok(ResolvedImage {
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
                media_type,
            })
        }
        ImageReference::Inline { base64, media_type } => {
            if base64.is_empty() {
                return Err(BridgeError::InvalidImageReference {
                    message: "inline payload must not be empty".to_string(),
                });
            }
            base64::engine::general_purpose::STANDARD
                .decode(base64)
                .map_err(|e| BridgeError::InvalidImageReference {
                    message: format!("inline payload is not valid base64: {e}"),
                })?;
            Ok(ResolvedImage {
                data: base64.clone(),
                media_type: media_type
                    .clone()
                    .unwrap_or_else(|| GENERIC_MEDIA_TYPE.to_string()),
            })
        }
        ImageReference::DataUri(uri) => parse_data_uri(uri),
    }
}

/// Split a base64 `data:` URI into its declared media type and payload.
fn parse_data_uri(uri: &str) -> BridgeResult<ResolvedImage> {
    let invalid = |message: String| BridgeError::InvalidImageReference { message };

    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| invalid("data URI must start with 'data:'".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("data URI has no ',' separator".to_string()))?;
    let media_type = header.strip_suffix(";base64").ok_or_else(|| {
        invalid("only base64 data URIs are supported (missing ';base64' marker)".to_string())
    })?;
    if payload.is_empty() {
        return Err(invalid("data URI payload is empty".to_string()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| invalid(format!("data URI payload is not valid base64: {e}")))?;

    Ok(ResolvedImage {
        data: payload.to_string(),
        media_type: if media_type.is_empty() {
            GENERIC_MEDIA_TYPE.to_string()
        } else {
            media_type.to_string()
        },
    })
}

/// Media type from a path's file extension, for the formats a photo
/// editor is likely to hand us.
fn media_type_for_path(path: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(path)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "heic" => Some("image/heic"),
        other => {
            tracing::debug!("No media type known for extension '{other}'");
            None
        }
    }
}
