//! Pluggable clipboard boundary
//!
//! The monitors and re-copy operations only ever talk to the clipboard
//! through this trait, so the core stays testable and platform-neutral.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::shared::errors::ClipboardError;

/// One clipboard entry, advertising its MIME types with per-type payloads
#[derive(Debug, Clone, Default)]
pub struct ClipboardPayload {
    types: Vec<String>,
    payloads: HashMap<String, Vec<u8>>,
}

impl ClipboardPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime = mime.into();
        self.types.push(mime.clone());
        self.payloads.insert(mime, bytes);
        self
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn payload(&self, mime: &str) -> Option<&[u8]> {
        self.payloads.get(mime).map(|b| b.as_slice())
    }

    /// First advertised MIME type with the `image/` prefix, if any
    pub fn first_image_mime(&self) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.starts_with("image/"))
            .map(|t| t.as_str())
    }
}

/// Abstract clipboard access
///
/// Implementations: the `system-clipboard` feature's arboard backend, and
/// scripted mocks in tests.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    async fn read_text(&self) -> Result<String, ClipboardError>;

    async fn read_items(&self) -> Result<Vec<ClipboardPayload>, ClipboardError>;

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    async fn write_image(&self, mime: &str, bytes: &[u8]) -> Result<(), ClipboardError>;
}

/// Encode raw image bytes as a displayable data URL
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Split a data URL back into its MIME type and raw bytes
///
/// Used when re-copying a stored image to the clipboard.
pub fn parse_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (mime, encoded) = rest.split_once(";base64,")?;
    if mime.is_empty() {
        return None;
    }
    let bytes = BASE64.decode(encoded).ok()?;
    Some((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn data_url_round_trip() {
        let bytes = vec![0x89, 0x50, 0x4e, 0x47];
        let url = to_data_url("image/png", &bytes);
        assert!(url.starts_with("data:image/png;base64,"));
        let (mime, decoded) = parse_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn parse_rejects_malformed_urls() {
        assert!(parse_data_url("not a data url").is_none());
        assert!(parse_data_url("data:;base64,AA==").is_none());
        assert!(parse_data_url("data:image/png;base64,!!!").is_none());
    }

    #[test]
    fn first_image_mime_skips_non_images() {
        let payload = ClipboardPayload::new()
            .with("text/plain", b"hi".to_vec())
            .with("image/jpeg", vec![1, 2, 3])
            .with("image/png", vec![4, 5, 6]);
        assert_eq!(payload.first_image_mime(), Some("image/jpeg"));
        assert_eq!(payload.payload("image/jpeg"), Some(&[1u8, 2, 3][..]));
        assert!(payload.payload("image/gif").is_none());
    }
}
