//! System clipboard backend
//!
//! Bridges the async `ClipboardSource` trait to arboard's blocking API.
//! arboard handles are not shareable across threads on every platform, so
//! each operation opens a fresh handle inside `spawn_blocking`. Images are
//! normalized to PNG on the way in and decoded back to raw RGBA on the
//! way out.

use std::borrow::Cow;
use std::io::Cursor;

use arboard::{Clipboard, ImageData};
use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgba};

use crate::core::clipboard::source::{ClipboardPayload, ClipboardSource};
use crate::shared::errors::ClipboardError;

pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

fn map_error(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ClipboardNotSupported => {
            ClipboardError::Unavailable("Clipboard not supported on this platform".to_string())
        }
        arboard::Error::ContentNotAvailable => {
            ClipboardError::Unavailable("No clipboard content of the requested type".to_string())
        }
        other => ClipboardError::Other(other.to_string()),
    }
}

async fn blocking<T, F>(op: F) -> Result<T, ClipboardError>
where
    T: Send + 'static,
    F: FnOnce(&mut Clipboard) -> Result<T, ClipboardError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut clipboard = Clipboard::new().map_err(map_error)?;
        op(&mut clipboard)
    })
    .await
    .map_err(|e| ClipboardError::Other(format!("Clipboard task failed: {}", e)))?
}

#[async_trait]
impl ClipboardSource for SystemClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        blocking(|clipboard| match clipboard.get_text() {
            Ok(text) => Ok(text),
            // No text on the clipboard is not an error for the monitors
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(map_error(e)),
        })
        .await
    }

    async fn read_items(&self) -> Result<Vec<ClipboardPayload>, ClipboardError> {
        blocking(|clipboard| {
            let image = match clipboard.get_image() {
                Ok(image) => image,
                Err(arboard::Error::ContentNotAvailable) => return Ok(Vec::new()),
                Err(e) => return Err(map_error(e)),
            };

            let width = image.width as u32;
            let height = image.height as u32;
            let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                ImageBuffer::from_raw(width, height, image.bytes.into_owned()).ok_or_else(
                    || ClipboardError::Other("Clipboard image has invalid dimensions".to_string()),
                )?;

            let mut png = Vec::new();
            buffer
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|e| ClipboardError::Other(format!("PNG encode failed: {}", e)))?;

            Ok(vec![ClipboardPayload::new().with("image/png", png)])
        })
        .await
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        blocking(move |clipboard| clipboard.set_text(text).map_err(map_error)).await
    }

    async fn write_image(&self, mime: &str, bytes: &[u8]) -> Result<(), ClipboardError> {
        if !mime.starts_with("image/") {
            return Err(ClipboardError::Unavailable(format!(
                "Not an image MIME type: {}",
                mime
            )));
        }
        let bytes = bytes.to_vec();
        blocking(move |clipboard| {
            let decoded = image::load_from_memory(&bytes)
                .map_err(|e| ClipboardError::Other(format!("Image decode failed: {}", e)))?;
            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            clipboard
                .set_image(ImageData {
                    width: width as usize,
                    height: height as usize,
                    bytes: Cow::Owned(rgba.into_raw()),
                })
                .map_err(map_error)
        })
        .await
    }
}
