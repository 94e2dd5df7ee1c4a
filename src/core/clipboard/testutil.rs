//! Scripted clipboard source for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};

use crate::core::clipboard::source::{ClipboardPayload, ClipboardSource};
use crate::shared::errors::ClipboardError;

/// In-memory clipboard whose contents and failure mode tests script
/// between ticks
pub struct MockClipboard {
    text: Mutex<String>,
    image: Mutex<Option<(String, Vec<u8>)>>,
    failure: Mutex<Option<ClipboardError>>,
    read_delay: Mutex<Duration>,
    text_reads: AtomicUsize,
    item_reads: AtomicUsize,
    written_text: Mutex<Vec<String>>,
    written_images: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self {
            text: Mutex::new(String::new()),
            image: Mutex::new(None),
            failure: Mutex::new(None),
            read_delay: Mutex::new(Duration::ZERO),
            text_reads: AtomicUsize::new(0),
            item_reads: AtomicUsize::new(0),
            written_text: Mutex::new(Vec::new()),
            written_images: Mutex::new(Vec::new()),
        }
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }

    pub fn set_image(&self, mime: &str, bytes: Vec<u8>) {
        *self.image.lock().unwrap() = Some((mime.to_string(), bytes));
    }

    /// All reads fail with this error until cleared
    pub fn set_failure(&self, failure: Option<ClipboardError>) {
        *self.failure.lock().unwrap() = failure;
    }

    /// Make every read take this long, to model slow platform clipboards
    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = delay;
    }

    pub fn text_reads(&self) -> usize {
        self.text_reads.load(Ordering::SeqCst)
    }

    pub fn item_reads(&self) -> usize {
        self.item_reads.load(Ordering::SeqCst)
    }

    pub fn written_text(&self) -> Vec<String> {
        self.written_text.lock().unwrap().clone()
    }

    pub fn written_images(&self) -> Vec<(String, Vec<u8>)> {
        self.written_images.lock().unwrap().clone()
    }

    async fn pre_read(&self) -> Result<(), ClipboardError> {
        let delay = *self.read_delay.lock().unwrap();
        if !delay.is_zero() {
            sleep(delay).await;
        }
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for MockClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipboardSource for MockClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        self.text_reads.fetch_add(1, Ordering::SeqCst);
        self.pre_read().await?;
        Ok(self.text.lock().unwrap().clone())
    }

    async fn read_items(&self) -> Result<Vec<ClipboardPayload>, ClipboardError> {
        self.item_reads.fetch_add(1, Ordering::SeqCst);
        self.pre_read().await?;
        let items = match self.image.lock().unwrap().clone() {
            Some((mime, bytes)) => vec![ClipboardPayload::new().with(mime, bytes)],
            None => Vec::new(),
        };
        Ok(items)
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        *self.text.lock().unwrap() = text.to_string();
        self.written_text.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn write_image(&self, mime: &str, bytes: &[u8]) -> Result<(), ClipboardError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        *self.image.lock().unwrap() = Some((mime.to_string(), bytes.to_vec()));
        self.written_images
            .lock()
            .unwrap()
            .push((mime.to_string(), bytes.to_vec()));
        Ok(())
    }
}
