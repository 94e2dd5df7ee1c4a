//! Capture pipeline
//!
//! Turns raw clipboard payloads into persisted, labeled items. Owns the
//! per-kind last-processed slots (single-slot duplicate suppression), the
//! manual-paste duplicate window and the auto-label counters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::{sleep, Duration, Instant};

use crate::core::clipboard::fingerprint::text_fingerprint;
use crate::core::clipboard::source::to_data_url;
use crate::core::store::labels::LabelCounter;
use crate::core::store::CollectionStore;
use crate::shared::errors::CaptureResult;
use crate::shared::events::{AppEvent, EventBus};
use crate::shared::types::{CaptureOrigin, CapturedItem, ItemKind};

/// Re-pasting identical text inside this window counts as an accidental
/// double-paste; outside it, an intentional recapture.
pub const MANUAL_DUPLICATE_WINDOW: Duration = Duration::from_millis(2000);

/// The manual-paste re-entrancy flag clears after this delay, success or not
const PASTE_GUARD_CLEAR: Duration = Duration::from_millis(100);

struct PipelineInner {
    store: CollectionStore,
    events: EventBus,
    image_labels: LabelCounter,
    text_labels: LabelCounter,
    last_text: Mutex<Option<String>>,
    last_image: Mutex<Option<String>>,
    last_manual_paste: Mutex<Option<Instant>>,
    paste_in_flight: AtomicBool,
}

/// Shared capture pipeline, cheap to clone across monitor tasks
#[derive(Clone)]
pub struct CapturePipeline {
    inner: Arc<PipelineInner>,
}

impl CapturePipeline {
    pub fn new(store: CollectionStore, events: EventBus) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                store,
                events,
                image_labels: LabelCounter::new(ItemKind::Image),
                text_labels: LabelCounter::new(ItemKind::Text),
                last_text: Mutex::new(None),
                last_image: Mutex::new(None),
                last_manual_paste: Mutex::new(None),
                paste_in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Load persisted collections and seed the label counters
    ///
    /// Counters jump past the highest persisted label number so fresh
    /// labels never collide with migrated data.
    pub fn load(&self) -> CaptureResult<()> {
        self.inner.store.load_all()?;
        for (kind, counter) in [
            (ItemKind::Image, &self.inner.image_labels),
            (ItemKind::Text, &self.inner.text_labels),
        ] {
            let labels = self.inner.store.labels(kind);
            counter.seed_from_labels(labels.iter().map(String::as_str));
        }
        Ok(())
    }

    pub fn store(&self) -> &CollectionStore {
        &self.inner.store
    }

    /// Capture a text payload
    ///
    /// Returns `Ok(None)` when the payload was suppressed (empty,
    /// duplicate, or dropped by the re-entrancy guard).
    pub async fn capture_text(
        &self,
        text: &str,
        origin: CaptureOrigin,
    ) -> CaptureResult<Option<CapturedItem>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        match origin {
            CaptureOrigin::Monitor => {
                if self.last_text_matches(text) {
                    return Ok(None);
                }
                // Update the slot before touching the store, so a second
                // near-simultaneous trigger fails the duplicate check.
                self.note_text_processed(text);
                let item = self.commit_text(text, "New text captured!");
                Ok(Some(item))
            }
            CaptureOrigin::Manual => {
                if self.inner.paste_in_flight.swap(true, Ordering::SeqCst) {
                    println!("[CapturePipeline] Already processing a paste, skipping");
                    return Ok(None);
                }
                let captured = self.manual_text(text);

                // Clear the guard after a fixed delay regardless of outcome
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    sleep(PASTE_GUARD_CLEAR).await;
                    inner.paste_in_flight.store(false, Ordering::SeqCst);
                });

                Ok(captured)
            }
        }
    }

    fn manual_text(&self, text: &str) -> Option<CapturedItem> {
        let now = Instant::now();
        let recent_duplicate = self.last_text_matches(text)
            && self
                .inner
                .last_manual_paste
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .map(|at| now.duration_since(at) < MANUAL_DUPLICATE_WINDOW)
                .unwrap_or(false);

        if recent_duplicate {
            self.inner.events.notify("Duplicate text detected - not added");
            return None;
        }

        self.note_text_processed(text);
        *self
            .inner
            .last_manual_paste
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(now);

        Some(self.commit_text(text, "New text captured"))
    }

    fn commit_text(&self, text: &str, notice: &str) -> CapturedItem {
        let item = CapturedItem::new_text(text.to_string(), self.inner.text_labels.next_label());
        println!(
            "[CapturePipeline] Captured text {} ({})",
            item.label,
            text_fingerprint(text)
        );
        self.inner.store.insert(item.clone());
        self.inner.events.emit(AppEvent::ItemCaptured(item.clone()));
        self.inner.events.notify(notice);
        item
    }

    /// Capture an image payload, already encoded as a data URL
    pub async fn capture_image(
        &self,
        data_url: &str,
        origin: CaptureOrigin,
    ) -> CaptureResult<Option<CapturedItem>> {
        if data_url.is_empty() {
            return Ok(None);
        }
        if self.last_image_matches(data_url) {
            return Ok(None);
        }
        self.note_image_processed(data_url);

        let item =
            CapturedItem::new_image(data_url.to_string(), self.inner.image_labels.next_label());
        println!("[CapturePipeline] Captured image {}", item.label);
        self.inner.store.insert(item.clone());
        self.inner.events.emit(AppEvent::ItemCaptured(item.clone()));
        self.inner.events.notify(match origin {
            CaptureOrigin::Manual => "New image added!",
            CaptureOrigin::Monitor => "New image captured!",
        });
        Ok(Some(item))
    }

    /// Capture raw image bytes from a manual paste or drop
    pub async fn capture_image_bytes(
        &self,
        mime: &str,
        bytes: &[u8],
        origin: CaptureOrigin,
    ) -> CaptureResult<Option<CapturedItem>> {
        if bytes.is_empty() {
            return Ok(None);
        }
        self.capture_image(&to_data_url(mime, bytes), origin).await
    }

    /// Whether the text equals the last processed text payload
    pub fn last_text_matches(&self, text: &str) -> bool {
        self.inner
            .last_text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            == Some(text)
    }

    /// Whether the data URL equals the last processed image payload
    pub fn last_image_matches(&self, data_url: &str) -> bool {
        self.inner
            .last_image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            == Some(data_url)
    }

    /// Record a text payload as processed without capturing it
    ///
    /// Also used after re-copying a stored item, so the monitors do not
    /// recapture the app's own clipboard write.
    pub fn note_text_processed(&self, text: &str) {
        *self
            .inner
            .last_text
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
    }

    pub fn note_image_processed(&self, data_url: &str) {
        *self
            .inner
            .last_image
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(data_url.to_string());
    }

    pub fn reset_text_slot(&self) {
        *self
            .inner
            .last_text
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn reset_image_slot(&self) {
        *self
            .inner
            .last_image
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Clear both last-processed slots (full monitoring reset)
    pub fn reset(&self) {
        self.reset_text_slot();
        self.reset_image_slot();
    }
}
