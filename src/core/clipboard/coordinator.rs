//! Monitoring coordinator
//!
//! Single entry point for everything that starts, stops or redirects the
//! monitors: per-kind toggles, the combined toggle, host focus/visibility
//! changes, and re-copying stored items back to the clipboard.

use std::sync::Arc;

use crate::core::clipboard::monitor::{MonitorSettings, PollMonitor};
use crate::core::clipboard::pipeline::CapturePipeline;
use crate::core::clipboard::source::{parse_data_url, ClipboardSource};
use crate::core::clipboard::state::MonitorGate;
use crate::shared::errors::{CaptureError, CaptureResult};
use crate::shared::events::{AppEvent, EventBus};
use crate::shared::types::ItemKind;

/// Owns both monitors and the shared monitoring state
pub struct MonitorCoordinator {
    text_monitor: PollMonitor,
    image_monitor: PollMonitor,
    gate: Arc<MonitorGate>,
    pipeline: CapturePipeline,
    events: EventBus,
    source: Arc<dyn ClipboardSource>,
}

impl MonitorCoordinator {
    pub fn new(
        source: Arc<dyn ClipboardSource>,
        pipeline: CapturePipeline,
        events: EventBus,
        settings: MonitorSettings,
    ) -> Self {
        let gate = MonitorGate::new();
        let text_monitor = PollMonitor::text(
            Arc::clone(&source),
            pipeline.clone(),
            Arc::clone(&gate),
            events.clone(),
            &settings,
        );
        let image_monitor = PollMonitor::image(
            Arc::clone(&source),
            pipeline.clone(),
            Arc::clone(&gate),
            events.clone(),
            &settings,
        );
        Self {
            text_monitor,
            image_monitor,
            gate,
            pipeline,
            events,
            source,
        }
    }

    pub fn gate(&self) -> &Arc<MonitorGate> {
        &self.gate
    }

    pub fn text_enabled(&self) -> bool {
        self.text_monitor.is_enabled()
    }

    pub fn images_enabled(&self) -> bool {
        self.image_monitor.is_enabled()
    }

    /// The combined toggle reads as on only when both monitors run
    pub fn all_enabled(&self) -> bool {
        self.text_enabled() && self.images_enabled()
    }

    pub fn enable_text(&self) {
        self.start_text();
        self.events.notify("Text monitoring activated");
        self.emit_monitoring_changed();
    }

    pub fn disable_text(&self) {
        self.text_monitor.disable();
        self.events.notify("Text monitoring stopped");
        self.emit_monitoring_changed();
    }

    pub fn toggle_text(&self) -> bool {
        if self.text_enabled() {
            self.disable_text();
        } else {
            self.enable_text();
        }
        self.text_enabled()
    }

    pub fn enable_images(&self) {
        self.start_images();
        self.events.notify("Image monitoring activated");
        self.emit_monitoring_changed();
    }

    pub fn disable_images(&self) {
        self.image_monitor.disable();
        self.events.notify("Image monitoring stopped");
        self.emit_monitoring_changed();
    }

    pub fn toggle_images(&self) -> bool {
        if self.images_enabled() {
            self.disable_images();
        } else {
            self.enable_images();
        }
        self.images_enabled()
    }

    /// Switch both monitors at once, with a single combined notification
    ///
    /// Enabling tears down any running loops first and clears the
    /// duplicate slots and the in-flight counter, so the first post-enable
    /// clipboard contents are captured even if seen before.
    pub fn set_all(&self, enabled: bool) {
        if enabled {
            self.text_monitor.disable();
            self.image_monitor.disable();
            self.pipeline.reset();
            self.gate.reset_in_flight();
            self.start_text();
            self.start_images();
            self.events.notify("Clipboard monitoring activated");
        } else {
            self.text_monitor.disable();
            self.image_monitor.disable();
            self.events.notify("Clipboard monitoring stopped");
        }
        self.emit_monitoring_changed();
    }

    pub fn toggle_all(&self) -> bool {
        let next = !self.all_enabled();
        self.set_all(next);
        next
    }

    /// Host window focus change
    ///
    /// Losing focus only gates the polls; the loops stay alive. Regaining
    /// focus clears the permission banner (the user may have granted
    /// access while away) and restarts the loops for a fresh epoch.
    pub fn set_focused(&self, focused: bool) {
        self.gate.set_focused(focused);
        if focused {
            self.gate.set_permission_needed(false);
            if self.all_enabled() {
                self.text_monitor.enable();
                self.image_monitor.enable();
            }
        }
    }

    /// Host document visibility change, treated the same as focus
    pub fn set_visibility(&self, visible: bool) {
        self.set_focused(visible);
    }

    /// Copy a stored text item back to the clipboard
    pub async fn copy_text(&self, id: &str) -> CaptureResult<()> {
        let item = self
            .pipeline
            .store()
            .get(ItemKind::Text, id)
            .ok_or_else(|| CaptureError::NotFound(id.to_string()))?;

        match self.source.write_text(&item.content).await {
            Ok(()) => {
                // Mark as processed so the text monitor does not recapture
                // our own write on the next tick.
                self.pipeline.note_text_processed(&item.content);
                self.events.notify("Text copied to clipboard");
                Ok(())
            }
            Err(e) => {
                self.events.notify("Failed to copy text to clipboard");
                Err(e.into())
            }
        }
    }

    /// Copy a stored image item back to the clipboard
    pub async fn copy_image(&self, id: &str) -> CaptureResult<()> {
        let item = self
            .pipeline
            .store()
            .get(ItemKind::Image, id)
            .ok_or_else(|| CaptureError::NotFound(id.to_string()))?;

        let Some((mime, bytes)) = parse_data_url(&item.content) else {
            self.events.notify("Failed to copy image to clipboard");
            return Err(CaptureError::Decode(format!(
                "Item {} does not hold a valid data URL",
                id
            )));
        };

        match self.source.write_image(&mime, &bytes).await {
            Ok(()) => {
                self.pipeline.note_image_processed(&item.content);
                Ok(())
            }
            Err(e) => {
                self.events.notify("Failed to copy image to clipboard");
                Err(e.into())
            }
        }
    }

    fn start_text(&self) {
        // Clear the slot so pre-existing clipboard contents count as new
        self.pipeline.reset_text_slot();
        self.text_monitor.enable();
    }

    fn start_images(&self) {
        self.pipeline.reset_image_slot();
        self.image_monitor.enable();
    }

    fn emit_monitoring_changed(&self) {
        self.events.emit(AppEvent::MonitoringChanged {
            text: self.text_enabled(),
            images: self.images_enabled(),
        });
    }
}
