//! Clipboard capture and organization core
//!
//! Watches the clipboard for new text and images via per-kind polling
//! monitors, deduplicates and auto-labels captures, and keeps ordered,
//! size-capped collections with pluggable persistence. Hosts (a desktop
//! shell, a test harness) plug in a `ClipboardSource`, subscribe to the
//! event bus and drive the `MonitorCoordinator`.

pub mod core;
pub mod shared;
pub mod system;

use std::sync::Arc;

pub use crate::core::clipboard::{
    CapturePipeline, ClipboardPayload, ClipboardSource, MonitorCoordinator, MonitorPhase,
    MonitorSettings,
};
pub use crate::core::store::storage::Storage;
pub use crate::core::store::CollectionStore;
pub use crate::shared::errors::{CaptureError, CaptureResult, ClipboardError};
pub use crate::shared::events::{AppEvent, EventBus};
pub use crate::shared::types::{CaptureOrigin, CapturedItem, ItemKind};

/// Fully wired capture core
///
/// Owns the event bus, the collection store, the capture pipeline and the
/// monitoring coordinator. Construct it with a storage backend and a
/// clipboard source, call [`ClipboardApp::load`] once, then drive it
/// through the coordinator.
pub struct ClipboardApp {
    events: EventBus,
    store: CollectionStore,
    pipeline: CapturePipeline,
    coordinator: MonitorCoordinator,
}

impl ClipboardApp {
    pub fn new(storage: Arc<dyn Storage>, source: Arc<dyn ClipboardSource>) -> Self {
        Self::with_settings(storage, source, MonitorSettings::default())
    }

    pub fn with_settings(
        storage: Arc<dyn Storage>,
        source: Arc<dyn ClipboardSource>,
        settings: MonitorSettings,
    ) -> Self {
        let events = EventBus::new();
        let store = CollectionStore::new(storage, events.clone());
        let pipeline = CapturePipeline::new(store.clone_arc(), events.clone());
        let coordinator =
            MonitorCoordinator::new(source, pipeline.clone(), events.clone(), settings);
        Self {
            events,
            store,
            pipeline,
            coordinator,
        }
    }

    /// Load persisted collections and seed the auto-label counters
    pub fn load(&self) -> CaptureResult<()> {
        self.pipeline.load()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn pipeline(&self) -> &CapturePipeline {
        &self.pipeline
    }

    pub fn coordinator(&self) -> &MonitorCoordinator {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clipboard::testutil::MockClipboard;
    use crate::core::store::storage::MemoryStorage;
    use pretty_assertions::assert_eq;
    use tokio::time::{sleep, Duration};

    #[tokio::test(start_paused = true)]
    async fn end_to_end_capture_and_recopy() {
        let storage = Arc::new(MemoryStorage::new());
        let mock = Arc::new(MockClipboard::new());
        let app = ClipboardApp::new(
            Arc::clone(&storage) as Arc<dyn Storage>,
            Arc::clone(&mock) as Arc<dyn ClipboardSource>,
        );
        app.load().unwrap();
        let mut rx = app.events().subscribe();

        mock.set_text("session note");
        app.coordinator().set_all(true);
        sleep(Duration::from_millis(1500)).await;

        let items = app.store().items(ItemKind::Text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "session note");
        assert!(items[0].label.starts_with("Text 1 ("));

        // Capture hit the persistent backend too
        assert_eq!(storage.load(ItemKind::Text).unwrap().len(), 1);

        // Re-copying marks the payload processed so the running monitor
        // does not capture it again.
        app.coordinator().copy_text(&items[0].id).await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(app.store().len(ItemKind::Text), 1);

        let mut captured_events = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, AppEvent::ItemCaptured(_)) {
                captured_events += 1;
            }
        }
        assert_eq!(captured_events, 1);
        app.coordinator().set_all(false);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resumes_from_persisted_state() {
        let storage = Arc::new(MemoryStorage::new());
        let mock = Arc::new(MockClipboard::new());

        {
            let app = ClipboardApp::new(
                Arc::clone(&storage) as Arc<dyn Storage>,
                Arc::clone(&mock) as Arc<dyn ClipboardSource>,
            );
            app.load().unwrap();
            app.pipeline()
                .capture_text("before restart", CaptureOrigin::Manual)
                .await
                .unwrap();
        }

        let app = ClipboardApp::new(storage, mock as Arc<dyn ClipboardSource>);
        app.load().unwrap();
        assert_eq!(app.store().len(ItemKind::Text), 1);

        // Fresh labels jump past the persisted "Text 1" with a margin
        let item = app
            .pipeline()
            .capture_text("after restart", CaptureOrigin::Manual)
            .await
            .unwrap()
            .unwrap();
        assert!(item.label.starts_with("Text 12 ("), "label was {}", item.label);
    }
}
