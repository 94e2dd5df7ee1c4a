//! Clipboard polling monitors
//!
//! One `PollMonitor` per payload kind (text / image), each a spawned task
//! polling the clipboard source on its own fixed interval. Every tick
//! passes the focus gate and the shared concurrency cap before reading;
//! detected changes commit through the capture pipeline after a short
//! debounce that re-validates the value.
//!
//! Lifecycle is `Stopped -> Starting -> Polling -> Stopped`, guarded by an
//! epoch counter: enable bumps the epoch and spawns a fresh loop, disable
//! bumps it again so any loop, read or debounce still in flight observes
//! the stale epoch and drops its result. There is never more than one
//! live loop per monitor.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::{sleep, Duration};

use crate::core::clipboard::fingerprint::image_fingerprint;
use crate::core::clipboard::source::{to_data_url, ClipboardPayload, ClipboardSource};
use crate::core::clipboard::state::MonitorGate;
use crate::core::clipboard::pipeline::CapturePipeline;
use crate::shared::errors::ClipboardError;
use crate::shared::events::{AppEvent, EventBus};
use crate::shared::types::{CaptureOrigin, ItemKind};

/// Poll intervals and delays for both monitors
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub text_interval: Duration,
    pub image_interval: Duration,
    /// Delay before committing a detected change; a newer change within
    /// the window supersedes the first
    pub debounce: Duration,
    /// Delay before the immediate first read after enabling
    pub settle_delay: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            text_interval: Duration::from_millis(400),
            image_interval: Duration::from_millis(500),
            debounce: Duration::from_millis(150),
            settle_delay: Duration::from_millis(50),
        }
    }
}

/// Monitor lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Stopped,
    Starting,
    Polling,
}

struct MonitorShared {
    kind: ItemKind,
    enabled: AtomicBool,
    /// Bumped on every enable/disable; stale loops and late callbacks
    /// compare against it before committing anything
    epoch: AtomicU64,
    phase: Mutex<MonitorPhase>,
}

/// Polling loop for one payload kind
#[derive(Clone)]
pub struct PollMonitor {
    shared: Arc<MonitorShared>,
    source: Arc<dyn ClipboardSource>,
    pipeline: CapturePipeline,
    gate: Arc<MonitorGate>,
    events: EventBus,
    interval: Duration,
    debounce: Duration,
    settle_delay: Duration,
}

impl PollMonitor {
    pub fn text(
        source: Arc<dyn ClipboardSource>,
        pipeline: CapturePipeline,
        gate: Arc<MonitorGate>,
        events: EventBus,
        settings: &MonitorSettings,
    ) -> Self {
        Self::new(ItemKind::Text, source, pipeline, gate, events, settings.text_interval, settings)
    }

    pub fn image(
        source: Arc<dyn ClipboardSource>,
        pipeline: CapturePipeline,
        gate: Arc<MonitorGate>,
        events: EventBus,
        settings: &MonitorSettings,
    ) -> Self {
        Self::new(ItemKind::Image, source, pipeline, gate, events, settings.image_interval, settings)
    }

    fn new(
        kind: ItemKind,
        source: Arc<dyn ClipboardSource>,
        pipeline: CapturePipeline,
        gate: Arc<MonitorGate>,
        events: EventBus,
        interval: Duration,
        settings: &MonitorSettings,
    ) -> Self {
        Self {
            shared: Arc::new(MonitorShared {
                kind,
                enabled: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                phase: Mutex::new(MonitorPhase::Stopped),
            }),
            source,
            pipeline,
            gate,
            events,
            interval,
            debounce: settings.debounce,
            settle_delay: settings.settle_delay,
        }
    }

    fn tag(&self) -> &'static str {
        match self.shared.kind {
            ItemKind::Text => "[TextMonitor]",
            ItemKind::Image => "[ImageMonitor]",
        }
    }

    /// Start polling; always stops any previous loop first
    pub fn enable(&self) {
        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.enabled.store(true, Ordering::SeqCst);
        self.set_phase(MonitorPhase::Starting);
        println!("{} Started monitoring", self.tag());

        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.run(epoch).await;
        });
    }

    /// Stop polling; in-flight reads and debounces will observe the stale
    /// epoch and drop their results
    pub fn disable(&self) {
        self.shared.enabled.store(false, Ordering::SeqCst);
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        self.set_phase(MonitorPhase::Stopped);
        println!("{} Stopped monitoring", self.tag());
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> MonitorPhase {
        *self
            .shared
            .phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: MonitorPhase) {
        *self
            .shared
            .phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
            && self.shared.epoch.load(Ordering::SeqCst) == epoch
    }

    async fn run(self, epoch: u64) {
        // One immediate check after a short settle delay, then the loop
        sleep(self.settle_delay).await;
        if !self.is_current(epoch) {
            return;
        }
        if let Err(e) = self.tick(epoch).await {
            eprintln!("{} Initial check failed: {}", self.tag(), e);
        }
        if !self.is_current(epoch) {
            return;
        }
        self.set_phase(MonitorPhase::Polling);

        let mut consecutive_errors = 0u32;
        loop {
            sleep(self.interval).await;
            if !self.is_current(epoch) {
                return;
            }
            match self.tick(epoch).await {
                Ok(()) => consecutive_errors = 0,
                Err(e) => {
                    consecutive_errors += 1;
                    // Log occasionally to avoid per-tick noise
                    if consecutive_errors == 1 || consecutive_errors % 10 == 0 {
                        eprintln!(
                            "{} Clipboard error (#{}): {}",
                            self.tag(),
                            consecutive_errors,
                            e
                        );
                    }
                }
            }
        }
    }

    async fn tick(&self, epoch: u64) -> Result<(), ClipboardError> {
        if !self.gate.is_focused() {
            return Ok(());
        }
        let Some(permit) = self.gate.try_acquire_read() else {
            println!("{} Too many concurrent operations, skipping tick", self.tag());
            return Ok(());
        };

        let result = match self.shared.kind {
            ItemKind::Text => {
                let read = self.source.read_text().await;
                drop(permit);
                match read {
                    Ok(text) => {
                        self.handle_text(epoch, text).await;
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            ItemKind::Image => {
                let read = self.source.read_items().await;
                drop(permit);
                match read {
                    Ok(items) => {
                        self.handle_items(epoch, items).await;
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
        };

        if let Err(e) = &result {
            if matches!(e, ClipboardError::PermissionDenied) && !self.gate.permission_needed() {
                self.gate.set_permission_needed(true);
                self.events.emit(AppEvent::PermissionRequired(true));
            }
        }
        result
    }

    async fn handle_text(&self, epoch: u64, text: String) {
        if text.trim().is_empty() || self.pipeline.last_text_matches(&text) {
            return;
        }

        // Debounce, then re-validate: a rapid second change supersedes
        // this one, and a disable in the meantime drops it.
        sleep(self.debounce).await;
        if !self.is_current(epoch) || self.pipeline.last_text_matches(&text) {
            return;
        }
        if let Err(e) = self
            .pipeline
            .capture_text(&text, CaptureOrigin::Monitor)
            .await
        {
            eprintln!("{} Capture failed: {}", self.tag(), e);
        }
    }

    async fn handle_items(&self, epoch: u64, items: Vec<ClipboardPayload>) {
        // Only the first image-bearing entry per tick is considered
        for payload in items {
            let Some(mime) = payload.first_image_mime() else {
                continue;
            };
            let Some(bytes) = payload.payload(mime) else {
                eprintln!(
                    "{} Advertised {} payload missing, aborting tick",
                    self.tag(),
                    mime
                );
                return;
            };
            if bytes.is_empty() {
                eprintln!("{} Empty {} payload, aborting tick", self.tag(), mime);
                return;
            }

            let data_url = to_data_url(mime, bytes);
            if self.pipeline.last_image_matches(&data_url) {
                return;
            }
            println!(
                "{} Detected image {}",
                self.tag(),
                image_fingerprint(bytes, mime)
            );

            sleep(self.debounce).await;
            if !self.is_current(epoch) || self.pipeline.last_image_matches(&data_url) {
                return;
            }
            if let Err(e) = self
                .pipeline
                .capture_image(&data_url, CaptureOrigin::Monitor)
                .await
            {
                eprintln!("{} Capture failed: {}", self.tag(), e);
            }
            return;
        }
    }
}
