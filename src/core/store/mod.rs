//! Collection store
//!
//! In-memory ordered collections of captured items (newest first), backed
//! by a pluggable storage backend. Owns the oldest-first quota eviction
//! and all post-capture metadata edits (labels, tags, text content).

pub mod labels;
pub mod storage;

use std::sync::{Arc, Mutex, PoisonError};

use crate::shared::errors::{CaptureError, CaptureResult};
use crate::shared::events::EventBus;
use crate::shared::types::{CapturedItem, ItemKind};

use storage::Storage;

/// Most recent items persisted per kind
const MAX_STORED_IMAGES: usize = 50;
const MAX_STORED_TEXTS: usize = 100;

/// Minimum items retained when trimming after a quota failure
const MIN_KEPT_IMAGES: usize = 10;
const MIN_KEPT_TEXTS: usize = 20;

/// Ordered collections of captured items with pluggable persistence
pub struct CollectionStore {
    storage: Arc<dyn Storage>,
    images: Arc<Mutex<Vec<CapturedItem>>>,
    texts: Arc<Mutex<Vec<CapturedItem>>>,
    events: EventBus,
}

impl CollectionStore {
    pub fn new(storage: Arc<dyn Storage>, events: EventBus) -> Self {
        Self {
            storage,
            images: Arc::new(Mutex::new(Vec::new())),
            texts: Arc::new(Mutex::new(Vec::new())),
            events,
        }
    }

    /// Get a clone for sharing across tasks
    pub fn clone_arc(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            images: Arc::clone(&self.images),
            texts: Arc::clone(&self.texts),
            events: self.events.clone(),
        }
    }

    fn collection(&self, kind: ItemKind) -> &Mutex<Vec<CapturedItem>> {
        match kind {
            ItemKind::Image => &self.images,
            ItemKind::Text => &self.texts,
        }
    }

    fn max_stored(kind: ItemKind) -> usize {
        match kind {
            ItemKind::Image => MAX_STORED_IMAGES,
            ItemKind::Text => MAX_STORED_TEXTS,
        }
    }

    fn min_kept(kind: ItemKind) -> usize {
        match kind {
            ItemKind::Image => MIN_KEPT_IMAGES,
            ItemKind::Text => MIN_KEPT_TEXTS,
        }
    }

    /// Load both collections from storage
    pub fn load_all(&self) -> CaptureResult<()> {
        for kind in [ItemKind::Image, ItemKind::Text] {
            let loaded = self.storage.load(kind)?;
            let mut items = self
                .collection(kind)
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *items = loaded;
        }
        Ok(())
    }

    /// Prepend a freshly captured item and persist
    pub fn insert(&self, item: CapturedItem) {
        let kind = item.kind;
        {
            let mut items = self
                .collection(kind)
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            items.insert(0, item);
        }
        self.persist(kind);
    }

    /// Persist one collection, trimming oldest-first on quota failure
    ///
    /// The trim keeps `max(floor, len/2)` items, applies to the live
    /// collection too, notifies once and retries the save exactly once.
    fn persist(&self, kind: ItemKind) {
        let snapshot: Vec<CapturedItem> = {
            let items = self
                .collection(kind)
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            items.iter().take(Self::max_stored(kind)).cloned().collect()
        };

        match self.storage.save(kind, &snapshot) {
            Ok(()) => {}
            Err(CaptureError::QuotaExceeded) => {
                let retry: Vec<CapturedItem> = {
                    let mut items = self
                        .collection(kind)
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    let keep = Self::min_kept(kind).max(items.len() / 2);
                    items.truncate(keep);
                    items.iter().take(Self::max_stored(kind)).cloned().collect()
                };

                self.events.notify(format!(
                    "Storage limit reached. Keeping only recent {}.",
                    kind.collection_key()
                ));

                if let Err(e) = self.storage.save(kind, &retry) {
                    eprintln!(
                        "[CollectionStore] Retry save failed for {}: {}",
                        kind.collection_key(),
                        e
                    );
                }
            }
            Err(e) => {
                eprintln!(
                    "[CollectionStore] Failed to save {}: {}",
                    kind.collection_key(),
                    e
                );
            }
        }
    }

    /// Snapshot of one collection, newest first
    pub fn items(&self, kind: ItemKind) -> Vec<CapturedItem> {
        self.collection(kind)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self, kind: ItemKind) -> usize {
        self.collection(kind)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self, kind: ItemKind) -> bool {
        self.len(kind) == 0
    }

    pub fn get(&self, kind: ItemKind, id: &str) -> Option<CapturedItem> {
        self.collection(kind)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Labels of one collection, used to seed the auto-label counters
    pub fn labels(&self, kind: ItemKind) -> Vec<String> {
        self.collection(kind)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|item| item.label.clone())
            .collect()
    }

    /// Delete an item by id; returns true if something was removed
    pub fn delete(&self, kind: ItemKind, id: &str) -> bool {
        let removed = {
            let mut items = self
                .collection(kind)
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let before = items.len();
            items.retain(|item| item.id != id);
            items.len() != before
        };
        if removed {
            self.persist(kind);
        }
        removed
    }

    /// Replace an item's display label
    pub fn set_label(&self, kind: ItemKind, id: &str, label: &str) -> CaptureResult<()> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(CaptureError::InvalidInput("label cannot be empty".into()));
        }
        self.update_item(kind, id, |item| {
            item.label = trimmed.to_string();
        })
    }

    /// Add a tag (trimmed, lowercased); false for empty or duplicate tags
    pub fn add_tag(&self, kind: ItemKind, id: &str, tag: &str) -> CaptureResult<bool> {
        let mut added = false;
        self.update_item(kind, id, |item| {
            added = item.add_tag(tag);
        })?;
        Ok(added)
    }

    /// Remove a tag; false if the item did not carry it
    pub fn remove_tag(&self, kind: ItemKind, id: &str, tag: &str) -> CaptureResult<bool> {
        let mut removed = false;
        self.update_item(kind, id, |item| {
            removed = item.remove_tag(tag);
        })?;
        Ok(removed)
    }

    /// Replace the content of a text item
    ///
    /// Texts are the one post-capture content edit the model allows.
    pub fn set_text_content(&self, id: &str, content: &str) -> CaptureResult<()> {
        self.update_item(ItemKind::Text, id, |item| {
            item.content = content.to_string();
        })?;
        self.events.notify("Text content updated!");
        Ok(())
    }

    fn update_item<F>(&self, kind: ItemKind, id: &str, apply: F) -> CaptureResult<()>
    where
        F: FnOnce(&mut CapturedItem),
    {
        {
            let mut items = self
                .collection(kind)
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let item = items
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| CaptureError::NotFound(id.to_string()))?;
            apply(item);
        }
        self.persist(kind);
        Ok(())
    }

    /// Case-insensitive search over labels and tags (plus content for texts)
    pub fn search(&self, kind: ItemKind, term: &str) -> Vec<CapturedItem> {
        let needle = term.to_lowercase();
        self.collection(kind)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|item| {
                item.label.to_lowercase().contains(&needle)
                    || (kind == ItemKind::Text && item.content.to_lowercase().contains(&needle))
                    || item.tags.iter().any(|t| t.contains(&needle))
            })
            .cloned()
            .collect()
    }
}
