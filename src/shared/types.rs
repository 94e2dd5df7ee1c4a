use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kind of captured content
///
/// Also names the persisted collection each kind lives in
/// (`images` / `texts`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Image,
    Text,
}

impl ItemKind {
    /// Key of the persisted collection for this kind
    pub fn collection_key(&self) -> &'static str {
        match self {
            ItemKind::Image => "images",
            ItemKind::Text => "texts",
        }
    }

    /// Prefix used by auto-generated labels ("Image 3 (14:05)")
    pub fn label_prefix(&self) -> &'static str {
        match self {
            ItemKind::Image => "Image",
            ItemKind::Text => "Text",
        }
    }
}

/// Where a capture request came from
///
/// Manual pastes/drops get the time-windowed duplicate check; monitor
/// captures are suppressed against the single last-processed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOrigin {
    Monitor,
    Manual,
}

/// A single captured clipboard item
///
/// `content` holds plain text for text items and a data-URL-encoded blob
/// for images. Identity (`id`, `timestamp`) is immutable; `label`, `tags`
/// and (for texts) `content` are user-editable after capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedItem {
    pub id: String,
    pub kind: ItemKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub tags: Vec<String>,
}

impl CapturedItem {
    /// Create a new text item with a freshly allocated id
    pub fn new_text(content: String, label: String) -> Self {
        Self {
            id: generate_id(),
            kind: ItemKind::Text,
            content,
            timestamp: Utc::now(),
            label,
            tags: Vec::new(),
        }
    }

    /// Create a new image item from a data URL
    pub fn new_image(data_url: String, label: String) -> Self {
        Self {
            id: generate_id(),
            kind: ItemKind::Image,
            content: data_url,
            timestamp: Utc::now(),
            label,
            tags: Vec::new(),
        }
    }

    /// Add a tag, normalized to trimmed lowercase
    ///
    /// Returns false for empty/whitespace-only tags and duplicates.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let formatted = tag.trim().to_lowercase();
        if formatted.is_empty() || self.tags.contains(&formatted) {
            return false;
        }
        self.tags.push(formatted);
        true
    }

    /// Remove a tag; returns true if it was present
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}

/// Generate a unique item id: unix millis plus a random base36 suffix
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    const CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = (0..8)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect();
    format!("{}-{}", millis, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_id()));
        }
    }

    #[test]
    fn tags_are_normalized_and_unique() {
        let mut item = CapturedItem::new_text("hello".into(), "Text 1 (10:00)".into());
        assert!(item.add_tag("  Work "));
        assert!(!item.add_tag("work"));
        assert!(!item.add_tag("   "));
        assert_eq!(item.tags, vec!["work"]);

        assert!(item.remove_tag("work"));
        assert!(!item.remove_tag("work"));
        assert!(item.tags.is_empty());
    }

    #[test]
    fn tag_order_is_insertion_order() {
        let mut item =
            CapturedItem::new_image("data:image/png;base64,AA==".into(), "Image 1 (10:00)".into());
        item.add_tag("zebra");
        item.add_tag("apple");
        item.add_tag("mango");
        assert_eq!(item.tags, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn collection_keys() {
        assert_eq!(ItemKind::Image.collection_key(), "images");
        assert_eq!(ItemKind::Text.collection_key(), "texts");
        assert_eq!(ItemKind::Image.label_prefix(), "Image");
        assert_eq!(ItemKind::Text.label_prefix(), "Text");
    }

    #[test]
    fn serde_round_trip_preserves_kind_tag() {
        let item = CapturedItem::new_text("abc".into(), "Text 1 (09:30)".into());
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"kind\":\"text\""));
        let back: CapturedItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, item.id);
        assert_eq!(back.content, "abc");
    }
}
