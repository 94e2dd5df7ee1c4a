//! Auto-label counters
//!
//! Each kind gets a monotonically increasing counter used to mint labels
//! like "Image 12 (14:05)". On load the counter is seeded well past the
//! highest number found in persisted labels so fresh labels never collide
//! with migrated data.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use regex::Regex;

use crate::shared::types::ItemKind;

/// Seed margin over the highest persisted label number
const SEED_GAP: u64 = 10;

/// Monotonic per-kind label counter
pub struct LabelCounter {
    kind: ItemKind,
    value: AtomicU64,
}

impl LabelCounter {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            value: AtomicU64::new(0),
        }
    }

    /// Mint the next label: "Prefix N (HH:MM)"
    pub fn next_label(&self) -> String {
        let n = self.value.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Local::now();
        format!("{} {} ({})", self.kind.label_prefix(), n, now.format("%H:%M"))
    }

    /// Current counter value (last minted number)
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Seed the counter from labels parsed out of persisted data
    ///
    /// Explicit load-time migration routine: labels like "Image 7 (...)"
    /// push the counter to at least 7 + 10. Labels that do not match the
    /// pattern count as 0, so any loaded data seeds at least `SEED_GAP`.
    /// Seeding never lowers the counter.
    pub fn seed_from_labels<'a, I>(&self, labels: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        // The pattern only depends on the kind prefix, which is static.
        let pattern = format!(r"{} (\d+)", self.kind.label_prefix());
        let re = Regex::new(&pattern).expect("label pattern is valid");

        let mut seen_any = false;
        let mut max_number: u64 = 0;
        for label in labels {
            seen_any = true;
            if let Some(caps) = re.captures(label) {
                if let Ok(n) = caps[1].parse::<u64>() {
                    max_number = max_number.max(n);
                }
            }
        }

        if seen_any {
            self.value.fetch_max(max_number + SEED_GAP, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn labels_count_up_from_one() {
        let counter = LabelCounter::new(ItemKind::Text);
        let first = counter.next_label();
        let second = counter.next_label();
        assert!(first.starts_with("Text 1 ("));
        assert!(second.starts_with("Text 2 ("));
    }

    #[test]
    fn seeding_jumps_past_persisted_numbers() {
        let counter = LabelCounter::new(ItemKind::Image);
        counter.seed_from_labels(["Image 7 (09:12)", "Image 3 (08:00)", "holiday snap"]);
        assert_eq!(counter.current(), 17);
        assert!(counter.next_label().starts_with("Image 18 ("));
    }

    #[test]
    fn seeding_with_unnumbered_labels_still_leaves_a_gap() {
        let counter = LabelCounter::new(ItemKind::Text);
        counter.seed_from_labels(["shopping list", "meeting notes"]);
        assert_eq!(counter.current(), 10);
    }

    #[test]
    fn seeding_nothing_is_a_no_op() {
        let counter = LabelCounter::new(ItemKind::Text);
        counter.seed_from_labels(std::iter::empty::<&str>());
        assert_eq!(counter.current(), 0);
        assert!(counter.next_label().starts_with("Text 1 ("));
    }

    #[test]
    fn seeding_never_lowers_the_counter() {
        let counter = LabelCounter::new(ItemKind::Image);
        counter.seed_from_labels(["Image 40 (10:00)"]);
        counter.seed_from_labels(["Image 2 (10:01)"]);
        assert_eq!(counter.current(), 50);
    }

    #[test]
    fn label_format_includes_time() {
        let counter = LabelCounter::new(ItemKind::Image);
        let label = counter.next_label();
        let re = Regex::new(r"^Image 1 \(\d{2}:\d{2}\)$").unwrap();
        assert!(re.is_match(&label), "unexpected label: {}", label);
    }
}
