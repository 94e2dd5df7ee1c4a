//! Cross-cutting monitoring state
//!
//! Focus gate, shared in-flight read counter and the sticky permission
//! flag. All reads go through accessors on `MonitorGate` instead of
//! ambient flags scattered across components.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Cap on simultaneous outstanding clipboard reads, across both kinds
pub const MAX_CONCURRENT_READS: usize = 2;

/// Shared gate consulted by every poll tick
pub struct MonitorGate {
    /// Whether the host document/window currently has input focus
    focused: AtomicBool,
    /// Outstanding clipboard read operations, both kinds combined
    in_flight: AtomicUsize,
    /// Sticky "clipboard permission needed" banner state
    permission_needed: AtomicBool,
}

impl MonitorGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            focused: AtomicBool::new(true),
            in_flight: AtomicUsize::new(0),
            permission_needed: AtomicBool::new(false),
        })
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    /// Try to reserve an in-flight read slot
    ///
    /// Returns `None` when the concurrency cap is reached; the tick is
    /// skipped entirely, not queued. The permit releases its slot on drop.
    pub fn try_acquire_read(self: &Arc<Self>) -> Option<ReadPermit> {
        let result = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                if current < MAX_CONCURRENT_READS {
                    Some(current + 1)
                } else {
                    None
                }
            });
        result.ok().map(|_| ReadPermit {
            gate: Arc::clone(self),
        })
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Forcibly zero the in-flight counter (full monitoring reset)
    ///
    /// Permits still alive from before the reset will not underflow the
    /// counter; their release saturates at zero.
    pub fn reset_in_flight(&self) {
        self.in_flight.store(0, Ordering::SeqCst);
    }

    pub fn set_permission_needed(&self, needed: bool) {
        self.permission_needed.store(needed, Ordering::SeqCst);
    }

    pub fn permission_needed(&self) -> bool {
        self.permission_needed.load(Ordering::SeqCst)
    }
}

/// RAII slot in the shared read counter
pub struct ReadPermit {
    gate: Arc<MonitorGate>,
}

impl Drop for ReadPermit {
    fn drop(&mut self) {
        let _ = self
            .gate
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_sub(1))
            });
    }
}
