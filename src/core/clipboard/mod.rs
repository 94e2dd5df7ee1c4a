//! Clipboard capture core
//!
//! Polling monitors detect clipboard changes, the pipeline deduplicates
//! and labels them, and the coordinator wires the lifecycle together.

pub mod coordinator;
pub mod fingerprint;
pub mod monitor;
pub mod pipeline;
pub mod source;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

pub use coordinator::MonitorCoordinator;
pub use monitor::{MonitorPhase, MonitorSettings, PollMonitor};
pub use pipeline::CapturePipeline;
pub use source::{parse_data_url, to_data_url, ClipboardPayload, ClipboardSource};
pub use state::{MonitorGate, ReadPermit, MAX_CONCURRENT_READS};
