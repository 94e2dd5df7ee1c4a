//! Platform integrations

#[cfg(feature = "system-clipboard")]
pub mod clipboard;

#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
