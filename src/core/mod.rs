pub mod clipboard;
pub mod store;
