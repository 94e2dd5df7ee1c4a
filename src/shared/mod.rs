//! Shared types, errors and events used across the core

pub mod errors;
pub mod events;
pub mod types;
