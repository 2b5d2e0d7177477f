//! Configuration management for float-pager
//!
//! This module provides the settings layers:
//! - **store**: the durable key/value service (JSON file or in-memory)
//! - **prefs**: typed per-key accessors with documented defaults
//! - **overlay**: the `OverlaySettings` value object read by the controller

pub mod overlay;
pub mod prefs;
pub mod store;

// Re-export commonly used types
pub use overlay::OverlaySettings;
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
