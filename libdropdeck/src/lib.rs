//! Dropdeck - local scheduling and publish pipeline for short-video drops
//!
//! This library provides the core functionality behind the Dropdeck tools:
//! a JSON-backed task store, a guarded task lifecycle, deterministic caption
//! composition, calendar views, and single-shot publish dispatch.

pub mod composer;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod publisher;
pub mod schedule;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{DropdeckError, Result};
pub use lifecycle::{LifecycleManager, TaskEdits};
pub use store::{JsonFileStore, MemoryStore, TaskStore};
pub use types::{TaskDraft, TaskStatus, VideoTask};
