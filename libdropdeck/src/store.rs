//! Task persistence
//!
//! The store is a single-key JSON container: the full task array is read on
//! load and rewritten wholesale on every mutation. Missing or corrupt data
//! degrades to an empty collection so the operator is never blocked by a bad
//! read. Concurrent writers are not supported; last write wins.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::types::VideoTask;

/// Persistence seam for the task collection. Injected into the lifecycle
/// manager so tests can substitute [`MemoryStore`].
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Load the full task collection. Absent or unreadable prior data yields
    /// an empty collection, never an error; the failure is logged.
    async fn load(&self) -> Vec<VideoTask>;

    /// Replace the full task collection in one write.
    async fn replace(&self, tasks: &[VideoTask]) -> Result<()>;
}

/// File-backed store: one JSON array under one path.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TaskStore for JsonFileStore {
    async fn load(&self) -> Vec<VideoTask> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read task store {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(
                    "Corrupt task store {}, starting empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    async fn replace(&self, tasks: &[VideoTask]) -> Result<()> {
        let raw = serde_json::to_string_pretty(tasks).map_err(StoreError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StoreError::Io)?;
            }
        }

        // Write-then-rename so a reader never observes a half-written array.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await.map_err(StoreError::Io)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StoreError::Io)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    tasks: Mutex<Vec<VideoTask>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<VideoTask>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn load(&self) -> Vec<VideoTask> {
        self.tasks.lock().await.clone()
    }

    async fn replace(&self, tasks: &[VideoTask]) -> Result<()> {
        *self.tasks.lock().await = tasks.to_vec();
        Ok(())
    }
}
