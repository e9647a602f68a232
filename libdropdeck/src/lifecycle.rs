//! Task lifecycle management
//!
//! Owns the status state machine. Every mutation is a read-modify-write of
//! the full collection through the injected store, so each writer merges
//! against the latest snapshot before replacing it.
//!
//! Guarded transitions:
//!
//! ```text
//! draft|ready|queued -> publishing -> published
//!                                  -> failed -> ready (manual reset)
//! ```
//!
//! The ready/queued toggle bypasses the guards on purpose; it goes through
//! [`LifecycleManager::force_set_status`], which is kept separate from the
//! guarded publish path.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{DropdeckError, Result};
use crate::store::TaskStore;
use crate::types::{normalize_hashtags, TaskDraft, TaskStatus, VideoTask};

pub struct LifecycleManager {
    store: Arc<dyn TaskStore>,
}

/// Operator field edits. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskEdits {
    pub date: Option<chrono::NaiveDate>,
    pub time: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub notes: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub video_url: Option<String>,
}

impl LifecycleManager {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Snapshot of the full collection.
    pub async fn tasks(&self) -> Vec<VideoTask> {
        self.store.load().await
    }

    pub async fn get(&self, id: &str) -> Result<VideoTask> {
        self.store
            .load()
            .await
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| DropdeckError::UnknownTask(id.to_string()))
    }

    /// Stage a new task. Status is seeded from `autopost`: `queued` when
    /// set, `ready` otherwise.
    pub async fn stage(&self, draft: TaskDraft) -> Result<VideoTask> {
        validate_draft(&draft)?;
        let task = VideoTask::stage(draft, Utc::now().timestamp());

        let mut tasks = self.store.load().await;
        tasks.push(task.clone());
        self.persist(&tasks).await;

        info!("Staged task {} ({})", task.id, task.title);
        Ok(task)
    }

    /// Enter `publishing`. Only `draft`, `ready`, and `queued` tasks may
    /// begin a publish attempt.
    pub async fn begin_publish(&self, id: &str) -> Result<VideoTask> {
        self.transition(id, |task| match task.status {
            TaskStatus::Draft | TaskStatus::Ready | TaskStatus::Queued => {
                task.status = TaskStatus::Publishing;
                Ok(())
            }
            from => Err(DropdeckError::Transition {
                from,
                action: "publish",
            }),
        })
        .await
    }

    /// Confirmed success from the dispatcher. Notes record the external
    /// system's media identifier, or the literal `unknown` when absent.
    pub async fn complete_publish(&self, id: &str, media_id: Option<&str>) -> Result<VideoTask> {
        let note = media_id.unwrap_or("unknown").to_string();
        self.transition(id, move |task| match task.status {
            TaskStatus::Publishing => {
                task.status = TaskStatus::Published;
                task.notes = note;
                Ok(())
            }
            from => Err(DropdeckError::Transition {
                from,
                action: "complete",
            }),
        })
        .await
    }

    /// Dispatch error. Notes record the failure reason for the operator.
    pub async fn fail_publish(&self, id: &str, reason: &str) -> Result<VideoTask> {
        let reason = reason.to_string();
        self.transition(id, move |task| match task.status {
            TaskStatus::Publishing => {
                task.status = TaskStatus::Failed;
                task.notes = reason;
                Ok(())
            }
            from => Err(DropdeckError::Transition { from, action: "fail" }),
        })
        .await
    }

    /// Manual recovery: `failed -> ready`. Never triggered automatically.
    pub async fn reset_failed(&self, id: &str) -> Result<VideoTask> {
        self.transition(id, |task| match task.status {
            TaskStatus::Failed => {
                task.status = TaskStatus::Ready;
                Ok(())
            }
            from => Err(DropdeckError::Transition {
                from,
                action: "reset",
            }),
        })
        .await
    }

    /// Unchecked status write. This is the operator escape hatch; it skips
    /// the state machine guards by design.
    pub async fn force_set_status(&self, id: &str, status: TaskStatus) -> Result<VideoTask> {
        self.transition(id, move |task| {
            task.status = status;
            Ok(())
        })
        .await
    }

    /// Flip between `ready` and `queued`: a `ready` task becomes `queued`,
    /// anything else becomes `ready`.
    pub async fn toggle(&self, id: &str) -> Result<VideoTask> {
        let current = self.get(id).await?;
        let next = if current.status == TaskStatus::Ready {
            TaskStatus::Queued
        } else {
            TaskStatus::Ready
        };
        self.force_set_status(id, next).await
    }

    /// Apply operator field edits.
    pub async fn update(&self, id: &str, edits: TaskEdits) -> Result<VideoTask> {
        if let Some(time) = &edits.time {
            validate_time(time)?;
        }
        if let Some(url) = &edits.video_url {
            validate_video_url(url)?;
        }
        self.transition(id, move |task| {
            if let Some(date) = edits.date {
                task.date = date;
            }
            if let Some(time) = edits.time {
                task.time = time;
            }
            if let Some(title) = edits.title {
                task.title = title;
            }
            if let Some(caption) = edits.caption {
                task.caption = caption;
            }
            if let Some(notes) = edits.notes {
                task.notes = notes;
            }
            if let Some(hashtags) = edits.hashtags {
                task.hashtags = normalize_hashtags(hashtags);
            }
            if let Some(url) = edits.video_url {
                task.video_url = url;
            }
            Ok(())
        })
        .await
    }

    /// Remove a task. Tasks are only ever removed explicitly; nothing is
    /// archived or garbage-collected.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut tasks = self.store.load().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(DropdeckError::UnknownTask(id.to_string()));
        }
        self.persist(&tasks).await;
        info!("Deleted task {}", id);
        Ok(())
    }

    /// Read-modify-write of the full collection. `updated_at` is refreshed
    /// on every successful mutation.
    async fn transition<F>(&self, id: &str, apply: F) -> Result<VideoTask>
    where
        F: FnOnce(&mut VideoTask) -> Result<()>,
    {
        let mut tasks = self.store.load().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DropdeckError::UnknownTask(id.to_string()))?;

        apply(task)?;
        task.updated_at = Utc::now().timestamp();
        let updated = task.clone();

        self.persist(&tasks).await;
        Ok(updated)
    }

    /// A failed write degrades to a warning: the in-memory state remains
    /// authoritative for the session and the operator is not blocked. The
    /// session risks data loss on reload; that trade-off is deliberate.
    async fn persist(&self, tasks: &[VideoTask]) {
        if let Err(e) = self.store.replace(tasks).await {
            warn!("Failed to persist task store: {}", e);
        }
    }
}

fn validate_draft(draft: &TaskDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(DropdeckError::InvalidInput(
            "Title cannot be empty".to_string(),
        ));
    }
    validate_time(&draft.time)?;
    validate_video_url(&draft.video_url)?;
    Ok(())
}

fn validate_time(time: &str) -> Result<()> {
    let parsed = chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| DropdeckError::InvalidInput(format!("Invalid time '{}', expected HH:MM", time)))?;
    // Fixed-width form keeps lexicographic ordering chronological.
    if parsed.format("%H:%M").to_string() != time {
        return Err(DropdeckError::InvalidInput(format!(
            "Invalid time '{}', expected HH:MM",
            time
        )));
    }
    Ok(())
}

fn validate_video_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(DropdeckError::InvalidInput(
            "Video URL cannot be empty".to_string(),
        ));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(DropdeckError::InvalidInput(format!(
            "Video URL must be http(s): {}",
            url
        )));
    }
    Ok(())
}
