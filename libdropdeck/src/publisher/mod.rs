//! Publish dispatch
//!
//! One task, one request. The dispatcher moves a task to `publishing`,
//! issues a single call to the publish boundary, and records the outcome on
//! that task alone. There is no retry, no backoff, and no attempt cap: each
//! dispatch is exactly one attempt, and an issued request always runs to
//! completion.

pub mod endpoint;
pub mod instagram;
pub mod mock;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DropdeckError, PublishError, Result};
use crate::lifecycle::LifecycleManager;
use crate::types::VideoTask;

/// Fallback note when a failure carries no usable message.
const FALLBACK_REASON: &str = "publish request failed";

/// Outbound payload for the publish boundary. Serializes camelCase to match
/// the wire contract of the publish route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPayload {
    pub video_url: String,
    pub caption: String,
}

/// What the boundary reported back on success.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReceipt {
    pub media_id: Option<String>,
    pub message: String,
}

/// The opaque external publish boundary.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    /// Issue exactly one publish request for the payload.
    async fn publish(&self, payload: &PublishPayload) -> Result<PublishReceipt>;

    /// Lowercase identifier for logs.
    fn name(&self) -> &str;
}

/// Build the outbound payload for a task: the video URL verbatim, and the
/// caption followed by a blank line and the space-joined hashtags (the
/// suffix only when there are any).
pub fn build_payload(task: &VideoTask) -> PublishPayload {
    let caption = if task.hashtags.is_empty() {
        task.caption.clone()
    } else {
        format!("{}\n\n{}", task.caption, task.hashtags.join(" "))
    };
    PublishPayload {
        video_url: task.video_url.clone(),
        caption,
    }
}

/// Dispatches single publish attempts and feeds the outcome back into the
/// lifecycle manager.
pub struct Dispatcher {
    lifecycle: Arc<LifecycleManager>,
    target: Arc<dyn PublishTarget>,
    in_flight: Mutex<HashSet<String>>,
}

impl Dispatcher {
    pub fn new(lifecycle: Arc<LifecycleManager>, target: Arc<dyn PublishTarget>) -> Self {
        Self {
            lifecycle,
            target,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Publish one task. The task ends in `published` or `failed` unless the
    /// transition into `publishing` itself was rejected. Mutates exactly one
    /// task's record and never touches others.
    ///
    /// A second dispatch for the same id while one is outstanding is
    /// rejected up front, before any state mutation.
    pub async fn dispatch(&self, id: &str) -> Result<VideoTask> {
        let _guard = InFlight::acquire(&self.in_flight, id)?;

        let task = self.lifecycle.begin_publish(id).await?;
        let payload = build_payload(&task);

        info!("Dispatching task {} to {}", id, self.target.name());
        match self.target.publish(&payload).await {
            Ok(receipt) => {
                info!("Task {} published: {}", id, receipt.message);
                self.lifecycle
                    .complete_publish(id, receipt.media_id.as_deref())
                    .await
            }
            Err(e) => {
                let reason = failure_reason(&e);
                warn!("Task {} failed to publish: {}", id, reason);
                self.lifecycle.fail_publish(id, &reason).await
            }
        }
    }
}

/// The note recorded on a failed task: the boundary's own message where one
/// exists, a generic fallback otherwise.
fn failure_reason(error: &DropdeckError) -> String {
    match error {
        DropdeckError::Publish(
            PublishError::Validation(message)
            | PublishError::Network(message)
            | PublishError::Upstream(message),
        ) => {
            if message.trim().is_empty() {
                FALLBACK_REASON.to_string()
            } else {
                message.clone()
            }
        }
        other => other.to_string(),
    }
}

/// Per-task mutual exclusion, held for the duration of one dispatch.
#[derive(Debug)]
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<String>>, id: &str) -> Result<Self> {
        let mut held = set.lock().unwrap_or_else(|e| e.into_inner());
        if !held.insert(id.to_string()) {
            return Err(DropdeckError::PublishInFlight(id.to_string()));
        }
        Ok(Self {
            set,
            id: id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut held = self.set.lock().unwrap_or_else(|e| e.into_inner());
        held.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskDraft, VideoTask};
    use chrono::NaiveDate;

    fn task_with(caption: &str, hashtags: Vec<String>) -> VideoTask {
        VideoTask::stage(
            TaskDraft {
                date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                time: "08:00".to_string(),
                title: "t".to_string(),
                caption: caption.to_string(),
                notes: String::new(),
                hashtags,
                video_url: "https://cdn.example.com/v.mp4".to_string(),
                autopost: true,
            },
            0,
        )
    }

    #[test]
    fn test_build_payload_appends_hashtag_block() {
        let task = task_with("Fresh drop", vec!["#a".to_string(), "#b".to_string()]);
        let payload = build_payload(&task);
        assert_eq!(payload.video_url, "https://cdn.example.com/v.mp4");
        assert_eq!(payload.caption, "Fresh drop\n\n#a #b");
    }

    #[test]
    fn test_build_payload_without_hashtags_is_caption_verbatim() {
        let task = task_with("Just the caption", Vec::new());
        assert_eq!(build_payload(&task).caption, "Just the caption");
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = PublishPayload {
            video_url: "https://x/v.mp4".to_string(),
            caption: "c".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["videoUrl"], "https://x/v.mp4");
        assert!(json.get("video_url").is_none());
    }

    #[test]
    fn test_failure_reason_unwraps_boundary_message() {
        let error = DropdeckError::Publish(PublishError::Upstream("rate limited".to_string()));
        assert_eq!(failure_reason(&error), "rate limited");

        let error = DropdeckError::Publish(PublishError::Network("dns failure".to_string()));
        assert_eq!(failure_reason(&error), "dns failure");
    }

    #[test]
    fn test_failure_reason_falls_back_on_blank_message() {
        let error = DropdeckError::Publish(PublishError::Upstream("  ".to_string()));
        assert_eq!(failure_reason(&error), FALLBACK_REASON);
    }

    #[test]
    fn test_in_flight_guard_blocks_second_acquire() {
        let set = Mutex::new(HashSet::new());
        let guard = InFlight::acquire(&set, "task-1").unwrap();

        assert!(matches!(
            InFlight::acquire(&set, "task-1").unwrap_err(),
            DropdeckError::PublishInFlight(_)
        ));
        // A different task is unaffected.
        assert!(InFlight::acquire(&set, "task-2").is_ok());

        drop(guard);
        assert!(InFlight::acquire(&set, "task-1").is_ok());
    }
}
