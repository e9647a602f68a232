//! Core types for Dropdeck

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single scheduled video-publish task (a "drop").
///
/// This is the sole persisted entity. Field names serialize camelCase to
/// match the persisted store layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoTask {
    /// UUID v4, generated at staging, immutable.
    pub id: String,
    /// Calendar date the drop is scheduled for.
    pub date: NaiveDate,
    /// Time of day as a fixed `HH:MM` string. Lexicographic order is
    /// chronological order within a day.
    pub time: String,
    pub title: String,
    pub caption: String,
    /// Free text; the lifecycle manager overwrites this with the media id
    /// on publish success and the failure reason on publish failure.
    pub notes: String,
    /// Ordered, each entry trimmed and non-empty. Duplicates allowed.
    pub hashtags: Vec<String>,
    /// Must be publicly dereferenceable at publish time; reachability is
    /// never checked at staging.
    pub video_url: String,
    /// Determines the initial status only.
    pub autopost: bool,
    pub status: TaskStatus,
    pub created_at: i64,
    /// Refreshed on every mutation.
    pub updated_at: i64,
}

impl VideoTask {
    /// Build a new task from operator input. Status is seeded from
    /// `autopost`: `queued` when set, `ready` otherwise.
    pub fn stage(draft: TaskDraft, now: i64) -> Self {
        let status = if draft.autopost {
            TaskStatus::Queued
        } else {
            TaskStatus::Ready
        };
        Self {
            id: Uuid::new_v4().to_string(),
            date: draft.date,
            time: draft.time,
            title: draft.title,
            caption: draft.caption,
            notes: draft.notes,
            hashtags: normalize_hashtags(draft.hashtags),
            video_url: draft.video_url,
            autopost: draft.autopost,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// The scheduled instant in local wall-clock terms, or `None` when the
    /// stored time string does not parse as `HH:MM`.
    pub fn scheduled_instant(&self) -> Option<NaiveDateTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M")
            .ok()
            .map(|t| self.date.and_time(t))
    }
}

/// Task status. Guarded transitions live in the lifecycle manager; the
/// ready/queued toggle is a deliberate unchecked escape hatch kept separate
/// from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Draft,
    Ready,
    Queued,
    Publishing,
    Failed,
    Published,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Draft => "draft",
            TaskStatus::Ready => "ready",
            TaskStatus::Queued => "queued",
            TaskStatus::Publishing => "publishing",
            TaskStatus::Failed => "failed",
            TaskStatus::Published => "published",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator input for staging a new task.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub date: NaiveDate,
    pub time: String,
    pub title: String,
    pub caption: String,
    pub notes: String,
    pub hashtags: Vec<String>,
    pub video_url: String,
    pub autopost: bool,
}

/// Trim entries and drop the ones that end up empty. Order is preserved and
/// duplicates are kept.
pub fn normalize_hashtags(hashtags: Vec<String>) -> Vec<String> {
    hashtags
        .into_iter()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(autopost: bool) -> TaskDraft {
        TaskDraft {
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: "09:30".to_string(),
            title: "Launch teaser".to_string(),
            caption: "Big news coming".to_string(),
            notes: String::new(),
            hashtags: vec!["#launch".to_string(), "  #news ".to_string()],
            video_url: "https://cdn.example.com/teaser.mp4".to_string(),
            autopost,
        }
    }

    #[test]
    fn test_stage_generates_unique_uuid() {
        let a = VideoTask::stage(draft(false), 1_700_000_000);
        let b = VideoTask::stage(draft(false), 1_700_000_000);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_stage_status_seeded_from_autopost() {
        assert_eq!(
            VideoTask::stage(draft(true), 0).status,
            TaskStatus::Queued
        );
        assert_eq!(
            VideoTask::stage(draft(false), 0).status,
            TaskStatus::Ready
        );
    }

    #[test]
    fn test_stage_sets_both_timestamps() {
        let task = VideoTask::stage(draft(false), 1_700_000_000);
        assert_eq!(task.created_at, 1_700_000_000);
        assert_eq!(task.updated_at, 1_700_000_000);
    }

    #[test]
    fn test_stage_normalizes_hashtags() {
        let task = VideoTask::stage(draft(false), 0);
        assert_eq!(task.hashtags, vec!["#launch", "#news"]);
    }

    #[test]
    fn test_normalize_hashtags_drops_empty_keeps_duplicates() {
        let result = normalize_hashtags(vec![
            "#a".to_string(),
            "   ".to_string(),
            "#a".to_string(),
            "".to_string(),
        ]);
        assert_eq!(result, vec!["#a", "#a"]);
    }

    #[test]
    fn test_scheduled_instant() {
        let task = VideoTask::stage(draft(false), 0);
        let instant = task.scheduled_instant().unwrap();
        assert_eq!(
            instant,
            NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_scheduled_instant_bad_time_is_none() {
        let mut task = VideoTask::stage(draft(false), 0);
        task.time = "half past nine".to_string();
        assert!(task.scheduled_instant().is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TaskStatus::Publishing).unwrap();
        assert_eq!(json, r#""publishing""#);
        let back: TaskStatus = serde_json::from_str(r#""queued""#).unwrap();
        assert_eq!(back, TaskStatus::Queued);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = VideoTask::stage(draft(true), 42);
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("videoUrl").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("video_url").is_none());
        assert_eq!(json["status"], "queued");
        assert_eq!(json["date"], "2026-03-14");
        assert_eq!(json["time"], "09:30");
    }

    #[test]
    fn test_task_round_trip_preserves_fields() {
        let task = VideoTask::stage(draft(true), 1_700_000_000);
        let json = serde_json::to_string(&task).unwrap();
        let back: VideoTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TaskStatus::Draft.to_string(), "draft");
        assert_eq!(TaskStatus::Published.to_string(), "published");
    }
}
