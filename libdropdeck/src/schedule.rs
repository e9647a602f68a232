//! Scheduling views
//!
//! Read-only projections over the task collection. Nothing here mutates or
//! schedules anything; callers recompute these from a fresh store snapshot
//! whenever it changes.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::types::{TaskStatus, VideoTask};

/// Group tasks by date, each bucket ordered by time ascending. The sort is
/// stable, so re-running on an unchanged collection yields identical
/// grouping and ordering.
pub fn day_buckets(tasks: &[VideoTask]) -> BTreeMap<NaiveDate, Vec<VideoTask>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<VideoTask>> = BTreeMap::new();
    for task in tasks {
        buckets.entry(task.date).or_default().push(task.clone());
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| a.time.cmp(&b.time));
    }
    buckets
}

/// The 7 calendar days starting at `today`, each paired with its bucket
/// (possibly empty).
pub fn upcoming_window(
    tasks: &[VideoTask],
    today: NaiveDate,
) -> Vec<(NaiveDate, Vec<VideoTask>)> {
    let buckets = day_buckets(tasks);
    (0..7)
        .map(|offset| {
            let day = today + Duration::days(offset);
            (day, buckets.get(&day).cloned().unwrap_or_default())
        })
        .collect()
}

/// Tasks whose scheduled instant is strictly before `now` and whose status
/// is not `published`, ordered by scheduled instant. Deliberately
/// independent of status otherwise: a task stuck in `publishing` past its
/// slot shows up here too, so stalled work is always visible.
pub fn overdue(tasks: &[VideoTask], now: NaiveDateTime) -> Vec<VideoTask> {
    let mut late: Vec<VideoTask> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Published)
        .filter(|t| matches!(t.scheduled_instant(), Some(at) if at < now))
        .cloned()
        .collect();
    late.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
    late
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskDraft, VideoTask};

    fn task_at(date: &str, time: &str, status: TaskStatus) -> VideoTask {
        let mut task = VideoTask::stage(
            TaskDraft {
                date: date.parse().unwrap(),
                time: time.to_string(),
                title: format!("{} {}", date, time),
                caption: String::new(),
                notes: String::new(),
                hashtags: Vec::new(),
                video_url: "https://cdn.example.com/v.mp4".to_string(),
                autopost: false,
            },
            0,
        );
        task.status = status;
        task
    }

    #[test]
    fn test_day_buckets_groups_and_sorts_by_time() {
        let tasks = vec![
            task_at("2026-06-02", "18:00", TaskStatus::Ready),
            task_at("2026-06-01", "09:00", TaskStatus::Ready),
            task_at("2026-06-02", "07:30", TaskStatus::Queued),
        ];

        let buckets = day_buckets(&tasks);
        assert_eq!(buckets.len(), 2);

        let june2: NaiveDate = "2026-06-02".parse().unwrap();
        let june2 = &buckets[&june2];
        assert_eq!(june2.len(), 2);
        assert_eq!(june2[0].time, "07:30");
        assert_eq!(june2[1].time, "18:00");
    }

    #[test]
    fn test_day_buckets_idempotent() {
        let tasks = vec![
            task_at("2026-06-01", "12:00", TaskStatus::Ready),
            task_at("2026-06-01", "12:00", TaskStatus::Queued),
            task_at("2026-06-01", "08:00", TaskStatus::Draft),
        ];
        let first = day_buckets(&tasks);
        let second = day_buckets(&tasks);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_date_time_pairs_are_allowed() {
        let tasks = vec![
            task_at("2026-06-01", "12:00", TaskStatus::Ready),
            task_at("2026-06-01", "12:00", TaskStatus::Ready),
        ];
        let buckets = day_buckets(&tasks);
        let june1: NaiveDate = "2026-06-01".parse().unwrap();
        assert_eq!(buckets[&june1].len(), 2);
    }

    #[test]
    fn test_upcoming_window_is_seven_days_with_empty_buckets() {
        let today: NaiveDate = "2026-06-01".parse().unwrap();
        let tasks = vec![
            task_at("2026-06-03", "10:00", TaskStatus::Ready),
            // Outside the window in both directions.
            task_at("2026-05-31", "10:00", TaskStatus::Ready),
            task_at("2026-06-08", "10:00", TaskStatus::Ready),
        ];

        let window = upcoming_window(&tasks, today);
        assert_eq!(window.len(), 7);
        assert_eq!(window[0].0, today);
        assert_eq!(window[6].0, "2026-06-07".parse().unwrap());

        assert!(window[0].1.is_empty());
        assert_eq!(window[2].1.len(), 1);
        assert!(window.iter().all(|(_, bucket)| bucket
            .iter()
            .all(|t| t.date >= today)));
    }

    #[test]
    fn test_overdue_membership_by_time_not_status() {
        let now: NaiveDateTime = "2026-06-02T12:00:00".parse().unwrap();

        let yesterday_ready = task_at("2026-06-01", "10:00", TaskStatus::Ready);
        let yesterday_published = task_at("2026-06-01", "10:00", TaskStatus::Published);
        let yesterday_failed = task_at("2026-06-01", "10:00", TaskStatus::Failed);
        let stuck_publishing = task_at("2026-06-01", "23:00", TaskStatus::Publishing);
        let tomorrow_draft = task_at("2026-06-03", "10:00", TaskStatus::Draft);
        let tomorrow_failed = task_at("2026-06-03", "10:00", TaskStatus::Failed);

        let tasks = vec![
            yesterday_ready.clone(),
            yesterday_published,
            yesterday_failed.clone(),
            stuck_publishing.clone(),
            tomorrow_draft,
            tomorrow_failed,
        ];

        let late = overdue(&tasks, now);
        let late_ids: Vec<&str> = late.iter().map(|t| t.id.as_str()).collect();

        assert!(late_ids.contains(&yesterday_ready.id.as_str()));
        assert!(late_ids.contains(&yesterday_failed.id.as_str()));
        // Stuck publishing work surfaces too.
        assert!(late_ids.contains(&stuck_publishing.id.as_str()));
        assert_eq!(late.len(), 3, "published and future tasks excluded");
    }

    #[test]
    fn test_overdue_boundary_is_strict() {
        let now: NaiveDateTime = "2026-06-01T10:00:00".parse().unwrap();
        let exactly_now = task_at("2026-06-01", "10:00", TaskStatus::Ready);
        assert!(overdue(&[exactly_now], now).is_empty());
    }

    #[test]
    fn test_overdue_sorted_by_scheduled_instant() {
        let now: NaiveDateTime = "2026-06-05T00:00:00".parse().unwrap();
        let tasks = vec![
            task_at("2026-06-02", "09:00", TaskStatus::Ready),
            task_at("2026-06-01", "22:00", TaskStatus::Ready),
            task_at("2026-06-02", "08:00", TaskStatus::Ready),
        ];

        let late = overdue(&tasks, now);
        let order: Vec<(&str, &str)> = late
            .iter()
            .map(|t| (t.title.split(' ').next().unwrap(), t.time.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2026-06-01", "22:00"),
                ("2026-06-02", "08:00"),
                ("2026-06-02", "09:00"),
            ]
        );
    }

    #[test]
    fn test_overdue_ignores_unparseable_time() {
        let now: NaiveDateTime = "2026-06-05T00:00:00".parse().unwrap();
        let mut task = task_at("2026-06-01", "10:00", TaskStatus::Ready);
        task.time = "whenever".to_string();
        assert!(overdue(&[task], now).is_empty());
    }
}
