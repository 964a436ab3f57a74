mod resource;
mod types;

pub use types::*;

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::Resource;

    fn task() -> Task {
        let draft = TaskDraft {
            title: "Siapkan laporan".to_string(),
            description: String::new(),
            status: None,
            priority: TaskPriority::High,
            assigned_to: Some("u2".to_string()),
            due_date: None,
            tags: vec!["laporan".into(), " laporan ".into(), "q1".into()],
        };
        Task::from_draft("t1".into(), draft, "u1", Utc::now()).unwrap()
    }

    #[test]
    fn completed_at_follows_status() {
        let mut t = task();
        let done = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        t.set_status(TaskStatus::Completed, done);
        assert_eq!(t.completed_at, Some(done));

        // Re-completing keeps the original stamp.
        t.set_status(TaskStatus::Completed, done + Duration::hours(1));
        assert_eq!(t.completed_at, Some(done));

        t.set_status(TaskStatus::InProgress, done + Duration::hours(2));
        assert_eq!(t.completed_at, None);
    }

    #[test]
    fn draft_created_completed_gets_stamp() {
        let now = Utc::now();
        let draft = TaskDraft {
            title: "Arsip".into(),
            description: String::new(),
            status: Some(TaskStatus::Completed),
            priority: TaskPriority::Low,
            assigned_to: None,
            due_date: None,
            tags: vec![],
        };
        let t = Task::from_draft("t2".into(), draft, "u1", now).unwrap();
        assert_eq!(t.completed_at, Some(now));
    }

    #[test]
    fn tags_are_deduplicated() {
        assert_eq!(task().tags, vec!["laporan", "q1"]);
    }

    #[test]
    fn empty_assignee_unassigns() {
        let mut t = task();
        let patch = TaskPatch {
            assigned_to: Some(String::new()),
            ..Default::default()
        };
        t.apply_patch(patch, Utc::now()).unwrap();
        assert_eq!(t.assigned_to, None);
    }

    #[test]
    fn overdue_only_while_open() {
        let mut t = task();
        let now = Utc::now();
        t.due_date = Some(now - Duration::days(1));
        assert!(t.is_overdue(now));
        t.set_status(TaskStatus::Completed, now);
        assert!(!t.is_overdue(now));
    }

    #[test]
    fn tag_facet_lists_every_tag() {
        assert_eq!(task().facet_values("tags"), vec!["laporan", "q1"]);
    }
}
