use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Meeting, MeetingStatus, MeetingSummary, Notulensi, Task, TaskStatus};

const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub meetings_total: usize,
    pub meetings_today: usize,
    pub meetings_upcoming: usize,
    pub tasks_open: usize,
    pub tasks_overdue: usize,
    pub tasks_completed: usize,
    pub notulensi_drafts: usize,
    pub notulensi_awaiting_approval: usize,
    pub my_open_tasks: usize,
    pub upcoming_meetings: Vec<MeetingSummary>,
}

/// Counts for the landing page of `user_id`.
pub fn summarize(
    meetings: &[Meeting],
    tasks: &[Task],
    notulensi: &[Notulensi],
    user_id: &str,
    now: DateTime<Utc>,
) -> DashboardStats {
    let today = now.date_naive();

    let mut upcoming: Vec<&Meeting> = meetings
        .iter()
        .filter(|m| m.date_time >= now && m.status == MeetingStatus::Scheduled)
        .collect();
    upcoming.sort_by_key(|m| m.date_time);

    let week_ahead = now + Duration::days(7);

    DashboardStats {
        meetings_total: meetings.len(),
        meetings_today: meetings
            .iter()
            .filter(|m| m.date_time.date_naive() == today)
            .count(),
        meetings_upcoming: upcoming.iter().filter(|m| m.date_time <= week_ahead).count(),
        tasks_open: tasks.iter().filter(|t| t.status.is_open()).count(),
        tasks_overdue: tasks.iter().filter(|t| t.is_overdue(now)).count(),
        tasks_completed: tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count(),
        notulensi_drafts: notulensi.iter().filter(|n| n.is_draft).count(),
        notulensi_awaiting_approval: notulensi
            .iter()
            .filter(|n| !n.is_draft && !n.is_approved())
            .count(),
        my_open_tasks: tasks
            .iter()
            .filter(|t| t.status.is_open() && t.assigned_to.as_deref() == Some(user_id))
            .count(),
        upcoming_meetings: upcoming
            .into_iter()
            .take(UPCOMING_LIMIT)
            .map(Meeting::summary)
            .collect(),
    }
}
