use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Record, RecordId, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::InProgress => "in_progress",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Cancelled => "cancelled",
        }
    }

    pub const ALL: [MeetingStatus; 4] = [
        MeetingStatus::Scheduled,
        MeetingStatus::InProgress,
        MeetingStatus::Completed,
        MeetingStatus::Cancelled,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    #[default]
    Onsite,
    Virtual,
    Hybrid,
}

impl MeetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::Onsite => "onsite",
            MeetingType::Virtual => "virtual",
            MeetingType::Hybrid => "hybrid",
        }
    }

    /// Virtual and hybrid meetings need somewhere to join.
    pub fn needs_link(&self) -> bool {
        !matches!(self, MeetingType::Onsite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Invited,
    Accepted,
    Declined,
    Tentative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: RecordId,
    #[serde(default)]
    pub status: InviteStatus,
    /// Read-only, filled on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl Participant {
    pub fn invited(user_id: impl Into<RecordId>) -> Self {
        Participant {
            user_id: user_id.into(),
            status: InviteStatus::Invited,
            user: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date_time: DateTime<Utc>,
    /// Minutes.
    pub duration: u32,
    #[serde(default)]
    pub status: MeetingStatus,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub meeting_type: MeetingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub agenda: Vec<String>,
    pub created_by: RecordId,
    #[serde(default)]
    pub participants: Vec<Participant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Read-only, filled on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserSummary>,
}

impl Meeting {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.date_time + chrono::Duration::minutes(i64::from(self.duration))
    }

    pub fn summary(&self) -> MeetingSummary {
        MeetingSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            date_time: self.date_time,
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }
}

impl Record for Meeting {
    const COLLECTION: &'static str = "meetings";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Embedded reference to a meeting (used by notulensi).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub id: RecordId,
    pub title: String,
    pub date_time: DateTime<Utc>,
}

fn default_duration() -> u32 {
    60
}

/// POST /api/meetings body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date_time: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub meeting_type: MeetingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub agenda: Vec<String>,
    /// User ids; everyone starts as invited.
    #[serde(default)]
    pub participants: Vec<RecordId>,
}

/// PUT /api/meetings/{id} body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MeetingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<MeetingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
}

impl MeetingPatch {
    pub fn status(status: MeetingStatus) -> Self {
        MeetingPatch {
            status: Some(status),
            ..Default::default()
        }
    }
}
