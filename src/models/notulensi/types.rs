use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{MeetingSummary, Record, RecordId, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl ActionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionPriority::Low => "low",
            ActionPriority::Medium => "medium",
            ActionPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Pending,
    Completed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Completed => "completed",
        }
    }
}

/// Follow-up recorded in the minutes. Separate from [`crate::models::Task`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: RecordId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: ActionPriority,
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserSummary>,
}

impl ActionItem {
    /// `completed_at` is only ever present on completed items.
    pub fn set_status(&mut self, status: ActionStatus, now: DateTime<Utc>) {
        match status {
            ActionStatus::Completed => {
                if self.status != ActionStatus::Completed || self.completed_at.is_none() {
                    self.completed_at = Some(now);
                }
            }
            ActionStatus::Pending => self.completed_at = None,
        }
        self.status = status;
    }
}

/// Approver and approval time travel together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub approved_by: RecordId,
    pub approved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notulensi {
    pub id: RecordId,
    pub meeting_id: RecordId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_meeting_date: Option<DateTime<Utc>>,
    pub created_by: RecordId,
    #[serde(flatten)]
    pub approval: Option<Approval>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<UserSummary>,
}

impl Notulensi {
    pub fn is_approved(&self) -> bool {
        self.approval.is_some()
    }

    /// Finalise: record the approver and publish.
    pub fn approve(&mut self, approver: &str, now: DateTime<Utc>) {
        self.approval = Some(Approval {
            approved_by: approver.to_string(),
            approved_at: now,
        });
        self.is_draft = false;
        self.updated_at = now;
    }
}

impl Record for Notulensi {
    const COLLECTION: &'static str = "notulensi";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Action item as submitted by forms. Items carrying an `id` update the
/// existing item; items without one are new.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionItemInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: ActionPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionStatus>,
}

fn default_true() -> bool {
    true
}

/// POST /api/notulensi body. New minutes start as drafts unless told otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotulensiDraft {
    pub meeting_id: RecordId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_meeting_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub action_items: Vec<ActionItemInput>,
    #[serde(default = "default_true")]
    pub is_draft: bool,
}

/// PUT /api/notulensi/{id} body. `action_items`, when present, replaces the list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotulensiPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_meeting_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_items: Option<Vec<ActionItemInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
}
