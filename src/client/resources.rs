//! Per-entity conveniences on top of [`RemoteCollection`].

use serde_json::Value;

use crate::client::{ApiRequest, Backend, RemoteCollection};
use crate::models::{
    Meeting, MeetingPatch, MeetingStatus, Notulensi, Record, Task, TaskPatch, TaskStatus,
};

impl<B: Backend> RemoteCollection<Meeting, B> {
    pub async fn update_meeting_status(&self, id: &str, status: MeetingStatus) -> Option<Meeting> {
        self.update(id, &MeetingPatch::status(status)).await
    }

    pub fn upcoming(&self) -> Vec<Meeting> {
        self.items()
            .into_iter()
            .filter(|m| m.status == MeetingStatus::Scheduled)
            .collect()
    }
}

impl<B: Backend> RemoteCollection<Task, B> {
    pub async fn update_task_status(&self, id: &str, status: TaskStatus) -> Option<Task> {
        self.update(id, &TaskPatch::status(status)).await
    }

    pub fn assigned_to(&self, user_id: &str) -> Vec<Task> {
        self.items()
            .into_iter()
            .filter(|t| t.assigned_to.as_deref() == Some(user_id))
            .collect()
    }
}

impl<B: Backend> RemoteCollection<Notulensi, B> {
    /// POST /notulensi/{id}/approve, then swap the approved record in.
    pub async fn approve_notulensi(&self, id: &str) -> Option<Notulensi> {
        let request = ApiRequest::post(
            format!("/{}/{id}/approve", Notulensi::COLLECTION),
            Value::Object(Default::default()),
        );
        let approved: Notulensi = self.call(request, "Failed to approve notulensi").await?;
        self.replace_local(&approved);
        Some(approved)
    }

    pub fn drafts(&self) -> Vec<Notulensi> {
        self.items().into_iter().filter(|n| n.is_draft).collect()
    }

    pub fn published(&self) -> Vec<Notulensi> {
        self.items().into_iter().filter(|n| !n.is_draft).collect()
    }
}
