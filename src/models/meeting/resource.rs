use chrono::{DateTime, Utc};

use super::types::*;
use crate::models::{Lookup, RecordId, Resource, collect_errors};
use crate::query::{ListQuery, SortDir, SortValue, filter};
use crate::validate;

const MAX_DURATION_MINUTES: u32 = 24 * 60;

fn validate_duration(duration: u32) -> Option<String> {
    if duration == 0 || duration > MAX_DURATION_MINUTES {
        Some(format!("Duration must be between 1 and {MAX_DURATION_MINUTES} minutes"))
    } else {
        None
    }
}

fn clean_agenda(agenda: Vec<String>) -> Vec<String> {
    agenda
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn clean_link(link: Option<String>) -> Option<String> {
    link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())
}

impl Resource for Meeting {
    type Draft = MeetingDraft;
    type Patch = MeetingPatch;

    const LABEL: &'static str = "Meeting";
    const DEFAULT_SORT: (&'static str, SortDir) = ("date_time", SortDir::Desc);

    fn from_draft(
        id: RecordId,
        draft: MeetingDraft,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        collect_errors(vec![
            validate::validate_required(&draft.title, "Title", 200),
            validate::validate_optional(&draft.description, "Description", 5000),
            validate::validate_optional(&draft.location, "Location", 200),
            validate_duration(draft.duration),
        ])?;

        let mut participants: Vec<Participant> = Vec::new();
        for user_id in draft.participants {
            if !participants.iter().any(|p| p.user_id == user_id) {
                participants.push(Participant::invited(user_id));
            }
        }

        Ok(Meeting {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            date_time: draft.date_time,
            duration: draft.duration,
            status: MeetingStatus::Scheduled,
            location: draft.location.trim().to_string(),
            meeting_type: draft.meeting_type,
            meeting_link: clean_link(draft.meeting_link),
            agenda: clean_agenda(draft.agenda),
            created_by: actor.to_string(),
            participants,
            created_at: now,
            updated_at: now,
            creator: None,
        })
    }

    fn apply_patch(&mut self, patch: MeetingPatch, now: DateTime<Utc>) -> Result<(), String> {
        if let Some(title) = &patch.title {
            collect_errors(vec![validate::validate_required(title, "Title", 200)])?;
        }
        if let Some(duration) = patch.duration {
            collect_errors(vec![validate_duration(duration)])?;
        }

        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(date_time) = patch.date_time {
            self.date_time = date_time;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(location) = patch.location {
            self.location = location.trim().to_string();
        }
        if let Some(meeting_type) = patch.meeting_type {
            self.meeting_type = meeting_type;
        }
        if patch.meeting_link.is_some() {
            self.meeting_link = clean_link(patch.meeting_link);
        }
        if let Some(agenda) = patch.agenda {
            self.agenda = clean_agenda(agenda);
        }
        if let Some(participants) = patch.participants {
            self.participants = participants
                .into_iter()
                .map(|p| Participant { user: None, ..p })
                .collect();
        }
        self.updated_at = now;
        Ok(())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.location.as_str(),
        ];
        fields.extend(self.agenda.iter().map(String::as_str));
        if let Some(creator) = &self.creator {
            fields.push(&creator.full_name);
        }
        fields
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.date_time)
    }

    fn matches_query(&self, query: &ListQuery) -> bool {
        filter::eq_filter(query.status.as_deref(), self.status.as_str())
            && filter::eq_filter(query.kind.as_deref(), self.meeting_type.as_str())
            && filter::eq_filter(query.created_by.as_deref(), &self.created_by)
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(SortValue::text(&self.id)),
            "title" => Some(SortValue::text(&self.title)),
            "date_time" => Some(SortValue::Time(self.date_time)),
            "duration" => Some(SortValue::Number(i64::from(self.duration))),
            "status" => Some(SortValue::text(self.status.as_str())),
            "meeting_type" | "type" => Some(SortValue::text(self.meeting_type.as_str())),
            "location" => Some(SortValue::text(&self.location)),
            "created_by" => Some(SortValue::text(&self.created_by)),
            "creator_name" => self.creator.as_ref().map(|c| SortValue::text(&c.full_name)),
            "participant_count" => Some(SortValue::Number(self.participants.len() as i64)),
            "created_at" => Some(SortValue::Time(self.created_at)),
            "updated_at" => Some(SortValue::Time(self.updated_at)),
            _ => None,
        }
    }

    fn references(&self) -> Vec<(&'static str, &str)> {
        let mut refs = vec![("users", self.created_by.as_str())];
        refs.extend(self.participants.iter().map(|p| ("users", p.user_id.as_str())));
        refs
    }

    fn expand(&mut self, lookup: &Lookup) {
        self.creator = lookup.user(&self.created_by);
        for participant in &mut self.participants {
            participant.user = lookup.user(&participant.user_id);
        }
    }
}
