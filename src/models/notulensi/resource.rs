use chrono::{DateTime, Utc};

use super::types::*;
use crate::models::{Lookup, RecordId, Resource, collect_errors, new_id};
use crate::query::{ListQuery, SortDir, SortValue, filter};
use crate::validate;

fn clean_decisions(decisions: Vec<String>) -> Vec<String> {
    decisions
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Build the new action item list. Inputs that name an existing item keep its
/// id and completion stamp unless their status changes.
fn merge_action_items(
    existing: &[ActionItem],
    inputs: Vec<ActionItemInput>,
    now: DateTime<Utc>,
) -> Result<Vec<ActionItem>, String> {
    let mut items = Vec::with_capacity(inputs.len());
    for (idx, input) in inputs.into_iter().enumerate() {
        if input.description.trim().is_empty() {
            return Err(format!("Action item {} needs a description", idx + 1));
        }
        let previous = input
            .id
            .as_deref()
            .and_then(|id| existing.iter().find(|item| item.id == id));

        let mut item = match previous {
            Some(prev) => prev.clone(),
            None => ActionItem {
                id: new_id(),
                description: String::new(),
                assigned_to: None,
                due_date: None,
                priority: ActionPriority::Medium,
                status: ActionStatus::Pending,
                completed_at: None,
                assignee: None,
            },
        };
        item.description = input.description.trim().to_string();
        item.assigned_to = input.assigned_to.filter(|id| !id.trim().is_empty());
        item.due_date = input.due_date;
        item.priority = input.priority;
        item.assignee = None;
        if let Some(status) = input.status {
            item.set_status(status, now);
        }
        items.push(item);
    }
    Ok(items)
}

impl Resource for Notulensi {
    type Draft = NotulensiDraft;
    type Patch = NotulensiPatch;

    const LABEL: &'static str = "Notulensi";
    const DEFAULT_SORT: (&'static str, SortDir) = ("created_at", SortDir::Desc);
    const EXPANDS_MEETINGS: bool = true;

    fn from_draft(
        id: RecordId,
        draft: NotulensiDraft,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        collect_errors(vec![
            validate::validate_required(&draft.meeting_id, "Meeting", 100),
            validate::validate_optional(&draft.content, "Content", 50_000),
        ])?;

        Ok(Notulensi {
            id,
            meeting_id: draft.meeting_id.trim().to_string(),
            content: draft.content,
            decisions: clean_decisions(draft.decisions),
            next_meeting_date: draft.next_meeting_date,
            created_by: actor.to_string(),
            approval: None,
            action_items: merge_action_items(&[], draft.action_items, now)?,
            is_draft: draft.is_draft,
            created_at: now,
            updated_at: now,
            meeting: None,
            creator: None,
            approver: None,
        })
    }

    fn apply_patch(&mut self, patch: NotulensiPatch, now: DateTime<Utc>) -> Result<(), String> {
        if let Some(content) = &patch.content {
            collect_errors(vec![validate::validate_optional(content, "Content", 50_000)])?;
        }
        if let Some(inputs) = patch.action_items {
            self.action_items = merge_action_items(&self.action_items, inputs, now)?;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(decisions) = patch.decisions {
            self.decisions = clean_decisions(decisions);
        }
        if let Some(next) = patch.next_meeting_date {
            self.next_meeting_date = Some(next);
        }
        if let Some(is_draft) = patch.is_draft {
            // An approved record sent back to draft loses its approval.
            if is_draft {
                self.approval = None;
            }
            self.is_draft = is_draft;
        }
        self.updated_at = now;
        Ok(())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.content.as_str()];
        fields.extend(self.decisions.iter().map(String::as_str));
        fields.extend(self.action_items.iter().map(|a| a.description.as_str()));
        if let Some(meeting) = &self.meeting {
            fields.push(&meeting.title);
        }
        if let Some(creator) = &self.creator {
            fields.push(&creator.full_name);
        }
        fields
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn matches_query(&self, query: &ListQuery) -> bool {
        query.is_draft.is_none_or(|want| want == self.is_draft)
            && filter::eq_filter(query.meeting_id.as_deref(), &self.meeting_id)
            && filter::eq_filter(query.created_by.as_deref(), &self.created_by)
            && filter::eq_filter(query.status.as_deref(), self.status_label())
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(SortValue::text(&self.id)),
            "meeting_id" => Some(SortValue::text(&self.meeting_id)),
            "meeting_title" => self.meeting.as_ref().map(|m| SortValue::text(&m.title)),
            "meeting_date" => self.meeting.as_ref().map(|m| SortValue::Time(m.date_time)),
            "created_by" => Some(SortValue::text(&self.created_by)),
            "creator_name" => self.creator.as_ref().map(|c| SortValue::text(&c.full_name)),
            "status" => Some(SortValue::text(self.status_label())),
            "decision_count" => Some(SortValue::Number(self.decisions.len() as i64)),
            "action_item_count" => Some(SortValue::Number(self.action_items.len() as i64)),
            "next_meeting_date" => self.next_meeting_date.map(SortValue::Time),
            "created_at" => Some(SortValue::Time(self.created_at)),
            "updated_at" => Some(SortValue::Time(self.updated_at)),
            _ => None,
        }
    }

    fn references(&self) -> Vec<(&'static str, &str)> {
        let mut refs = vec![
            ("meetings", self.meeting_id.as_str()),
            ("users", self.created_by.as_str()),
        ];
        if let Some(approval) = &self.approval {
            refs.push(("users", approval.approved_by.as_str()));
        }
        refs.extend(
            self.action_items
                .iter()
                .filter_map(|a| a.assigned_to.as_deref())
                .map(|id| ("users", id)),
        );
        refs
    }

    fn expand(&mut self, lookup: &Lookup) {
        self.meeting = lookup.meeting(&self.meeting_id);
        self.creator = lookup.user(&self.created_by);
        self.approver = self
            .approval
            .as_ref()
            .and_then(|a| lookup.user(&a.approved_by));
        for item in &mut self.action_items {
            item.assignee = item.assigned_to.as_deref().and_then(|id| lookup.user(id));
        }
    }
}

impl Notulensi {
    /// "draft", "approved" or "final" (published without approval).
    pub fn status_label(&self) -> &'static str {
        if self.is_draft {
            "draft"
        } else if self.is_approved() {
            "approved"
        } else {
            "final"
        }
    }
}
