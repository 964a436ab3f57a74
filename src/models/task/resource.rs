use chrono::{DateTime, Utc};

use super::types::*;
use crate::models::{Lookup, RecordId, Resource, collect_errors};
use crate::query::{ListQuery, SortDir, SortValue, filter};
use crate::validate;

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn clean_assignee(assigned_to: Option<String>) -> Option<String> {
    assigned_to.filter(|id| !id.trim().is_empty())
}

impl Resource for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const LABEL: &'static str = "Task";
    const DEFAULT_SORT: (&'static str, SortDir) = ("created_at", SortDir::Desc);

    fn from_draft(
        id: RecordId,
        draft: TaskDraft,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        collect_errors(vec![
            validate::validate_required(&draft.title, "Title", 200),
            validate::validate_optional(&draft.description, "Description", 5000),
        ])?;

        let mut task = Task {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            status: TaskStatus::Pending,
            priority: draft.priority,
            assigned_to: clean_assignee(draft.assigned_to),
            created_by: actor.to_string(),
            due_date: draft.due_date,
            completed_at: None,
            tags: clean_tags(draft.tags),
            created_at: now,
            updated_at: now,
            assignee: None,
            creator: None,
        };
        if let Some(status) = draft.status {
            task.set_status(status, now);
        }
        Ok(task)
    }

    fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> Result<(), String> {
        if let Some(title) = &patch.title {
            collect_errors(vec![validate::validate_required(title, "Title", 200)])?;
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.set_status(status, now);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if patch.assigned_to.is_some() {
            self.assigned_to = clean_assignee(patch.assigned_to);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(tags) = patch.tags {
            self.tags = clean_tags(tags);
        }
        self.updated_at = now;
        Ok(())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        if let Some(assignee) = &self.assignee {
            fields.push(&assignee.full_name);
        }
        fields
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    fn matches_query(&self, query: &ListQuery) -> bool {
        filter::eq_filter(query.status.as_deref(), self.status.as_str())
            && filter::eq_filter(query.priority.as_deref(), self.priority.as_str())
            && filter::opt_eq_filter(query.assigned_to.as_deref(), self.assigned_to.as_deref())
            && filter::eq_filter(query.created_by.as_deref(), &self.created_by)
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(SortValue::text(&self.id)),
            "title" => Some(SortValue::text(&self.title)),
            "status" => Some(SortValue::text(self.status.as_str())),
            "priority" => Some(SortValue::Number(self.priority.rank())),
            "assigned_to" => self.assigned_to.as_deref().map(SortValue::text),
            "assignee_name" => self.assignee.as_ref().map(|a| SortValue::text(&a.full_name)),
            "created_by" => Some(SortValue::text(&self.created_by)),
            "due_date" => self.due_date.map(SortValue::Time),
            "completed_at" => self.completed_at.map(SortValue::Time),
            "created_at" => Some(SortValue::Time(self.created_at)),
            "updated_at" => Some(SortValue::Time(self.updated_at)),
            _ => None,
        }
    }

    fn facet_values(&self, facet: &str) -> Vec<String> {
        match facet {
            "tags" | "tag" => self.tags.clone(),
            "priority" => vec![self.priority.as_str().to_string()],
            other => self
                .sort_value(other)
                .and_then(|v| v.as_text().map(str::to_string))
                .into_iter()
                .collect(),
        }
    }

    fn references(&self) -> Vec<(&'static str, &str)> {
        let mut refs = vec![("users", self.created_by.as_str())];
        if let Some(assignee) = &self.assigned_to {
            refs.push(("users", assignee.as_str()));
        }
        refs
    }

    fn expand(&mut self, lookup: &Lookup) {
        self.creator = lookup.user(&self.created_by);
        self.assignee = self.assigned_to.as_deref().and_then(|id| lookup.user(id));
    }
}
