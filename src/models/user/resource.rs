use chrono::{DateTime, Utc};

use super::types::*;
use crate::models::{RecordId, Resource, collect_errors};
use crate::query::{ListQuery, SortDir, SortValue, filter};
use crate::validate;

/// Empty strings clear optional profile fields.
fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Resource for User {
    type Draft = UserDraft;
    type Patch = UserPatch;

    const LABEL: &'static str = "User";
    const DEFAULT_SORT: (&'static str, SortDir) = ("full_name", SortDir::Asc);
    const ADMIN_WRITES: bool = true;

    fn from_draft(
        id: RecordId,
        draft: UserDraft,
        _actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        collect_errors(vec![
            validate::validate_email(&draft.email),
            validate::validate_required(&draft.full_name, "Full name", 100),
        ])?;

        Ok(User {
            id,
            email: draft.email.trim().to_lowercase(),
            full_name: draft.full_name.trim().to_string(),
            role: draft.role,
            department: non_empty(draft.department),
            avatar_url: non_empty(draft.avatar_url),
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_patch(&mut self, patch: UserPatch, now: DateTime<Utc>) -> Result<(), String> {
        if let Some(email) = patch.email {
            collect_errors(vec![validate::validate_email(&email)])?;
            self.email = email.trim().to_lowercase();
        }
        if let Some(full_name) = patch.full_name {
            collect_errors(vec![validate::validate_required(&full_name, "Full name", 100)])?;
            self.full_name = full_name.trim().to_string();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if patch.department.is_some() {
            self.department = non_empty(patch.department);
        }
        if patch.avatar_url.is_some() {
            self.avatar_url = non_empty(patch.avatar_url);
        }
        self.updated_at = now;
        Ok(())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.full_name.as_str(), self.email.as_str()];
        if let Some(dept) = &self.department {
            fields.push(dept);
        }
        fields
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn matches_query(&self, query: &ListQuery) -> bool {
        filter::eq_filter(query.role.as_deref(), self.role.as_str())
            && filter::opt_eq_filter(query.department.as_deref(), self.department.as_deref())
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(SortValue::text(&self.id)),
            "full_name" => Some(SortValue::text(&self.full_name)),
            "email" => Some(SortValue::text(&self.email)),
            "role" => Some(SortValue::text(self.role.as_str())),
            "department" => self.department.as_deref().map(SortValue::text),
            "created_at" => Some(SortValue::Time(self.created_at)),
            "updated_at" => Some(SortValue::Time(self.updated_at)),
            _ => None,
        }
    }
}
