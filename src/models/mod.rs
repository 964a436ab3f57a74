use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::query::{ListQuery, SortDir, SortValue};

pub mod attendance;
pub mod dashboard;
pub mod meeting;
pub mod notulensi;
pub mod task;
pub mod user;

pub use attendance::*;
pub use meeting::*;
pub use notulensi::*;
pub use task::*;
pub use user::*;

/// Record identifiers are opaque strings (uuid v4 for new records).
pub type RecordId = String;

pub fn new_id() -> RecordId {
    uuid::Uuid::new_v4().to_string()
}

/// Anything the document store can persist under a collection name.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection (table) name. Also used as the REST path segment and the
    /// realtime channel name.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// An entity exposed through the REST API and mirrored by client collections.
///
/// Everything that differs between meetings, notulensi, tasks and users lives
/// here, so list filtering, sorting and the client collection are written once.
pub trait Resource: Record {
    /// Create payload.
    type Draft: Serialize + DeserializeOwned + Send + 'static;
    /// Partial update payload; unset fields are left untouched.
    type Patch: Serialize + DeserializeOwned + Default + Send + 'static;

    /// Human label used in messages ("Meeting not found").
    const LABEL: &'static str;
    const DEFAULT_SORT: (&'static str, SortDir);
    /// Writes restricted to admins.
    const ADMIN_WRITES: bool = false;
    /// Read responses embed meeting summaries (needs the meetings collection).
    const EXPANDS_MEETINGS: bool = false;

    fn from_draft(
        id: RecordId,
        draft: Self::Draft,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, String>;

    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> Result<(), String>;

    /// Fields searched by free-text queries.
    fn search_fields(&self) -> Vec<&str>;

    /// Timestamp compared by `date_from` / `date_to`.
    fn timestamp(&self) -> Option<DateTime<Utc>>;

    /// Structured (non-text, non-date) predicates of a list query.
    fn matches_query(&self, query: &ListQuery) -> bool;

    fn sort_value(&self, field: &str) -> Option<SortValue>;

    /// Values of a facet used by checkbox filters. Single-valued fields fall
    /// back to their sort value.
    fn facet_values(&self, facet: &str) -> Vec<String> {
        match self.sort_value(facet) {
            Some(SortValue::Text(s)) => vec![s],
            Some(SortValue::Number(n)) => vec![n.to_string()],
            Some(SortValue::Time(t)) => vec![t.to_rfc3339()],
            None => Vec::new(),
        }
    }

    /// Foreign references `(collection, id)` that must exist on write.
    fn references(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    /// Fill read-only display summaries.
    fn expand(&mut self, _lookup: &Lookup) {}
}

/// Display summaries used to expand records on read.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    pub users: HashMap<RecordId, UserSummary>,
    pub meetings: HashMap<RecordId, MeetingSummary>,
}

impl Lookup {
    pub fn user(&self, id: &str) -> Option<UserSummary> {
        self.users.get(id).cloned()
    }

    pub fn meeting(&self, id: &str) -> Option<MeetingSummary> {
        self.meetings.get(id).cloned()
    }
}

/// Collect validation messages into a single error string.
pub(crate) fn collect_errors(errors: Vec<Option<String>>) -> Result<(), String> {
    let errors: Vec<String> = errors.into_iter().flatten().collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
