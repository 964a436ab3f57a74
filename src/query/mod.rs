//! List queries shared by the REST handlers and the client collections:
//! filter predicates, sorting, pagination and the derived page view.

use serde::{Deserialize, Serialize};

pub mod filter;
pub mod page;
pub mod sort;
pub mod view;

pub use page::{DEFAULT_LIMIT, MAX_LIMIT, PageRequest, Pagination, paginate};
pub use sort::{SortDir, SortSpec, SortValue, sort_records};
pub use view::{ListView, ViewPage};

/// Query string accepted by every list endpoint. Fields an entity does not
/// know about are ignored by it.
///
/// Kept flat (no `#[serde(flatten)]`) so urlencoded numbers and booleans
/// parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

impl ListQuery {
    /// Requested sort, or `default` when no column was given.
    pub fn sort_spec(&self, default: (&str, SortDir)) -> SortSpec {
        match self.sort_by.as_deref().map(str::trim) {
            Some(column) if !column.is_empty() => {
                SortSpec::from_params(Some(column), self.sort_order.as_deref())
            }
            _ => SortSpec {
                column: default.0.to_string(),
                dir: default.1,
            },
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    /// Encode as a query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}
