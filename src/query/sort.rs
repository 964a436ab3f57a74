use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Resource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    pub column: String,
    pub dir: SortDir,
}

impl SortSpec {
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Self {
        SortSpec {
            column: sort.unwrap_or("").to_string(),
            dir: if dir.is_some_and(|d| d.eq_ignore_ascii_case("desc")) {
                SortDir::Desc
            } else {
                SortDir::Asc
            },
        }
    }

    pub fn dir_str(&self) -> &'static str {
        match self.dir {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    pub fn toggle_dir(&self) -> &'static str {
        match self.dir {
            SortDir::Asc => "desc",
            SortDir::Desc => "asc",
        }
    }

    /// Clicking the current column flips direction, another column starts
    /// ascending.
    pub fn clicked(&self, column: &str) -> SortSpec {
        if self.column == column {
            SortSpec::from_params(Some(column), Some(self.toggle_dir()))
        } else {
            SortSpec::from_params(Some(column), None)
        }
    }
}

/// Sort key of one field. Text compares byte-wise (case-sensitive, no
/// collation).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Text(String),
    Number(i64),
    Time(DateTime<Utc>),
}

impl SortValue {
    pub fn text(s: &str) -> Self {
        SortValue::Text(s.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SortValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Missing values go last whichever way the column is sorted.
pub fn compare(a: Option<&SortValue>, b: Option<&SortValue>, dir: SortDir) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match dir {
            SortDir::Asc => a.cmp(b),
            SortDir::Desc => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by an arbitrary key function.
pub fn sort_by_key_fn<T, F>(items: Vec<T>, dir: SortDir, key: F) -> Vec<T>
where
    F: Fn(&T) -> Option<SortValue>,
{
    let mut keyed: Vec<(Option<SortValue>, T)> =
        items.into_iter().map(|item| (key(&item), item)).collect();
    keyed.sort_by(|(a, _), (b, _)| compare(a.as_ref(), b.as_ref(), dir));
    keyed.into_iter().map(|(_, item)| item).collect()
}

pub fn sort_records<R: Resource>(records: Vec<R>, spec: &SortSpec) -> Vec<R> {
    sort_by_key_fn(records, spec.dir, |r| r.sort_value(&spec.column))
}
