use chrono::{DateTime, NaiveDate, Utc};

use super::ListQuery;
use crate::models::Resource;

/// Equality filter on a single-valued field. `None`, empty and `"all"`
/// disable the filter.
pub fn eq_filter(want: Option<&str>, have: &str) -> bool {
    match want.map(str::trim) {
        None | Some("") | Some("all") => true,
        Some(want) => want == have,
    }
}

/// Like [`eq_filter`], but a record without the field never matches an
/// active filter.
pub fn opt_eq_filter(want: Option<&str>, have: Option<&str>) -> bool {
    match want.map(str::trim) {
        None | Some("") | Some("all") => true,
        Some(want) => have == Some(want),
    }
}

/// Case-insensitive substring match over any of `fields`. An empty query
/// matches everything.
pub fn text_matches(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

/// Accepts RFC 3339 or `YYYY-MM-DD` (midnight UTC).
pub fn parse_bound(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("Invalid date '{raw}'"))
}

/// Inclusive date range over an entity's timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn from_query(query: &ListQuery) -> Result<Self, String> {
        let bound = |raw: &Option<String>| -> Result<Option<DateTime<Utc>>, String> {
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => parse_bound(s).map(Some),
            }
        };
        Ok(DateRange {
            from: bound(&query.date_from)?,
            to: bound(&query.date_to)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Records without a timestamp only pass an empty range.
    pub fn contains(&self, ts: Option<DateTime<Utc>>) -> bool {
        if self.is_empty() {
            return true;
        }
        let Some(ts) = ts else {
            return false;
        };
        self.from.is_none_or(|from| ts >= from) && self.to.is_none_or(|to| ts <= to)
    }
}

/// All predicates of `query` against one record, ANDed.
pub fn matches<R: Resource>(record: &R, query: &ListQuery, range: &DateRange) -> bool {
    let search = query.search.as_deref().unwrap_or("");
    text_matches(search, &record.search_fields())
        && range.contains(record.timestamp())
        && record.matches_query(query)
}

/// Keep the records that match `query`. Fails on an unparseable date bound.
pub fn apply<R: Resource>(records: Vec<R>, query: &ListQuery) -> Result<Vec<R>, String> {
    let range = DateRange::from_query(query)?;
    Ok(records
        .into_iter()
        .filter(|r| matches(r, query, &range))
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn eq_filter_ignores_all_and_empty() {
        assert!(eq_filter(None, "scheduled"));
        assert!(eq_filter(Some(""), "scheduled"));
        assert!(eq_filter(Some("all"), "scheduled"));
        assert!(eq_filter(Some("scheduled"), "scheduled"));
        assert!(!eq_filter(Some("completed"), "scheduled"));
    }

    #[test]
    fn opt_eq_filter_requires_value() {
        assert!(opt_eq_filter(None, None));
        assert!(!opt_eq_filter(Some("u1"), None));
        assert!(opt_eq_filter(Some("u1"), Some("u1")));
    }

    #[test]
    fn search_is_case_insensitive() {
        let fields = ["Budi Santoso", "budi@contoh.id"];
        assert!(text_matches("", &fields));
        assert!(text_matches("BUDI", &fields));
        assert!(text_matches("santo", &fields));
        assert!(!text_matches("siti", &fields));
    }

    #[test]
    fn date_only_bound_is_midnight_utc() {
        let got = parse_bound("2024-03-15").unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        let got = parse_bound("2024-03-15T09:00:00+07:00").unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2024, 3, 15, 2, 0, 0).unwrap());
        assert!(parse_bound("15/03/2024").is_err());
    }

    #[test]
    fn range_bounds_inclusive() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let range = DateRange {
            from: Some(from),
            to: Some(to),
        };
        assert!(range.contains(Some(from)));
        assert!(range.contains(Some(to)));
        assert!(!range.contains(Some(from - Duration::milliseconds(1))));
        assert!(!range.contains(Some(to + Duration::milliseconds(1))));
        assert!(!range.contains(None));
        assert!(DateRange::default().contains(None));
    }

    #[test]
    fn bad_bound_is_reported() {
        let q = ListQuery {
            date_from: Some("kemarin".into()),
            ..Default::default()
        };
        assert_eq!(
            DateRange::from_query(&q).unwrap_err(),
            "Invalid date 'kemarin'"
        );
    }
}
