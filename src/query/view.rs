use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::filter::text_matches;
use super::page::{PageRequest, Pagination, paginate};
use super::sort::{SortSpec, SortValue, sort_by_key_fn};
use crate::models::Resource;

/// Sort key resolved through another collection, e.g. `assignee_name` from
/// a task's `assigned_to` and the users list.
#[derive(Debug, Clone)]
struct ResolvedKey {
    source: String,
    names: HashMap<String, String>,
}

/// Page-side derivation of what a list shows: raw records, then the search
/// box, then checkbox facets, then sort, then the current page.
#[derive(Debug, Clone)]
pub struct ListView {
    search: String,
    facets: BTreeMap<String, BTreeSet<String>>,
    sort: SortSpec,
    resolved: HashMap<String, ResolvedKey>,
    page: PageRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewPage<R> {
    pub items: Vec<R>,
    pub pagination: Pagination,
}

impl ListView {
    pub fn new(sort: SortSpec) -> Self {
        ListView {
            search: String::new(),
            facets: BTreeMap::new(),
            sort,
            resolved: HashMap::new(),
            page: PageRequest::default(),
        }
    }

    pub fn for_resource<R: Resource>() -> Self {
        let (column, dir) = R::DEFAULT_SORT;
        ListView::new(SortSpec {
            column: column.to_string(),
            dir,
        })
    }

    /// Sort `key` by looking up `source`'s value in `names`.
    pub fn with_lookup(
        mut self,
        key: &str,
        source: &str,
        names: HashMap<String, String>,
    ) -> Self {
        self.resolved.insert(
            key.to_string(),
            ResolvedKey {
                source: source.to_string(),
                names,
            },
        );
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// New search text starts again from page 1.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page.page = 1;
    }

    /// Checkbox semantics: checking a checked value unchecks it.
    pub fn toggle(&mut self, facet: &str, value: &str) {
        let set = self.facets.entry(facet.to_string()).or_default();
        if !set.remove(value) {
            set.insert(value.to_string());
        }
        if set.is_empty() {
            self.facets.remove(facet);
        }
        self.page.page = 1;
    }

    pub fn is_checked(&self, facet: &str, value: &str) -> bool {
        self.facets.get(facet).is_some_and(|s| s.contains(value))
    }

    pub fn checked(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.facets
    }

    pub fn clear_facets(&mut self) {
        self.facets.clear();
        self.page.page = 1;
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn sort_by(&mut self, column: &str) {
        self.sort = self.sort.clicked(column);
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: u32, limit: u32) {
        self.page = PageRequest::new(Some(page), Some(limit));
    }

    fn facet_matches<R: Resource>(&self, record: &R) -> bool {
        self.facets.iter().all(|(facet, wanted)| {
            record
                .facet_values(facet)
                .iter()
                .any(|v| wanted.contains(v))
        })
    }

    fn sort_key<R: Resource>(&self, record: &R) -> Option<SortValue> {
        match self.resolved.get(&self.sort.column) {
            Some(key) => {
                let id = record.sort_value(&key.source)?;
                let id = id.as_text()?;
                key.names.get(id).map(|name| SortValue::text(name))
            }
            None => record.sort_value(&self.sort.column),
        }
    }

    /// Records left after search and facets, sorted, before paging.
    pub fn visible<R: Resource>(&self, records: &[R]) -> Vec<R> {
        let filtered: Vec<R> = records
            .iter()
            .filter(|r| text_matches(&self.search, &r.search_fields()))
            .filter(|r| self.facet_matches(*r))
            .cloned()
            .collect();
        sort_by_key_fn(filtered, self.sort.dir, |r| self.sort_key(r))
    }

    pub fn apply<R: Resource>(&self, records: &[R]) -> ViewPage<R> {
        let (items, pagination) = paginate(self.visible(records), self.page);
        ViewPage { items, pagination }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::{Task, TaskDraft, TaskPriority, TaskStatus};
    use crate::query::SortDir;

    fn task(id: &str, title: &str, assignee: &str, status: TaskStatus) -> Task {
        let now = Utc::now();
        let draft = TaskDraft {
            title: title.into(),
            description: String::new(),
            status: Some(status),
            priority: TaskPriority::Medium,
            assigned_to: Some(assignee.into()),
            due_date: Some(now + Duration::days(1)),
            tags: vec![],
        };
        Task::from_draft(id.into(), draft, "u1", now).unwrap()
    }

    fn tasks() -> Vec<Task> {
        vec![
            task("t1", "Laporan keuangan", "u2", TaskStatus::Pending),
            task("t2", "Rapat vendor", "u3", TaskStatus::Completed),
            task("t3", "laporan audit", "u3", TaskStatus::InProgress),
        ]
    }

    fn ids(items: &[Task]) -> Vec<&str> {
        items.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn search_then_facets() {
        let mut view = ListView::for_resource::<Task>();
        view.set_sort(SortSpec::from_params(Some("id"), None));
        view.set_search("LAPORAN");
        assert_eq!(ids(&view.visible(&tasks())), vec!["t1", "t3"]);

        view.toggle("status", "pending");
        assert_eq!(ids(&view.visible(&tasks())), vec!["t1"]);
    }

    #[test]
    fn toggling_twice_restores() {
        let mut view = ListView::for_resource::<Task>();
        let before = view.checked().clone();
        view.toggle("status", "completed");
        assert!(view.is_checked("status", "completed"));
        view.toggle("status", "completed");
        assert_eq!(view.checked(), &before);
    }

    #[test]
    fn facet_values_are_ored_within_a_facet() {
        let mut view = ListView::for_resource::<Task>();
        view.set_sort(SortSpec::from_params(Some("id"), None));
        view.toggle("status", "pending");
        view.toggle("status", "completed");
        assert_eq!(ids(&view.visible(&tasks())), vec!["t1", "t2"]);
    }

    #[test]
    fn clearing_facets_shows_everything_again() {
        let mut view = ListView::for_resource::<Task>();
        view.toggle("status", "pending");
        view.toggle("priority", "high");
        view.set_page(2, 1);
        view.clear_facets();
        assert!(view.checked().is_empty());
        let page = view.apply(&tasks());
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.total, tasks().len() as u64);
    }

    #[test]
    fn sorts_by_resolved_name() {
        let names = HashMap::from([
            ("u2".to_string(), "Siti".to_string()),
            ("u3".to_string(), "Andi".to_string()),
        ]);
        let mut view = ListView::for_resource::<Task>().with_lookup(
            "assignee_label",
            "assigned_to",
            names,
        );
        view.set_sort(SortSpec {
            column: "assignee_label".into(),
            dir: SortDir::Asc,
        });
        assert_eq!(ids(&view.visible(&tasks())), vec!["t2", "t3", "t1"]);
    }

    #[test]
    fn pages_the_result() {
        let mut view = ListView::for_resource::<Task>();
        view.set_sort(SortSpec::from_params(Some("id"), None));
        view.set_page(2, 2);
        let page = view.apply(&tasks());
        assert_eq!(ids(&page.items), vec!["t3"]);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }
}
