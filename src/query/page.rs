use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 1000;

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Page is at least 1, limit is clamped to `1..=MAX_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        PageRequest {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// Slice one page out of an already filtered and sorted list.
pub fn paginate<T>(items: Vec<T>, req: PageRequest) -> (Vec<T>, Pagination) {
    let total = items.len();
    let total_pages = total.div_ceil(req.limit as usize) as u32;
    let page: Vec<T> = items
        .into_iter()
        .skip(req.offset())
        .take(req.limit as usize)
        .collect();
    (
        page,
        Pagination {
            page: req.page,
            limit: req.limit,
            total: total as u64,
            total_pages,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_request() {
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(None, Some(5000)).limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
    }

    #[test]
    fn slices_pages() {
        let items: Vec<u32> = (1..=25).collect();
        let (page, meta) = paginate(items.clone(), PageRequest::new(Some(3), Some(10)));
        assert_eq!(page, vec![21, 22, 23, 24, 25]);
        assert_eq!(meta.total, 25);
        assert_eq!(meta.total_pages, 3);

        let (page, _) = paginate(items, PageRequest::new(Some(9), Some(10)));
        assert!(page.is_empty());
    }

    #[test]
    fn empty_list_has_no_pages() {
        let (_, meta) = paginate(Vec::<u32>::new(), PageRequest::default());
        assert_eq!(meta.total_pages, 0);
    }
}
