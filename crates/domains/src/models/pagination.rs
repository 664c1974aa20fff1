use serde::{Deserialize, Serialize};

pub const MAX_LIMIT: u32 = 100;

/// 1-based page request. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT),
        }
    }

    pub const fn first(limit: u32) -> Self {
        Self { page: 1, limit }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    pub fn pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1)))
    }

    pub fn has_more(&self) -> bool {
        u64::from(self.page) < self.pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_and_clamps() {
        assert_eq!(PageRequest::new(None, None, 12), PageRequest { page: 1, limit: 12 });
        assert_eq!(
            PageRequest::new(Some(0), Some(1000), 12),
            PageRequest { page: 1, limit: MAX_LIMIT }
        );
        assert_eq!(PageRequest::new(Some(3), Some(10), 12).offset(), 20);
    }

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        let page: Page<()> = Page::new(Vec::new(), 25, PageRequest::first(10));
        assert_eq!(page.pages(), 3);
        assert!(page.has_more());

        let empty: Page<()> = Page::new(Vec::new(), 0, PageRequest::first(10));
        assert_eq!(empty.pages(), 0);
        assert!(!empty.has_more());
    }
}
