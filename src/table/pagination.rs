use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::TableError;

/// Server-reported page position of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub total: u64,
    /// 1-based
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
}

/// One entry of the page-number strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => f.write_str("…"),
        }
    }
}

impl PaginationMetadata {
    /// Build metadata from a total and page size, computing `pages`
    pub fn new(total: u64, page: u32, limit: u32) -> Result<Self, TableError> {
        if limit == 0 {
            return Err(TableError::ZeroLimit);
        }
        let meta = Self {
            total,
            page,
            limit,
            pages: Self::pages_for(total, limit),
        };
        meta.validate()?;
        Ok(meta)
    }

    fn pages_for(total: u64, limit: u32) -> u32 {
        total.div_ceil(limit as u64).min(u32::MAX as u64) as u32
    }

    /// Check the caller contract. Out-of-range pages are rejected, never clamped.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.limit == 0 {
            return Err(TableError::ZeroLimit);
        }
        let expected = Self::pages_for(self.total, self.limit);
        if self.pages != expected {
            return Err(TableError::InconsistentPages {
                total: self.total,
                limit: self.limit,
                pages: self.pages,
                expected,
            });
        }
        if self.pages > 0 && !(1..=self.pages).contains(&self.page) {
            return Err(TableError::PageOutOfRange {
                page: self.page,
                pages: self.pages,
            });
        }
        Ok(())
    }

    /// Whether the "previous" control is enabled
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether the "next" control is enabled
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Compressed page-number strip.
    ///
    /// First page, last page and the neighbours of the current page are
    /// shown; every run of skipped pages becomes a single ellipsis. Never more
    /// than seven entries.
    pub fn page_items(&self) -> Vec<PageItem> {
        let mut items = Vec::with_capacity(7);
        let mut last_shown: Option<u32> = None;

        for n in 1..=self.pages {
            let visible = n == 1 || n == self.pages || n.abs_diff(self.page) <= 1;
            if !visible {
                continue;
            }
            if let Some(prev) = last_shown {
                if n - prev > 1 {
                    items.push(PageItem::Ellipsis);
                }
            }
            items.push(PageItem::Page(n));
            last_shown = Some(n);
        }

        items
    }

    /// e.g. "Showing 11 to 20 of 25 results"
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            return "No results".to_string();
        }
        let first = (self.page.saturating_sub(1) as u64) * self.limit as u64 + 1;
        let last = (self.page as u64 * self.limit as u64).min(self.total);
        format!("Showing {} to {} of {} results", first, last, self.total)
    }
}
