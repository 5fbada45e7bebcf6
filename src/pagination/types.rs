//! Pagination types
//!
//! Cursor, page and page-budget types shared by the client and the workers.

use serde::{Deserialize, Serialize};

/// Opaque continuation token tagged with the query it belongs to.
///
/// A cursor taken from page N of one query is only valid for page N+1 of
/// that same query; `origin` lets callers detect and drop a cursor that was
/// persisted for a different query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    /// Token passed back as `?cursor=`
    pub token: String,
    /// Identity of the query (request path) that produced the token
    pub origin: String,
}

impl PaginationCursor {
    /// Create a new cursor
    pub fn new(token: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            origin: origin.into(),
        }
    }

    /// Check whether this cursor continues the given query
    pub fn belongs_to(&self, origin: &str) -> bool {
        self.origin == origin
    }
}

/// One page of results plus the cursor for the following page
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Records on this page
    pub items: Vec<T>,
    /// Cursor for the next page, `None` on the last page
    pub next: Option<PaginationCursor>,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, next: Option<PaginationCursor>) -> Self {
        Self { items, next }
    }

    /// Check whether another page is advertised
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Transform the records, keeping the cursor
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next: self.next,
        }
    }
}

/// Page sizes and safety caps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    /// `limit` for issue listing (API maximum is 100)
    pub issues_page_size: u32,
    /// `limit` for event listing
    pub events_page_size: u32,
    /// Pages fetched per grouping per invocation
    pub max_pages_per_grouping: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            issues_page_size: 100,
            events_page_size: 50,
            max_pages_per_grouping: 10,
        }
    }
}

/// Counts pages against a hard ceiling, independent of cursor availability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBudget {
    max_pages: u32,
    fetched: u32,
}

impl PageBudget {
    /// Create a budget allowing `max_pages` pages
    pub fn new(max_pages: u32) -> Self {
        Self {
            max_pages,
            fetched: 0,
        }
    }

    /// Reserve one page; `false` once the ceiling is reached
    pub fn try_take(&mut self) -> bool {
        if self.fetched >= self.max_pages {
            return false;
        }
        self.fetched += 1;
        true
    }

    /// Pages reserved so far
    pub fn fetched(&self) -> u32 {
        self.fetched
    }

    /// Check whether the ceiling has been reached
    pub fn is_exhausted(&self) -> bool {
        self.fetched >= self.max_pages
    }
}
