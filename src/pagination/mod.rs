//! Pagination module
//!
//! Sentry paginates with opaque cursors advertised in the `Link` response
//! header:
//!
//! ```text
//! <https://sentry.io/api/0/projects/acme/web/issues/?cursor=0:100:0>; rel="next"; results="true"
//! ```
//!
//! # Overview
//!
//! - [`next_cursor`] picks the `rel="next"` descriptor and pulls its `cursor=` token
//! - [`PaginationCursor`] pairs that token with the query it came from
//! - [`PageBudget`] enforces the per-invocation page ceiling

mod link;
mod types;

pub use link::{next_cursor, parse_link_descriptors, LinkDescriptor};
pub use types::{Page, PageBudget, PageLimits, PaginationCursor};

#[cfg(test)]
mod tests;
