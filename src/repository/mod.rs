//! Canonical item repository
//!
//! Workers hand every validated, sanitized batch to an [`ItemRepository`].
//! Two implementations ship with the crate: [`InMemoryRepository`] for tests
//! and embedding, and [`JsonlRepository`] which appends one JSON document per
//! line to `<dir>/<bucket>.jsonl`.

mod jsonl;
mod memory;

pub use jsonl::JsonlRepository;
pub use memory::InMemoryRepository;

use crate::error::Result;
use crate::normalize::NormalizedItem;
use crate::schema::ExternalDomainMetadata;
use crate::types::ItemType;
use async_trait::async_trait;

/// Destination for normalized items
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Store one batch in the bucket for `item_type`; returns the count stored
    async fn push(&self, item_type: ItemType, items: Vec<NormalizedItem>) -> Result<usize>;

    /// Store the external domain metadata document
    async fn push_metadata(&self, metadata: &ExternalDomainMetadata) -> Result<()>;
}

#[cfg(test)]
mod tests;
