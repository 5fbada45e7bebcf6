//! In-memory repository

use super::ItemRepository;
use crate::error::Result;
use crate::normalize::NormalizedItem;
use crate::schema::ExternalDomainMetadata;
use crate::types::ItemType;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Buckets {
    items: HashMap<ItemType, Vec<NormalizedItem>>,
    batches: HashMap<ItemType, usize>,
    metadata: Vec<ExternalDomainMetadata>,
}

/// Repository keeping everything in memory
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    buckets: Mutex<Buckets>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Buckets> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Items pushed into a bucket, in push order
    pub fn items(&self, item_type: ItemType) -> Vec<NormalizedItem> {
        self.lock()
            .items
            .get(&item_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of items in a bucket
    pub fn len(&self, item_type: ItemType) -> usize {
        self.lock().items.get(&item_type).map_or(0, Vec::len)
    }

    /// Check whether nothing at all was pushed
    pub fn is_empty(&self) -> bool {
        let buckets = self.lock();
        buckets.items.values().all(Vec::is_empty) && buckets.metadata.is_empty()
    }

    /// Number of non-empty batches pushed into a bucket
    pub fn batches(&self, item_type: ItemType) -> usize {
        self.lock().batches.get(&item_type).copied().unwrap_or(0)
    }

    /// Metadata documents pushed so far
    pub fn metadata(&self) -> Vec<ExternalDomainMetadata> {
        self.lock().metadata.clone()
    }
}

#[async_trait]
impl ItemRepository for InMemoryRepository {
    async fn push(&self, item_type: ItemType, items: Vec<NormalizedItem>) -> Result<usize> {
        let count = items.len();
        if count == 0 {
            return Ok(0);
        }

        let mut buckets = self.lock();
        buckets.items.entry(item_type).or_default().extend(items);
        *buckets.batches.entry(item_type).or_default() += 1;
        Ok(count)
    }

    async fn push_metadata(&self, metadata: &ExternalDomainMetadata) -> Result<()> {
        self.lock().metadata.push(metadata.clone());
        Ok(())
    }
}
