//! JSON-lines file repository

use super::ItemRepository;
use crate::error::{Error, Result};
use crate::normalize::NormalizedItem;
use crate::schema::ExternalDomainMetadata;
use crate::types::ItemType;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Repository appending to `<dir>/<bucket>.jsonl`
#[derive(Debug, Clone)]
pub struct JsonlRepository {
    dir: PathBuf,
}

impl JsonlRepository {
    /// Create a repository rooted at `dir`, creating it if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::repository(format!(
                "Failed to create output directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    /// File backing a bucket
    pub fn bucket_path(&self, item_type: ItemType) -> PathBuf {
        self.dir.join(format!("{}.jsonl", item_type.as_str()))
    }

    async fn append(&self, item_type: ItemType, lines: String) -> Result<()> {
        let path = self.bucket_path(item_type);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| Error::repository(format!("Failed to open {}: {e}", path.display())))?;

        file.write_all(lines.as_bytes())
            .await
            .map_err(|e| Error::repository(format!("Failed to write {}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| Error::repository(format!("Failed to flush {}: {e}", path.display())))?;
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for JsonlRepository {
    async fn push(&self, item_type: ItemType, items: Vec<NormalizedItem>) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut lines = String::new();
        for item in &items {
            lines.push_str(&serde_json::to_string(item)?);
            lines.push('\n');
        }
        self.append(item_type, lines).await?;

        debug!("Appended {} items to {item_type}", items.len());
        Ok(items.len())
    }

    async fn push_metadata(&self, metadata: &ExternalDomainMetadata) -> Result<()> {
        let mut line = serde_json::to_string(metadata)?;
        line.push('\n');
        self.append(ItemType::ExternalDomainMetadata, line).await
    }
}
