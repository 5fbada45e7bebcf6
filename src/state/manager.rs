//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.

use super::types::ExtractionState;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// State manager for persisting and loading extraction state
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file; empty in memory
    path: PathBuf,
    /// Current state (cached)
    state: RwLock<ExtractionState>,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: RwLock::new(ExtractionState::new()),
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            parse(&contents)?
        } else {
            ExtractionState::new()
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> ExtractionState {
        self.state.read().await.clone()
    }

    /// Replace the whole state and write it out
    pub async fn replace(&self, state: ExtractionState) -> Result<()> {
        *self.state.write().await = state;
        self.save().await
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)
                .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?
        };

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        Ok(())
    }
}

fn parse(contents: &str) -> Result<ExtractionState> {
    if contents.trim().is_empty() {
        return Ok(ExtractionState::new());
    }
    serde_json::from_str(contents)
        .map_err(|e| Error::state(format!("Failed to parse state: {e}")))
}
