//! Canonical item types

use crate::records::Project;
use crate::types::JsonObject;
use serde::{Deserialize, Serialize};

/// Item type reported for every sync unit
pub const SYNC_UNIT_ITEM_TYPE: &str = "sentry_projects";

/// One item in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// External identifier; non-empty once validated
    pub id: String,
    /// ISO-8601 creation time
    pub created_date: String,
    /// ISO-8601 last modification time
    pub modified_date: String,
    /// Variant-specific fields
    pub data: JsonObject,
}

/// A selectable grouping reported by the sync-units phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSyncUnit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub item_count: u64,
    #[serde(default = "default_item_type")]
    pub item_type: String,
    /// Key used to query the grouping's records (the project slug)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_key: Option<String>,
}

fn default_item_type() -> String {
    SYNC_UNIT_ITEM_TYPE.to_string()
}

impl ExternalSyncUnit {
    /// Describe a project as a sync unit
    pub fn from_project(project: &Project) -> Self {
        Self {
            id: project.id.clone().unwrap_or_default(),
            name: project.name.clone().unwrap_or_default(),
            description: format!(
                "platform: {} | status: {}",
                project.platform.as_deref().unwrap_or("unknown"),
                project.status.as_deref().unwrap_or("unknown")
            ),
            item_count: 0,
            item_type: default_item_type(),
            query_key: project.slug.clone().filter(|s| !s.is_empty()),
        }
    }

    /// A unit is usable only with both an id and a name
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }
}
