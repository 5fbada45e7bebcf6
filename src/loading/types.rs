//! Reverse sync payloads

use crate::types::{ConnectionContext, JsonValue};
use serde::{Deserialize, Serialize};

/// Delay suggested to the host after a transient loading failure
pub const RETRY_DELAY_SECS: u64 = 30;

/// Issue status as Sentry names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Resolved,
    Ignored,
    Unresolved,
}

impl IssueStatus {
    /// Map a canonical status; unknown values map to nothing
    pub fn from_canonical(status: &str) -> Option<Self> {
        match status {
            "resolved" | "closed" => Some(Self::Resolved),
            "ignored" => Some(Self::Ignored),
            "open" | "in_progress" => Some(Self::Unresolved),
            _ => None,
        }
    }
}

/// Body of `PUT /issues/{id}/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_seen: Option<bool>,
}

impl IssueUpdate {
    /// Collect the updatable fields of a canonical issue item
    pub fn from_item(item: &JsonValue) -> Self {
        Self {
            status: item
                .get("status")
                .and_then(JsonValue::as_str)
                .and_then(IssueStatus::from_canonical),
            assigned_to: item
                .get("assignedTo")
                .and_then(JsonValue::as_str)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
            has_seen: item.get("hasSeen").and_then(JsonValue::as_bool),
        }
    }

    /// Check whether the update would change nothing
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assigned_to.is_none() && self.has_seen.is_none()
    }
}

/// Outcome of loading one item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Seconds to wait before retrying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

impl LoadResponse {
    /// Item was written under `id`
    pub fn loaded(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Permanent failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Failure worth retrying after [`RETRY_DELAY_SECS`]
    pub fn retry_later(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            delay: Some(RETRY_DELAY_SECS),
            ..Self::default()
        }
    }

    /// Check whether loading succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Change requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadAction {
    UpdateIssue,
    CreateIssue,
    CreateComment,
}

/// One reverse-sync request: an action applied to a canonical item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRequest {
    pub action: LoadAction,
    #[serde(alias = "connection_context", alias = "connectionContext")]
    pub connection: ConnectionContext,
    pub item: JsonValue,
}
