//! Common types used throughout the extractor
//!
//! Shared type aliases, repository bucket names and the connection
//! context handed in by the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Item Types
// ============================================================================

/// Repository bucket an item is pushed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Normalized issues
    SentryIssues,
    /// Normalized organization members
    SentryUsers,
    /// Static + discovered schema description
    ExternalDomainMetadata,
}

impl ItemType {
    /// Bucket name used by the repository
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::SentryIssues => "sentry_issues",
            ItemType::SentryUsers => "sentry_users",
            ItemType::ExternalDomainMetadata => "external_domain_metadata",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Connection Context
// ============================================================================

/// Pre-resolved credentials for one organization
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionContext {
    /// Bearer token
    #[serde(alias = "key")]
    pub token: String,
    /// Organization slug
    #[serde(
        alias = "org_name",
        alias = "org",
        alias = "orgIdentifier",
        alias = "org_identifier"
    )]
    pub org_slug: String,
}

impl ConnectionContext {
    /// Create a new connection context
    pub fn new(token: impl Into<String>, org_slug: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            org_slug: org_slug.into(),
        }
    }
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("token", &"<redacted>")
            .field("org_slug", &self.org_slug)
            .finish()
    }
}
