//! Sentry payload types

use super::de::{lenient, lenient_vec, string_or_number};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// Record Kinds
// ============================================================================

/// The closed set of record variants the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Project,
    Issue,
    Member,
    Event,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Project => "project",
            RecordKind::Issue => "issue",
            RecordKind::Member => "member",
            RecordKind::Event => "event",
        })
    }
}

/// One raw external record
#[derive(Debug, Clone)]
pub enum ExternalRecord {
    Project(Project),
    Issue(Issue),
    Member(Member),
    Event(Event),
}

impl ExternalRecord {
    /// Variant of this record
    pub fn kind(&self) -> RecordKind {
        match self {
            ExternalRecord::Project(_) => RecordKind::Project,
            ExternalRecord::Issue(_) => RecordKind::Issue,
            ExternalRecord::Member(_) => RecordKind::Member,
            ExternalRecord::Event(_) => RecordKind::Event,
        }
    }
}

// ============================================================================
// Projects
// ============================================================================

/// Organization reference embedded in a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub slug: Option<String>,
    pub name: Option<String>,
}

/// A project (the grouping unit)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub date_created: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub organization: Option<OrganizationRef>,
}

// ============================================================================
// Issues
// ============================================================================

/// Project reference embedded in an issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Structured error metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueMetadata {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub value: Option<String>,
    pub filename: Option<String>,
    pub function: Option<String>,
}

impl IssueMetadata {
    /// Check whether any displayed field is set
    pub fn is_empty(&self) -> bool {
        self.error_type.is_none()
            && self.value.is_none()
            && self.filename.is_none()
            && self.function.is_none()
    }
}

/// Issue assignee
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Assignee {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Key/value tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub key: String,
    #[serde(deserialize_with = "string_or_number")]
    pub value: Option<String>,
}

/// Grouping and organization an issue was fetched under
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordContext {
    /// Organization slug
    pub org_slug: String,
    /// Id of the grouping the record came from
    pub project_id: Option<String>,
    /// Query key (slug) of the grouping
    pub project_slug: String,
}

/// An issue (the paged record type)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Issue {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub culprit: Option<String>,
    pub permalink: Option<String>,
    pub level: Option<String>,
    pub status: Option<String>,
    pub platform: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub metadata: Option<IssueMetadata>,
    /// Arrives as a numeric string ("1234") or a number
    pub count: Option<Value>,
    pub user_count: Option<Value>,
    pub first_seen: Option<Value>,
    pub last_seen: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub project: Option<ProjectRef>,
    #[serde(deserialize_with = "lenient")]
    pub assigned_to: Option<Assignee>,
    #[serde(deserialize_with = "lenient_vec")]
    pub annotations: Vec<Value>,
    #[serde(deserialize_with = "lenient_vec")]
    pub tags: Vec<Tag>,
    #[serde(deserialize_with = "lenient")]
    pub contexts: Option<Map<String, Value>>,
    pub has_seen: Option<bool>,
    /// Set by the extractor, never by the API
    #[serde(skip)]
    pub context: Option<RecordContext>,
}

impl Issue {
    /// Tag this issue with the grouping it was fetched under
    #[must_use]
    pub fn with_context(mut self, context: RecordContext) -> Self {
        self.context = Some(context);
        self
    }
}

// ============================================================================
// Members
// ============================================================================

/// User account behind an organization membership
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub has2fa: Option<bool>,
    pub is_active: Option<bool>,
}

/// An organization member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Member {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub user: Option<MemberUser>,
    pub role: Option<String>,
    pub role_name: Option<String>,
    pub org_role: Option<String>,
    pub pending: Option<bool>,
    pub expired: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub flags: Option<Map<String, Value>>,
    pub date_created: Option<Value>,
    #[serde(deserialize_with = "lenient_vec")]
    pub teams: Vec<Value>,
}

impl Member {
    /// Read a boolean flag such as `sso:linked`
    pub fn flag(&self, name: &str) -> bool {
        self.flags
            .as_ref()
            .and_then(|f| f.get(name))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

// ============================================================================
// Events
// ============================================================================

/// User attached to an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub ip_address: Option<String>,
}

/// A single error occurrence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(rename = "eventID")]
    pub event_id: Option<String>,
    #[serde(rename = "groupID", deserialize_with = "string_or_number")]
    pub group_id: Option<String>,
    pub message: Option<String>,
    pub title: Option<String>,
    pub platform: Option<String>,
    pub environment: Option<String>,
    pub date_created: Option<Value>,
    /// Object (`{version, ...}`) or plain string depending on API version
    pub release: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub user: Option<EventUser>,
    #[serde(deserialize_with = "lenient")]
    pub contexts: Option<Map<String, Value>>,
    #[serde(deserialize_with = "lenient_vec")]
    pub tags: Vec<Tag>,
}
