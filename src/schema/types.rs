//! Metadata types

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const STATIC_METADATA: &str = include_str!("external_domain_metadata.yaml");

/// Field value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Text,
    RichText,
    Int,
    Bool,
    Timestamp,
    Enum,
    Object,
    Array,
    Reference,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Text => write!(f, "text"),
            FieldType::RichText => write!(f, "rich_text"),
            FieldType::Int => write!(f, "int"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Timestamp => write!(f, "timestamp"),
            FieldType::Enum => write!(f, "enum"),
            FieldType::Object => write!(f, "object"),
            FieldType::Array => write!(f, "array"),
            FieldType::Reference => write!(f, "reference"),
        }
    }
}

/// Where a custom field was learned from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    Static,
    Dynamic,
}

/// A statically known field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Display name
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub is_required: bool,

    /// Allowed values (enums only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// Target record type (references only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_to: Option<String>,
}

/// A field discovered at extraction time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub display_name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub source: FieldSource,
}

/// One record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypeMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub fields: BTreeMap<String, FieldDescriptor>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, CustomField>,
}

/// Organization the metadata was fetched for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationInfo {
    pub slug: String,
    /// ISO-8601 fetch time
    pub fetched_at: String,
    /// Number of selected projects
    pub projects_count: usize,
}

/// Complete metadata document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDomainMetadata {
    pub schema_version: String,

    pub record_types: BTreeMap<String, RecordTypeMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationInfo>,
}

impl ExternalDomainMetadata {
    /// Parse the embedded static description
    pub fn load_static() -> Result<Self> {
        Ok(serde_yaml::from_str(STATIC_METADATA)?)
    }

    /// Merge custom fields into a record type; unknown record types are ignored
    pub fn add_custom_fields(
        &mut self,
        record_type: &str,
        fields: impl IntoIterator<Item = (String, CustomField)>,
    ) -> usize {
        let Some(record) = self.record_types.get_mut(record_type) else {
            return 0;
        };
        let before = record.custom_fields.len();
        record.custom_fields.extend(fields);
        record.custom_fields.len() - before
    }

    /// Attach the organization block
    #[must_use]
    pub fn with_organization(mut self, organization: OrganizationInfo) -> Self {
        self.organization = Some(organization);
        self
    }

    /// Total number of custom fields across record types
    pub fn custom_field_count(&self) -> usize {
        self.record_types
            .values()
            .map(|r| r.custom_fields.len())
            .sum()
    }
}
