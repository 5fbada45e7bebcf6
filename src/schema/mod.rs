//! External domain metadata
//!
//! Describes the record types the extractor produces. The static part is an
//! embedded YAML document; the metadata phase adds custom fields discovered
//! from a sample issue and an organization block.
//!
//! # Features
//!
//! - **Static Schema**: record types and fields shipped with the crate
//! - **Tag Discovery**: issue tags become `tag_<key>` string fields
//! - **Context Discovery**: non-standard contexts become `context_<key>` object fields

mod discovery;
mod types;

pub use discovery::{discover_custom_fields, title_case, KNOWN_CONTEXTS};
pub use types::{
    CustomField, ExternalDomainMetadata, FieldDescriptor, FieldSource, FieldType,
    OrganizationInfo, RecordTypeMetadata,
};
