//! External record types
//!
//! Typed views over Sentry API payloads. Every field is optional because the
//! API omits, nulls or reshapes fields unpredictably; nested objects are
//! decoded leniently so one odd field never costs the whole record.

mod de;
mod types;

pub use de::decode_records;
pub use types::{
    Assignee, Event, EventUser, ExternalRecord, Issue, IssueMetadata, Member, MemberUser,
    OrganizationRef, Project, ProjectRef, RecordContext, RecordKind, Tag,
};

#[cfg(test)]
mod tests;
