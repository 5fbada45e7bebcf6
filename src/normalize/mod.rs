//! Normalization into the canonical item shape
//!
//! Every external record becomes exactly one [`NormalizedItem`]. The
//! normalizers never fail: missing fields get defaults, malformed timestamps
//! become the current time. Validation and sanitization are separate, explicit
//! steps applied by [`finalize_batch`] before items reach the repository.

mod items;
mod timestamp;
mod types;
mod validate;

pub use items::{normalize, normalize_event, normalize_issue, normalize_project, normalize_user};
pub use timestamp::{normalize_timestamp, normalize_timestamp_at};
pub use types::{ExternalSyncUnit, NormalizedItem, SYNC_UNIT_ITEM_TYPE};
pub use validate::{
    finalize_batch, sanitize_item, sanitize_value, validate_item, MAX_STRING_LENGTH,
    TRUNCATION_MARKER,
};
