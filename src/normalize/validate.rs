//! Validation and sanitization of normalized items

use super::types::NormalizedItem;
use crate::error::{Error, Result};
use crate::records::RecordKind;
use crate::types::{JsonObject, JsonValue};
use tracing::warn;

/// Longest string kept intact, in characters
pub const MAX_STRING_LENGTH: usize = 10_000;

/// Appended to strings cut at [`MAX_STRING_LENGTH`]
pub const TRUNCATION_MARKER: &str = "... [truncated]";

fn has_text(data: &JsonObject, key: &str) -> bool {
    data.get(key)
        .and_then(JsonValue::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Check the fields every consumer relies on
pub fn validate_item(item: &NormalizedItem, kind: RecordKind) -> Result<()> {
    if item.id.trim().is_empty() {
        return Err(Error::validation(kind.to_string(), "missing required field: id"));
    }

    match kind {
        RecordKind::Issue if !has_text(&item.data, "title") => Err(Error::validation(
            kind.to_string(),
            "missing required field: title",
        )),
        RecordKind::Member if !has_text(&item.data, "email") && !has_text(&item.data, "name") => {
            Err(Error::validation(
                kind.to_string(),
                "missing required field: email or name",
            ))
        }
        RecordKind::Project if !has_text(&item.data, "name") => Err(Error::validation(
            kind.to_string(),
            "missing required field: name",
        )),
        _ => Ok(()),
    }
}

/// Drop nulls and truncate long strings, recursing into objects and arrays
pub fn sanitize_value(value: JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(JsonValue::String(truncate(s))),
        JsonValue::Array(items) => Some(JsonValue::Array(
            items.into_iter().filter_map(sanitize_value).collect(),
        )),
        JsonValue::Object(map) => Some(JsonValue::Object(sanitize_object(map))),
        other => Some(other),
    }
}

fn sanitize_object(map: JsonObject) -> JsonObject {
    map.into_iter()
        .filter_map(|(key, value)| sanitize_value(value).map(|v| (key, v)))
        .collect()
}

fn truncate(s: String) -> String {
    match s.char_indices().nth(MAX_STRING_LENGTH) {
        Some((cut, _)) => {
            let mut truncated = s[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => s,
    }
}

/// Sanitize an item's data
#[must_use]
pub fn sanitize_item(item: NormalizedItem) -> NormalizedItem {
    NormalizedItem {
        data: sanitize_object(item.data),
        ..item
    }
}

/// Validate and sanitize a batch, dropping invalid items with a warning
pub fn finalize_batch<I>(kind: RecordKind, items: I) -> Vec<NormalizedItem>
where
    I: IntoIterator<Item = NormalizedItem>,
{
    items
        .into_iter()
        .filter_map(|item| match validate_item(&item, kind) {
            Ok(()) => Some(sanitize_item(item)),
            Err(e) => {
                warn!("Dropping item '{}': {e}", item.id);
                None
            }
        })
        .collect()
}
