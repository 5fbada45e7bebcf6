//! Timestamp normalization

use crate::types::JsonValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Already ISO-8601, leave untouched
static ISO_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").unwrap());

/// Normalize a raw timestamp against the current time
pub fn normalize_timestamp(raw: Option<&JsonValue>) -> String {
    normalize_timestamp_at(raw, Utc::now())
}

/// Normalize a raw timestamp, substituting `now` when it is absent or unreadable.
///
/// Strings that already start with `YYYY-MM-DDT` are returned unchanged, so
/// the function is idempotent on its own output.
pub fn normalize_timestamp_at(raw: Option<&JsonValue>, now: DateTime<Utc>) -> String {
    let fallback = || format_utc(now);

    match raw {
        None | Some(JsonValue::Null) => fallback(),
        Some(JsonValue::String(s)) if s.trim().is_empty() => fallback(),
        Some(JsonValue::String(s)) if ISO_PREFIX.is_match(s) => s.clone(),
        Some(JsonValue::String(s)) => parse_str(s).map(format_utc).unwrap_or_else(|| {
            warn!("Invalid timestamp '{s}', using current time");
            fallback()
        }),
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(format_utc)
            .unwrap_or_else(|| {
                warn!("Invalid timestamp {n}, using current time");
                fallback()
            }),
        Some(other) => {
            warn!("Invalid timestamp {other}, using current time");
            fallback()
        }
    }
}

fn format_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    // Epoch milliseconds sent as a string
    s.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}
