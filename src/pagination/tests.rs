//! Tests for pagination module

use super::*;

const SENTRY_LINK: &str = "<https://sentry.io/api/0/projects/acme/web/issues/?&cursor=1700000000000:0:1>; rel=\"previous\"; results=\"false\"; cursor=\"1700000000000:0:1\", <https://sentry.io/api/0/projects/acme/web/issues/?&cursor=1700000000000:100:0>; rel=\"next\"; results=\"true\"; cursor=\"1700000000000:100:0\"";

// ============================================================================
// Link Header Tests
// ============================================================================

#[test]
fn test_parse_link_descriptors() {
    let descriptors = parse_link_descriptors(SENTRY_LINK);
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].rel.as_deref(), Some("previous"));
    assert_eq!(descriptors[0].results, Some(false));
    assert_eq!(descriptors[1].rel.as_deref(), Some("next"));
    assert_eq!(descriptors[1].results, Some(true));
    assert!(descriptors[1].url.ends_with("cursor=1700000000000:100:0"));
}

#[test]
fn test_next_cursor_from_sentry_header() {
    assert_eq!(
        next_cursor(SENTRY_LINK),
        Some("1700000000000:100:0".to_string())
    );
}

#[test]
fn test_next_cursor_without_results_hint() {
    let header = "<https://api.example.com/items/?cursor=abc123&limit=100>; rel=\"next\"";
    assert_eq!(next_cursor(header), Some("abc123".to_string()));
}

#[test]
fn test_next_cursor_missing_next_relation() {
    let header = "<https://api.example.com/items/?cursor=abc>; rel=\"previous\"";
    assert_eq!(next_cursor(header), None);
}

#[test]
fn test_next_cursor_results_false_ends_pagination() {
    let header =
        "<https://api.example.com/items/?cursor=0:200:0>; rel=\"next\"; results=\"false\"";
    assert_eq!(next_cursor(header), None);
}

#[test]
fn test_next_cursor_without_token() {
    let header = "<https://api.example.com/items/?page=2>; rel=\"next\"";
    assert_eq!(next_cursor(header), None);
}

#[test]
fn test_next_cursor_empty_header() {
    assert_eq!(next_cursor(""), None);
}

// ============================================================================
// Cursor / Page Tests
// ============================================================================

#[test]
fn test_cursor_belongs_to_origin() {
    let cursor = PaginationCursor::new("0:100:0", "/projects/acme/web/issues/");
    assert!(cursor.belongs_to("/projects/acme/web/issues/"));
    assert!(!cursor.belongs_to("/projects/acme/api/issues/"));
}

#[test]
fn test_cursor_serialization() {
    let cursor = PaginationCursor::new("tok", "/q/");
    let json = serde_json::to_value(&cursor).unwrap();
    assert_eq!(json, serde_json::json!({"token": "tok", "origin": "/q/"}));
}

#[test]
fn test_page_map_keeps_cursor() {
    let page = Page::new(vec![1, 2, 3], Some(PaginationCursor::new("n", "/q/")));
    let mapped = page.map(|n| n * 10);
    assert_eq!(mapped.items, vec![10, 20, 30]);
    assert!(mapped.has_next());
}

// ============================================================================
// PageBudget Tests
// ============================================================================

#[test]
fn test_page_budget_stops_at_ceiling() {
    let mut budget = PageBudget::new(10);
    let mut taken = 0;
    while budget.try_take() {
        taken += 1;
    }
    assert_eq!(taken, 10);
    assert_eq!(budget.fetched(), 10);
    assert!(budget.is_exhausted());
}

#[test]
fn test_page_budget_zero() {
    let mut budget = PageBudget::new(0);
    assert!(!budget.try_take());
    assert!(budget.is_exhausted());
}
