//! Tests for external record decoding

use super::*;
use serde_json::json;

#[test]
fn test_issue_decodes_full_payload() {
    let issue: Issue = serde_json::from_value(json!({
        "id": "4501",
        "title": "TypeError: x is undefined",
        "culprit": "app/main.js in render",
        "permalink": "https://acme.sentry.io/issues/4501/",
        "level": "error",
        "status": "unresolved",
        "type": "error",
        "metadata": {"type": "TypeError", "value": "x is undefined", "filename": "main.js"},
        "count": "1234",
        "userCount": 17,
        "firstSeen": "2024-01-01T00:00:00Z",
        "lastSeen": "2024-02-01T00:00:00Z",
        "project": {"id": "2", "name": "Web", "slug": "web"},
        "assignedTo": {"id": "9", "name": "Dana", "email": "dana@acme.io"},
        "annotations": ["deploy 42"],
        "tags": [{"key": "customer_tier", "value": "gold"}],
        "contexts": {"browser": {}, "feature_flags": {}},
        "hasSeen": true
    }))
    .unwrap();

    assert_eq!(issue.id.as_deref(), Some("4501"));
    assert_eq!(issue.issue_type.as_deref(), Some("error"));
    assert_eq!(issue.metadata.unwrap().error_type.as_deref(), Some("TypeError"));
    assert_eq!(issue.project.unwrap().slug.as_deref(), Some("web"));
    assert_eq!(issue.assigned_to.unwrap().email.as_deref(), Some("dana@acme.io"));
    assert_eq!(issue.tags.len(), 1);
    assert_eq!(issue.contexts.unwrap().len(), 2);
    assert_eq!(issue.has_seen, Some(true));
    assert!(issue.context.is_none());
}

#[test]
fn test_issue_tolerates_odd_shapes() {
    let issue: Issue = serde_json::from_value(json!({
        "id": 4501,
        "metadata": "not an object",
        "assignedTo": null,
        "tags": "nope",
        "project": [1, 2],
        "contexts": 7
    }))
    .unwrap();

    assert_eq!(issue.id.as_deref(), Some("4501"));
    assert!(issue.metadata.is_none());
    assert!(issue.assigned_to.is_none());
    assert!(issue.tags.is_empty());
    assert!(issue.project.is_none());
    assert!(issue.contexts.is_none());
}

#[test]
fn test_issue_empty_object() {
    let issue: Issue = serde_json::from_value(json!({})).unwrap();
    assert!(issue.id.is_none());
    assert!(issue.annotations.is_empty());
}

#[test]
fn test_member_flags() {
    let member: Member = serde_json::from_value(json!({
        "id": "m1",
        "email": "sam@acme.io",
        "flags": {"sso:linked": true, "sso:invalid": false},
        "user": {"name": "Sam", "has2fa": true},
        "teams": ["backend"]
    }))
    .unwrap();

    assert!(member.flag("sso:linked"));
    assert!(!member.flag("sso:invalid"));
    assert!(!member.flag("missing"));
    assert_eq!(member.user.unwrap().has2fa, Some(true));
}

#[test]
fn test_event_field_names() {
    let event: Event = serde_json::from_value(json!({
        "eventID": "abc",
        "groupID": 4501,
        "dateCreated": "2024-03-01T10:00:00Z",
        "user": {"id": 3, "ip_address": "10.0.0.1"}
    }))
    .unwrap();

    assert!(event.id.is_none());
    assert_eq!(event.event_id.as_deref(), Some("abc"));
    assert_eq!(event.group_id.as_deref(), Some("4501"));
    assert_eq!(event.user.unwrap().ip_address.as_deref(), Some("10.0.0.1"));
}

#[test]
fn test_decode_records_skips_non_objects() {
    let projects: Vec<Project> = decode_records(
        vec![
            json!({"id": "1", "name": "A", "slug": "a"}),
            json!("garbage"),
            json!({"id": "2", "name": "B", "slug": "b"}),
        ],
        RecordKind::Project,
    );
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].slug.as_deref(), Some("b"));
}

#[test]
fn test_external_record_kind() {
    let record = ExternalRecord::Member(Member::default());
    assert_eq!(record.kind(), RecordKind::Member);
    assert_eq!(RecordKind::Issue.to_string(), "issue");
}
