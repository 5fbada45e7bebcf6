//! Tests for reverse sync

use super::*;
use crate::config::ExtractorConfig;
use crate::http::RetryPolicy;
use crate::types::ConnectionContext;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> SentryClient {
    let config = ExtractorConfig::new()
        .with_base_url(server.uri())
        .with_retry(RetryPolicy::new(1, 1));
    SentryClient::new(&ConnectionContext::new("tok", "acme"), &config).unwrap()
}

#[test_case("resolved", Some(IssueStatus::Resolved))]
#[test_case("closed", Some(IssueStatus::Resolved))]
#[test_case("ignored", Some(IssueStatus::Ignored))]
#[test_case("open", Some(IssueStatus::Unresolved))]
#[test_case("in_progress", Some(IssueStatus::Unresolved))]
#[test_case("archived", None)]
fn test_status_mapping(canonical: &str, expected: Option<IssueStatus>) {
    assert_eq!(IssueStatus::from_canonical(canonical), expected);
}

#[test]
fn test_issue_update_from_item() {
    let update = IssueUpdate::from_item(&json!({
        "id": "10",
        "status": "closed",
        "assignedTo": "dana@acme.io",
        "hasSeen": false
    }));
    assert_eq!(
        update,
        IssueUpdate {
            status: Some(IssueStatus::Resolved),
            assigned_to: Some("dana@acme.io".to_string()),
            has_seen: Some(false),
        }
    );
    assert_eq!(
        serde_json::to_value(&update).unwrap(),
        json!({"status": "resolved", "assignedTo": "dana@acme.io", "hasSeen": false})
    );
}

#[test]
fn test_issue_update_skips_unknown_fields() {
    let update = IssueUpdate::from_item(&json!({"status": "weird", "assignedTo": ""}));
    assert!(update.is_empty());
    assert_eq!(serde_json::to_value(&update).unwrap(), json!({}));
}

#[test]
fn test_create_issue_is_unsupported() {
    let response = create_issue(&json!({"id": "x"}));
    assert!(!response.is_success());
    assert!(response.delay.is_none());
    assert!(response.error.unwrap().contains("not supported"));
}

#[tokio::test]
async fn test_load_issue_update_success() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/issues/10/"))
        .and(body_json(json!({"status": "unresolved"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "10"})))
        .expect(1)
        .mount(&server)
        .await;

    let response =
        load_issue_update(&client_for(&server), &json!({"external_id": "10", "status": "open"}))
            .await;
    assert_eq!(response, LoadResponse::loaded("10"));
}

#[tokio::test]
async fn test_load_issue_update_failure_asks_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/issues/10/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response =
        load_issue_update(&client_for(&server), &json!({"id": 10, "hasSeen": true})).await;
    assert_eq!(response.delay, Some(RETRY_DELAY_SECS));
    assert!(response.error.unwrap().starts_with("Failed to update issue"));
}

#[tokio::test]
async fn test_load_issue_update_requires_id() {
    let server = MockServer::start().await;
    let response = load_issue_update(&client_for(&server), &json!({"status": "open"})).await;
    assert_eq!(response, LoadResponse::failed("No issue ID provided for update"));
}

#[tokio::test]
async fn test_load_comment_uses_fallback_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/issues/10/notes/"))
        .and(body_json(json!({"text": "seen in prod"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "n7"})))
        .expect(1)
        .mount(&server)
        .await;

    let response =
        load_comment(&client_for(&server), &json!({"issue_id": "10", "content": "seen in prod"}))
            .await;
    assert_eq!(response, LoadResponse::loaded("n7"));
}

#[tokio::test]
async fn test_load_comment_missing_text() {
    let server = MockServer::start().await;
    let response = load_comment(&client_for(&server), &json!({"parent_id": "10"})).await;
    assert_eq!(response.error.as_deref(), Some("Missing issue ID or comment text"));
}

#[tokio::test]
async fn test_load_dispatches_on_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/issues/10/notes/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "n8"})))
        .expect(1)
        .mount(&server)
        .await;

    let request: LoadRequest = serde_json::from_value(json!({
        "action": "create_comment",
        "connectionContext": {"token": "tok", "orgIdentifier": "acme"},
        "item": {"parent_id": "10", "text": "hello"}
    }))
    .unwrap();
    assert_eq!(request.action, LoadAction::CreateComment);
    assert_eq!(load(&client_for(&server), &request).await, LoadResponse::loaded("n8"));

    let create = LoadRequest {
        action: LoadAction::CreateIssue,
        ..request
    };
    assert!(!load(&client_for(&server), &create).await.is_success());
}
