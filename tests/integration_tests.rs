//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: inbound event → Sentry API → canonical
//! items on disk, with state carried between invocations.

use pretty_assertions::assert_eq;
use sentry_extractor::engine::{EventType, Extractor, InboundEvent, Signal};
use sentry_extractor::http::RetryPolicy;
use sentry_extractor::normalize::{ExternalSyncUnit, NormalizedItem};
use sentry_extractor::repository::{InMemoryRepository, JsonlRepository};
use sentry_extractor::state::{ExtractionState, Phase, PhaseStatus, StateManager};
use sentry_extractor::{ConnectionContext, ExtractorConfig, ItemType};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn config_for(server: &MockServer) -> ExtractorConfig {
    ExtractorConfig::new()
        .with_base_url(server.uri())
        .with_retry(RetryPolicy::new(3, 1))
}

fn connection() -> ConnectionContext {
    ConnectionContext::new("test-token", "acme")
}

fn issue_page(range: std::ops::Range<usize>) -> Value {
    Value::Array(
        range
            .map(|i| {
                json!({
                    "id": i.to_string(),
                    "title": format!("TypeError #{i}"),
                    "culprit": "app/main.js",
                    "count": "3",
                    "userCount": 1,
                    "firstSeen": "2024-01-01T00:00:00Z",
                    "lastSeen": "2024-01-02T00:00:00Z",
                    "status": "unresolved"
                })
            })
            .collect(),
    )
}

async fn mount_org(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/organizations/acme/projects/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "name": "Web", "slug": "web", "platform": "javascript", "status": "active"},
            {"id": "", "name": "Broken"}
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/acme/web/issues/"))
        .and(query_param("cursor", "1700000000:0:1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_page(100..101)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/acme/web/issues/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "link",
                    "<https://sentry.io/api/0/projects/acme/web/issues/?&cursor=1700000000:0:1>; \
                     rel=\"next\"; results=\"true\"; cursor=\"1700000000:0:1\"",
                )
                .set_body_json(issue_page(0..100)),
        )
        .mount(server)
        .await;
}

fn sync_units_from(signal: &Signal) -> Vec<ExternalSyncUnit> {
    serde_json::from_value(signal.event_data["items"].clone()).unwrap()
}

// ============================================================================
// Full Run
// ============================================================================

#[tokio::test]
async fn test_full_run_through_all_phases() {
    let server = MockServer::start().await;
    mount_org(&server).await;
    Mock::given(method("GET"))
        .and(path("/organizations/acme/members/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let repository = Arc::new(InMemoryRepository::new());
    let extractor = Extractor::new(config_for(&server), repository.clone());

    let signal = extractor
        .handle(InboundEvent::new(EventType::ExternalSyncUnitsStart, connection()))
        .await;
    assert_eq!(signal.event_type.to_string(), "EXTRACTION_EXTERNAL_SYNC_UNITS_DONE");
    let units = sync_units_from(&signal);
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].query_key.as_deref(), Some("web"));

    let signal = extractor
        .handle(
            InboundEvent::new(EventType::MetadataStart, connection())
                .with_state(signal.state)
                .with_sync_units(units.clone()),
        )
        .await;
    assert_eq!(signal.event_type.to_string(), "EXTRACTION_METADATA_DONE");

    let signal = extractor
        .handle(
            InboundEvent::new(EventType::DataStart, connection())
                .with_state(signal.state)
                .with_sync_units(units),
        )
        .await;
    assert_eq!(signal.event_type.to_string(), "EXTRACTION_DATA_DONE");
    assert_eq!(signal.event_data, json!({"issues": 101, "users": 0}));

    let signal = extractor
        .handle(InboundEvent::new(EventType::AttachmentsStart, connection()).with_state(signal.state))
        .await;
    assert_eq!(signal.event_data, json!({"count": 0}));
    assert!(signal.state.is_finished());

    assert_eq!(repository.len(ItemType::SentryIssues), 101);
    assert_eq!(repository.len(ItemType::SentryUsers), 0);

    let issue = &repository.items(ItemType::SentryIssues)[0];
    assert_eq!(issue.id, "0");
    assert_eq!(issue.created_date, "2024-01-01T00:00:00Z");
    assert_eq!(issue.data["count"], 3);
    assert_eq!(issue.data["permalink"], "https://acme.sentry.io/issues/0/");
}

#[tokio::test]
async fn test_state_round_trips_through_state_file() {
    let server = MockServer::start().await;
    mount_org(&server).await;
    Mock::given(method("GET"))
        .and(path("/organizations/acme/members/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "m1", "email": "dana@acme.io", "user": {"name": "Dana", "has2fa": true}}
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let out_dir = dir.path().join("out");

    let repository = Arc::new(JsonlRepository::new(&out_dir).unwrap());
    let extractor = Extractor::new(config_for(&server), repository.clone());
    let manager = StateManager::from_file(&state_path).unwrap();

    // A deadline in the past interrupts the data phase before any request
    let mut state = ExtractionState::new();
    state.phase_mut(Phase::SyncUnits).mark_completed();
    state.phase_mut(Phase::Metadata).mark_completed();
    let units = vec![ExternalSyncUnit {
        id: "1".to_string(),
        name: "Web".to_string(),
        description: String::new(),
        item_count: 0,
        item_type: "sentry_projects".to_string(),
        query_key: Some("web".to_string()),
    }];

    let signal = extractor
        .handle(
            InboundEvent::new(EventType::DataStart, connection())
                .with_state(state)
                .with_deadline(chrono::Utc::now() - chrono::Duration::seconds(1))
                .with_sync_units(units.clone()),
        )
        .await;
    assert_eq!(signal.event_type.to_string(), "EXTRACTION_DATA_PROGRESS");
    manager.replace(signal.state).await.unwrap();

    let resumed = StateManager::from_file(&state_path).unwrap().snapshot().await;
    assert_eq!(resumed.status(Phase::Data), PhaseStatus::InProgress);

    let signal = extractor
        .handle(
            InboundEvent::new(EventType::DataContinue, connection())
                .with_state(resumed)
                .with_sync_units(units),
        )
        .await;
    assert_eq!(signal.event_data, json!({"issues": 101, "users": 1}));
    assert_eq!(signal.state.status(Phase::Data), PhaseStatus::Completed);

    let issues = std::fs::read_to_string(repository.bucket_path(ItemType::SentryIssues)).unwrap();
    let items: Vec<NormalizedItem> = issues
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(items.len(), 101);

    let users = std::fs::read_to_string(repository.bucket_path(ItemType::SentryUsers)).unwrap();
    let user: NormalizedItem = serde_json::from_str(users.lines().next().unwrap()).unwrap();
    assert_eq!(user.data["name"], "Dana");
}

#[tokio::test]
async fn test_event_json_from_host() {
    let server = MockServer::start().await;
    mount_org(&server).await;

    let extractor = Extractor::new(config_for(&server), Arc::new(InMemoryRepository::new()));
    let event: InboundEvent = serde_json::from_value(json!({
        "event_type": "EXTRACTION_EXTERNAL_SYNC_UNITS_START",
        "state": {},
        "connection": {"token": "test-token", "org_slug": "acme"}
    }))
    .unwrap();

    let signal = extractor.handle(event).await;
    let wire = serde_json::to_value(&signal).unwrap();

    assert_eq!(wire["event_type"], "EXTRACTION_EXTERNAL_SYNC_UNITS_DONE");
    assert_eq!(wire["event_data"]["items"][0]["item_type"], "sentry_projects");
    assert_eq!(wire["state"]["external_sync_units"]["completed"], true);
}
