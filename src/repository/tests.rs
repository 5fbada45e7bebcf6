//! Tests for item repositories

use super::*;
use crate::normalize::NormalizedItem;
use crate::schema::ExternalDomainMetadata;
use crate::types::ItemType;
use serde_json::json;
use tempfile::tempdir;

fn item(id: &str) -> NormalizedItem {
    NormalizedItem {
        id: id.to_string(),
        created_date: "2024-01-01T00:00:00.000Z".to_string(),
        modified_date: "2024-01-01T00:00:00.000Z".to_string(),
        data: json!({"title": format!("issue {id}")})
            .as_object()
            .cloned()
            .unwrap(),
    }
}

#[tokio::test]
async fn test_in_memory_buckets() {
    let repo = InMemoryRepository::new();
    assert!(repo.is_empty());

    assert_eq!(
        repo.push(ItemType::SentryIssues, vec![item("1"), item("2")])
            .await
            .unwrap(),
        2
    );
    repo.push(ItemType::SentryIssues, vec![item("3")]).await.unwrap();
    repo.push(ItemType::SentryUsers, vec![]).await.unwrap();

    assert_eq!(repo.len(ItemType::SentryIssues), 3);
    assert_eq!(repo.batches(ItemType::SentryIssues), 2);
    assert_eq!(repo.len(ItemType::SentryUsers), 0);
    assert_eq!(repo.batches(ItemType::SentryUsers), 0);
    assert_eq!(repo.items(ItemType::SentryIssues)[2].id, "3");
}

#[tokio::test]
async fn test_in_memory_metadata() {
    let repo = InMemoryRepository::new();
    let metadata = ExternalDomainMetadata::load_static().unwrap();
    repo.push_metadata(&metadata).await.unwrap();
    assert_eq!(repo.metadata(), vec![metadata]);
    assert!(!repo.is_empty());
}

#[tokio::test]
async fn test_jsonl_appends_lines() {
    let dir = tempdir().unwrap();
    let repo = JsonlRepository::new(dir.path().join("out")).unwrap();

    repo.push(ItemType::SentryIssues, vec![item("1")]).await.unwrap();
    repo.push(ItemType::SentryIssues, vec![item("2"), item("3")])
        .await
        .unwrap();

    let contents = std::fs::read_to_string(repo.bucket_path(ItemType::SentryIssues)).unwrap();
    let ids: Vec<String> = contents
        .lines()
        .map(|line| serde_json::from_str::<NormalizedItem>(line).unwrap().id)
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_jsonl_metadata_bucket() {
    let dir = tempdir().unwrap();
    let repo = JsonlRepository::new(dir.path()).unwrap();
    let metadata = ExternalDomainMetadata::load_static().unwrap();

    repo.push_metadata(&metadata).await.unwrap();

    let path = dir.path().join("external_domain_metadata.jsonl");
    let contents = std::fs::read_to_string(path).unwrap();
    let parsed: ExternalDomainMetadata = serde_json::from_str(contents.trim()).unwrap();
    assert_eq!(parsed, metadata);
}

#[tokio::test]
async fn test_jsonl_empty_batch_creates_nothing() {
    let dir = tempdir().unwrap();
    let repo = JsonlRepository::new(dir.path()).unwrap();
    assert_eq!(repo.push(ItemType::SentryUsers, vec![]).await.unwrap(), 0);
    assert!(!repo.bucket_path(ItemType::SentryUsers).exists());
}
