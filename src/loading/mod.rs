//! Reverse sync
//!
//! Pushes changes made to canonical items back into Sentry. Only issue
//! updates and notes are supported; Sentry creates issues itself when errors
//! occur, so creation requests are answered with an error.
//!
//! Loaders never return `Err`. Failures are reported inside the
//! [`LoadResponse`], with a retry delay when the failure may be transient.

mod types;

pub use types::{
    IssueStatus, IssueUpdate, LoadAction, LoadRequest, LoadResponse, RETRY_DELAY_SECS,
};

use crate::http::SentryClient;
use crate::types::JsonValue;
use tracing::{info, warn};

/// First non-empty string among `keys` (numbers are stringified)
fn first_string(item: &JsonValue, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Creating issues is not possible through the Sentry API
pub fn create_issue(item: &JsonValue) -> LoadResponse {
    warn!(
        "Refusing to create issue for item {:?}",
        first_string(item, &["id"])
    );
    LoadResponse::failed(
        "Creating issues in Sentry is not supported. Issues are created automatically \
         when errors occur in your applications.",
    )
}

/// Apply status, assignee and seen-flag changes from a canonical issue item
pub async fn load_issue_update(client: &SentryClient, item: &JsonValue) -> LoadResponse {
    let Some(issue_id) = first_string(item, &["external_id", "id"]) else {
        return LoadResponse::failed("No issue ID provided for update");
    };

    let update = IssueUpdate::from_item(item);
    if update.is_empty() {
        info!("Nothing to update on issue {issue_id}");
        return LoadResponse::loaded(issue_id);
    }

    match client.update_issue(&issue_id, &update).await {
        Ok(_) => {
            info!("Updated issue {issue_id}");
            LoadResponse::loaded(issue_id)
        }
        Err(e) => {
            warn!("Failed to update issue {issue_id}: {e}");
            LoadResponse::retry_later(format!("Failed to update issue: {e}"))
        }
    }
}

/// Create a note on the issue named by `parent_id` or `issue_id`
pub async fn load_comment(client: &SentryClient, item: &JsonValue) -> LoadResponse {
    let issue_id = first_string(item, &["parent_id", "issue_id"]);
    let text = first_string(item, &["text", "body", "content"]);
    let (Some(issue_id), Some(text)) = (issue_id, text) else {
        return LoadResponse::failed("Missing issue ID or comment text");
    };

    match client.create_comment(&issue_id, &text).await {
        Ok(body) => {
            let id = first_string(&body, &["id"]).unwrap_or_else(|| "comment-created".to_string());
            info!("Created comment {id} on issue {issue_id}");
            LoadResponse::loaded(id)
        }
        Err(e) => {
            warn!("Failed to create comment on issue {issue_id}: {e}");
            LoadResponse::retry_later(format!("Failed to create comment: {e}"))
        }
    }
}

/// Run one request against its organization
pub async fn load(client: &SentryClient, request: &LoadRequest) -> LoadResponse {
    match request.action {
        LoadAction::UpdateIssue => load_issue_update(client, &request.item).await,
        LoadAction::CreateIssue => create_issue(&request.item),
        LoadAction::CreateComment => load_comment(client, &request.item).await,
    }
}

#[cfg(test)]
mod tests;
