//! Per-variant normalizers

use super::timestamp::normalize_timestamp;
use super::types::NormalizedItem;
use crate::records::{Event, ExternalRecord, Issue, Member, Project};
use crate::types::{JsonObject, JsonValue};
use serde_json::json;

/// Normalize any external record
pub fn normalize(record: &ExternalRecord) -> NormalizedItem {
    match record {
        ExternalRecord::Project(p) => normalize_project(p),
        ExternalRecord::Issue(i) => normalize_issue(i),
        ExternalRecord::Member(m) => normalize_user(m),
        ExternalRecord::Event(e) => normalize_event(e),
    }
}

fn into_object(value: JsonValue) -> JsonObject {
    match value {
        JsonValue::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// Counters arrive as numbers or numeric strings
fn counter(value: Option<&JsonValue>) -> u64 {
    match value {
        Some(JsonValue::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(JsonValue::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn display(value: Option<&JsonValue>) -> String {
    match value {
        Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
        Some(JsonValue::Null) | None => "unknown".to_string(),
        Some(JsonValue::String(_)) => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

// ============================================================================
// Projects
// ============================================================================

/// Normalize a project
pub fn normalize_project(project: &Project) -> NormalizedItem {
    let created = normalize_timestamp(project.date_created.as_ref());

    NormalizedItem {
        id: project.id.clone().unwrap_or_default(),
        created_date: created.clone(),
        modified_date: created,
        data: into_object(json!({
            "name": project.name,
            "slug": project.slug,
            "platform": project.platform,
            "status": project.status,
            "organization": project.organization.as_ref().and_then(|o| o.slug.clone()),
        })),
    }
}

// ============================================================================
// Issues
// ============================================================================

/// Normalize an issue.
///
/// The organization slug and project fall back to the context the issue was
/// fetched under; the permalink falls back to the organization's issue URL.
pub fn normalize_issue(issue: &Issue) -> NormalizedItem {
    let id = issue.id.clone().unwrap_or_default();
    let context = issue.context.as_ref();
    let org_slug = context
        .map(|c| c.org_slug.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown");

    let permalink = non_empty(issue.permalink.as_ref())
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("https://{org_slug}.sentry.io/issues/{id}/"));

    let count = counter(issue.count.as_ref());
    let user_count = counter(issue.user_count.as_ref());
    let metadata = issue.metadata.clone().unwrap_or_default();
    let project = issue.project.clone().unwrap_or_default();

    let project_id = project
        .id
        .or_else(|| context.and_then(|c| c.project_id.clone()));
    let project_slug = project
        .slug
        .or_else(|| context.map(|c| c.project_slug.clone()));

    let data = json!({
        "title": non_empty(issue.title.as_ref()).unwrap_or("untitled error"),
        "culprit": issue.culprit.clone().unwrap_or_default(),
        "body": issue_body(issue, count, user_count, &permalink),
        "level": non_empty(issue.level.as_ref()).unwrap_or("error"),
        "status": issue.status,
        "count": count,
        "userCount": user_count,
        "permalink": permalink,
        "item_url_field": permalink,
        "metadata": {
            "type": metadata.error_type.or_else(|| issue.issue_type.clone()),
            "value": metadata.value,
            "filename": metadata.filename,
            "function": metadata.function,
        },
        "assignedTo": issue.assigned_to.as_ref().and_then(|a| a.email.clone()),
        "firstSeen": normalize_timestamp(issue.first_seen.as_ref()),
        "lastSeen": normalize_timestamp(issue.last_seen.as_ref()),
        "platform": issue.platform,
        "project": {
            "id": project_id,
            "name": project.name,
            "slug": project_slug,
        },
    });

    NormalizedItem {
        id,
        created_date: normalize_timestamp(issue.first_seen.as_ref()),
        modified_date: normalize_timestamp(issue.last_seen.as_ref()),
        data: into_object(data),
    }
}

/// Markdown summary of an issue
fn issue_body(issue: &Issue, count: u64, user_count: u64, permalink: &str) -> String {
    let mut parts = Vec::new();

    if let Some(culprit) = non_empty(issue.culprit.as_ref()) {
        parts.push(format!("**error location:** {culprit}"));
    }

    if let Some(metadata) = issue.metadata.as_ref().filter(|m| !m.is_empty()) {
        parts.push("\n**error details:**".to_string());
        let lines = [
            ("type", &metadata.error_type),
            ("value", &metadata.value),
            ("file", &metadata.filename),
            ("function", &metadata.function),
        ];
        for (label, value) in lines {
            if let Some(value) = non_empty(value.as_ref()) {
                parts.push(format!("- {label}: {value}"));
            }
        }
    }

    parts.push("\n**impact:**".to_string());
    parts.push(format!("- occurrences: {count}"));
    parts.push(format!("- users affected: {user_count}"));
    parts.push(format!("- first seen: {}", display(issue.first_seen.as_ref())));
    parts.push(format!("- last seen: {}", display(issue.last_seen.as_ref())));

    if let Some(platform) = non_empty(issue.platform.as_ref()) {
        parts.push(format!("\n**platform:** {platform}"));
    }

    parts.push(format!(
        "\n**status:** {}",
        non_empty(issue.status.as_ref()).unwrap_or("unknown")
    ));

    if !issue.annotations.is_empty() {
        parts.push("\n**annotations:**".to_string());
        for annotation in &issue.annotations {
            let text = match annotation {
                JsonValue::String(s) => s.clone(),
                JsonValue::Object(map) => map
                    .get("displayName")
                    .and_then(JsonValue::as_str)
                    .map_or_else(|| annotation.to_string(), ToString::to_string),
                other => other.to_string(),
            };
            parts.push(format!("- {text}"));
        }
    }

    parts.push(format!("\n**[view in sentry]({permalink})**"));
    parts.join("\n")
}

// ============================================================================
// Members
// ============================================================================

/// Normalize an organization member into a user item
pub fn normalize_user(member: &Member) -> NormalizedItem {
    let user = member.user.clone().unwrap_or_default();
    let email = non_empty(member.email.as_ref()).or(non_empty(user.email.as_ref()));

    let name = non_empty(user.name.as_ref())
        .or(non_empty(member.name.as_ref()))
        .map(ToString::to_string)
        .or_else(|| {
            email
                .and_then(|e| e.split('@').next())
                .filter(|local| !local.is_empty())
                .map(ToString::to_string)
        });

    let created = normalize_timestamp(member.date_created.as_ref());

    let data = json!({
        "email": email,
        "name": name,
        "role": member.role.clone().or_else(|| member.role_name.clone()),
        "flags": {
            "has2fa": user.has2fa.unwrap_or(false),
            "ssoLinked": member.flag("sso:linked"),
            "isActive": !member.expired.unwrap_or(false),
        },
        "teams": member.teams,
        "orgRole": member.org_role,
        "pending": member.pending.unwrap_or(false),
    });

    NormalizedItem {
        id: member.id.clone().unwrap_or_default(),
        created_date: created.clone(),
        modified_date: created,
        data: into_object(data),
    }
}

// ============================================================================
// Events
// ============================================================================

/// Normalize a single error occurrence
pub fn normalize_event(event: &Event) -> NormalizedItem {
    let id = non_empty(event.id.as_ref())
        .or(non_empty(event.event_id.as_ref()))
        .unwrap_or_default()
        .to_string();
    let created = normalize_timestamp(event.date_created.as_ref());

    let context = |key: &str| event.contexts.as_ref().and_then(|c| c.get(key)).cloned();

    let data = json!({
        "message": event.message.clone().or_else(|| event.title.clone()),
        "platform": event.platform,
        "environment": event.environment,
        "release": event.release,
        "user": event.user.as_ref().map(|u| json!({
            "id": u.id,
            "email": u.email,
            "ip_address": u.ip_address,
        })),
        "contexts": {
            "browser": context("browser"),
            "os": context("os"),
            "device": context("device"),
        },
        "tags": event.tags,
        "issueId": event.group_id,
    });

    NormalizedItem {
        id,
        created_date: created.clone(),
        modified_date: created,
        data: into_object(data),
    }
}
