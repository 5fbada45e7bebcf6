//! Sentry API client
//!
//! Every call goes through [`RetryPolicy::execute`], so 429/503 responses are
//! retried with the policy's delays while all other failures surface at once.
//! List endpoints return a [`Page`] whose cursor is tagged with the request
//! path it came from.

use super::rate_limit::Throttle;
use super::retry::{RateLimitSignals, RetryPolicy};
use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use crate::loading::IssueUpdate;
use crate::pagination::{next_cursor, Page, PageLimits, PaginationCursor};
use crate::records::{decode_records, Event, Issue, Member, Project, RecordKind};
use crate::types::ConnectionContext;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// HTTP client for one organization
#[derive(Clone)]
pub struct SentryClient {
    client: Client,
    base_url: String,
    org_slug: String,
    token: String,
    retry: RetryPolicy,
    limits: PageLimits,
    throttle: Option<Throttle>,
}

impl SentryClient {
    /// Build a client for the connection's organization
    pub fn new(connection: &ConnectionContext, config: &ExtractorConfig) -> Result<Self> {
        if connection.org_slug.trim().is_empty() {
            return Err(Error::config("organization slug is empty"));
        }

        let client = Client::builder()
            .timeout(config.api.timeout())
            .user_agent(&config.api.user_agent)
            .build()?;

        let base_url = config.api.base_url_for(&connection.org_slug);
        debug!("Using API endpoint {base_url} for org {}", connection.org_slug);

        Ok(Self {
            client,
            base_url,
            org_slug: connection.org_slug.clone(),
            token: connection.token.clone(),
            retry: config.retry.clone(),
            limits: config.pagination.clone(),
            throttle: config.throttle.as_ref().map(Throttle::new),
        })
    }

    /// Organization slug
    pub fn org_slug(&self) -> &str {
        &self.org_slug
    }

    /// Resolved API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page limits this client was built with
    pub fn limits(&self) -> &PageLimits {
        &self.limits
    }

    // ========================================================================
    // Query paths
    // ========================================================================

    /// Path listing the issues of one project; also the cursor origin
    pub fn issues_path(&self, project_slug: &str) -> String {
        format!("/projects/{}/{project_slug}/issues/", self.org_slug)
    }

    /// Path listing the events of one issue; also the cursor origin
    pub fn events_path(issue_id: &str) -> String {
        format!("/issues/{issue_id}/events/")
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// `GET /organizations/{org}/projects/`
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let path = format!("/organizations/{}/projects/", self.org_slug);
        let values: Vec<Value> = self.get_json(&path).await?;
        Ok(decode_records(values, RecordKind::Project))
    }

    /// `GET /projects/{org}/{project}/` by id or slug
    pub async fn get_project(&self, id_or_slug: &str) -> Result<Project> {
        let path = format!("/projects/{}/{id_or_slug}/", self.org_slug);
        self.get_json(&path).await
    }

    /// `GET /projects/{org}/{project}/issues/`, one page
    pub async fn list_issues(
        &self,
        project_slug: &str,
        cursor: Option<&PaginationCursor>,
    ) -> Result<Page<Issue>> {
        let path = self.issues_path(project_slug);
        let page = self
            .get_page(&path, self.limits.issues_page_size, cursor)
            .await?;
        debug!(
            "Fetched {} issues for project {project_slug} (next: {})",
            page.items.len(),
            page.has_next()
        );
        Ok(Page::new(
            decode_records(page.items, RecordKind::Issue),
            page.next,
        ))
    }

    /// `GET /issues/{id}/events/`, one page
    pub async fn list_events(
        &self,
        issue_id: &str,
        cursor: Option<&PaginationCursor>,
    ) -> Result<Page<Event>> {
        let path = Self::events_path(issue_id);
        let page = self
            .get_page(&path, self.limits.events_page_size, cursor)
            .await?;
        Ok(Page::new(
            decode_records(page.items, RecordKind::Event),
            page.next,
        ))
    }

    /// `GET /organizations/{org}/members/`
    pub async fn list_members(&self) -> Result<Vec<Member>> {
        let path = format!("/organizations/{}/members/", self.org_slug);
        let values: Vec<Value> = self.get_json(&path).await?;
        Ok(decode_records(values, RecordKind::Member))
    }

    /// `PUT /issues/{id}/`
    pub async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> Result<Value> {
        let path = format!("/issues/{issue_id}/");
        let body = serde_json::to_value(update)?;
        let (path, body) = (path.as_str(), &body);
        self.retry
            .execute(move || async move {
                let response = self.send(Method::PUT, path, &[], Some(body)).await?;
                Ok(response.json::<Value>().await?)
            })
            .await
    }

    /// `POST /issues/{id}/notes/`
    pub async fn create_comment(&self, issue_id: &str, text: &str) -> Result<Value> {
        let path = format!("/issues/{issue_id}/notes/");
        let body = json!({ "text": text });
        let (path, body) = (path.as_str(), &body);
        self.retry
            .execute(move || async move {
                let response = self.send(Method::POST, path, &[], Some(body)).await?;
                Ok(response.json::<Value>().await?)
            })
            .await
    }

    // ========================================================================
    // Transport
    // ========================================================================

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.retry
            .execute(move || async move {
                let response = self.send(Method::GET, path, &[], None).await?;
                Ok(response.json::<T>().await?)
            })
            .await
    }

    async fn get_page(
        &self,
        path: &str,
        limit: u32,
        cursor: Option<&PaginationCursor>,
    ) -> Result<Page<Value>> {
        let cursor = match cursor {
            Some(c) if c.belongs_to(path) => Some(c.token.clone()),
            Some(c) => {
                warn!(
                    "Ignoring cursor from '{}' for query '{path}', starting from the first page",
                    c.origin
                );
                None
            }
            None => None,
        };

        let mut query = vec![("limit", limit.to_string())];
        if let Some(token) = cursor {
            query.push(("cursor", token));
        }

        let query = query.as_slice();
        self.retry
            .execute(move || async move {
                let response = self.send(Method::GET, path, query, None).await?;
                let next = response
                    .headers()
                    .get("link")
                    .and_then(|v| v.to_str().ok())
                    .and_then(next_cursor)
                    .map(|token| PaginationCursor::new(token, path));
                let items: Vec<Value> = response.json().await?;
                Ok(Page::new(items, next))
            })
            .await
    }

    /// Issue one request and classify the response status
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Response> {
        if let Some(throttle) = &self.throttle {
            throttle.acquire().await;
        }

        let url = format!("{}{path}", self.base_url);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
            let signals = RateLimitSignals::from_headers(response.headers());
            return Err(Error::RateLimited {
                status: status.as_u16(),
                retry_after: signals.retry_after,
                reset_at: signals.reset_at,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!("{method} {url} -> {}", status.as_u16());
        Ok(response)
    }
}

impl std::fmt::Debug for SentryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryClient")
            .field("base_url", &self.base_url)
            .field("org_slug", &self.org_slug)
            .field("retry", &self.retry)
            .field("has_throttle", &self.throttle.is_some())
            .finish_non_exhaustive()
    }
}
