//! HTTP server mode
//!
//! `POST /extract` takes an inbound event and answers with the invocation's
//! signal. State is not kept between requests; the caller sends the state
//! returned by the previous signal. `POST /load` applies one reverse-sync
//! request. Unreadable bodies are answered with `{error: {message}}`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ExtractorConfig;
use crate::engine::{Extractor, InboundEvent};
use crate::error::{Error, Result};
use crate::http::SentryClient;
use crate::loading::{self, LoadRequest, LoadResponse};
use crate::repository::{ItemRepository, JsonlRepository};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Extractor settings used for every request
    pub extractor: ExtractorConfig,
    /// Directory receiving extracted items
    pub output_dir: PathBuf,
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    extractor: Extractor,
}

/// Build the router over a repository
pub fn router(config: ExtractorConfig, repository: Arc<dyn ItemRepository>) -> Router {
    let state = AppState {
        extractor: Extractor::new(config, repository),
    };

    Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract))
        .route("/load", post(load))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    config.extractor.validate()?;
    let repository = JsonlRepository::new(&config.output_dir)?;
    let app = router(config.extractor, Arc::new(repository));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Rejected body in the error payload shape
fn rejection_response(rejection: JsonRejection) -> Response {
    tracing::warn!("Rejecting request body: {}", rejection.body_text());
    (
        rejection.status(),
        Json(json!({ "error": { "message": rejection.body_text() } })),
    )
        .into_response()
}

/// Run one invocation; phase failures are reported inside the signal
async fn extract(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<InboundEvent>, JsonRejection>,
) -> Response {
    let Json(event) = match payload {
        Ok(event) => event,
        Err(rejection) => return rejection_response(rejection),
    };
    let signal = state.extractor.handle(event).await;
    (StatusCode::OK, Json(signal)).into_response()
}

/// Apply one reverse-sync request; failures are reported inside the response
async fn load(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LoadRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    let response = match SentryClient::new(&request.connection, state.extractor.config()) {
        Ok(client) => loading::load(&client, &request).await,
        Err(e) => LoadResponse::failed(format!("invalid connection: {e}")),
    };
    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(
            ExtractorConfig::new().with_base_url("http://127.0.0.1:9"),
            Arc::new(InMemoryRepository::new()),
        )
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_extract_returns_signal() {
        let event = json!({
            "event_type": "EXTRACTION_ATTACHMENTS_START",
            "state": {
                "external_sync_units": {"completed": true},
                "metadata": {"completed": true},
                "data": {"completed": true}
            },
            "connection": {"token": "t", "org_slug": "acme"}
        });
        let request = Request::post("/extract")
            .header("content-type", "application/json")
            .body(Body::from(event.to_string()))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let signal = body_json(response).await;
        assert_eq!(signal["event_type"], "EXTRACTION_ATTACHMENTS_DONE");
        assert_eq!(signal["event_data"]["count"], 0);
        assert_eq!(signal["state"]["attachments"]["completed"], true);
    }

    #[tokio::test]
    async fn test_extract_out_of_order_is_error_signal() {
        let event = json!({
            "event_type": "data",
            "connection": {"token": "t", "org_slug": "acme"}
        });
        let request = Request::post("/extract")
            .header("content-type", "application/json")
            .body(Body::from(event.to_string()))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        let signal = body_json(response).await;
        assert_eq!(signal["event_type"], "EXTRACTION_DATA_ERROR");
        assert!(signal["event_data"]["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_extract_rejects_unknown_event() {
        let request = Request::post("/extract")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "event_type": "EXTRACTION_LOADING_START",
                    "connection": {"token": "t", "org_slug": "acme"}
                })
                .to_string(),
            ))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
        let body = body_json(response).await;
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_extract_malformed_body_is_error_payload() {
        let request = Request::post("/extract")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_refuses_issue_creation() {
        let request = Request::post("/load")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "action": "create_issue",
                    "connection": {"token": "t", "orgIdentifier": "acme"},
                    "item": {"id": "1", "title": "new"}
                })
                .to_string(),
            ))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("not supported"));
        assert!(body.get("delay").is_none());
    }
}
