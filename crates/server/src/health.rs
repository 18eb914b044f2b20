//! Health check endpoint
//!
//! Served from its own listener so monitoring keeps working even when the
//! bot dispatcher is stuck.

use std::net::SocketAddr;

use axum::{Json, Router, routing::get};
use chrono::Utc;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Name reported in health responses
pub const SERVICE_NAME: &str = "weatherbot";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Health check routes
pub fn routes() -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
}

/// Bind the health listener
///
/// Done before any service starts so an unusable port stops startup.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Health server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Serve health routes until `shutdown` is cancelled
pub async fn run_health(listener: TcpListener, shutdown: CancellationToken) -> std::io::Result<()> {
    axum::serve(listener, routes())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = routes()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = get_json("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "weatherbot");
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let (status, body) = get_json("/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = routes()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serves_until_cancelled() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        // Port 0 picks a free port; a cancelled token stops the server at once
        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        run_health(listener, shutdown).await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_fails_on_taken_port() {
        let taken = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = taken.local_addr().unwrap();

        assert!(bind(addr).await.is_err());
    }
}
