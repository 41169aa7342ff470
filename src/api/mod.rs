//! HTTP surface
//!
//! Both roles expose `POST /sort` and `GET /health`:
//!
//! | Route          | Coordinator                          | Worker                 |
//! |----------------|--------------------------------------|------------------------|
//! | `POST /sort`   | [`SortService::sort`] (may distribute) | local sort only      |
//! | `GET /health`  | includes `active_workers`            | `role = "worker"`      |
//!
//! Invalid payloads answer 400, bodies over the configured size limit 413,
//! internal failures 500, all as `{ "error": message }`.

pub mod error;

use crate::distributed::protocol::{endpoints, HealthResponse, SortResponse, WorkerSortResponse};
use crate::distributed::WorkerService;
use crate::service::SortService;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use error::ApiResult;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Router for a coordinator process, accepting bodies up to `body_limit` bytes
pub fn coordinator_router(service: Arc<SortService>, body_limit: usize) -> Router {
    Router::new()
        .route(endpoints::SORT, post(coordinator_sort))
        .route(endpoints::HEALTH, get(coordinator_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Router for a worker process, accepting bodies up to `body_limit` bytes
pub fn worker_router(worker: Arc<WorkerService>, body_limit: usize) -> Router {
    Router::new()
        .route(endpoints::SORT, post(worker_sort))
        .route(endpoints::HEALTH, get(worker_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(worker)
}

async fn coordinator_sort(
    State(service): State<Arc<SortService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SortResponse>> {
    let Json(payload) = payload?;

    match service.sort(&payload).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(error = %e, "Error processing sort request");
            Err(e.into())
        }
    }
}

async fn coordinator_health(State(service): State<Arc<SortService>>) -> Json<HealthResponse> {
    Json(service.health().await)
}

async fn worker_sort(
    State(worker): State<Arc<WorkerService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<WorkerSortResponse>> {
    let Json(payload) = payload?;

    match worker.handle_sort_request(&payload).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(worker_id = worker.identity(), error = %e, "Error processing sort request");
            Err(e.into())
        }
    }
}

async fn worker_health(State(worker): State<Arc<WorkerService>>) -> Json<HealthResponse> {
    Json(worker.handle_health_request())
}

/// Serve `router` on an already-bound listener until Ctrl-C
pub async fn serve_on(listener: TcpListener, router: Router) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

/// Bind `address` and serve `router` until Ctrl-C
pub async fn serve(address: &str, router: Router) -> Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address, "Listening");
    serve_on(listener, router).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DispatchConfig, ServerConfig, WorkerDescriptor};
    use crate::distributed::mock::MockCluster;
    use crate::distributed::Coordinator;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn coordinator_app(cluster: &MockCluster) -> Router {
        let peers = Arc::new(cluster.clone());
        let roster = vec![
            WorkerDescriptor::new(2, "localhost", 5002),
            WorkerDescriptor::new(3, "localhost", 5003),
        ];
        let coordinator = Coordinator::new(1, DispatchConfig::default(), roster, peers.clone(), peers);
        let service = SortService::new(coordinator, "0.0.0.0", 5001);
        coordinator_router(Arc::new(service), ServerConfig::default().max_body_bytes)
    }

    fn worker_app() -> Router {
        worker_app_with_limit(ServerConfig::default().max_body_bytes)
    }

    fn worker_app_with_limit(body_limit: usize) -> Router {
        worker_router(Arc::new(WorkerService::new(2, "0.0.0.0", 5002)), body_limit)
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_coordinator_sort_small() {
        let cluster = MockCluster::new();
        let response = coordinator_app(&cluster)
            .oneshot(post_json("/sort", json!({"data": [3, 1, 2]}).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sorted_data"], json!([1, 2, 3]));
        assert_eq!(body["server_id"], 1);
        assert_eq!(body["distributed"], false);
        assert!(body["time_taken"].is_f64());
    }

    #[tokio::test]
    async fn test_coordinator_sort_distributed() {
        let cluster = MockCluster::new();
        let data: Vec<i64> = (0..100).rev().collect();
        let response = coordinator_app(&cluster)
            .oneshot(post_json("/sort", json!({ "data": data }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let expected: Vec<i64> = (0..100).collect();
        assert_eq!(body["sorted_data"], json!(expected));
        assert_eq!(body["distributed"], true);
        assert_eq!(cluster.dispatched().len(), 2);
    }

    #[tokio::test]
    async fn test_coordinator_rejects_non_list() {
        let cluster = MockCluster::new();
        let response = coordinator_app(&cluster)
            .oneshot(post_json("/sort", json!({"data": 5}).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Expected a list"));
    }

    #[tokio::test]
    async fn test_coordinator_rejects_malformed_json() {
        let cluster = MockCluster::new();
        let response = coordinator_app(&cluster)
            .oneshot(post_json("/sort", "{not json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_coordinator_rejects_empty_list() {
        let cluster = MockCluster::new();
        let response = coordinator_app(&cluster)
            .oneshot(post_json("/sort", json!({"data": []}).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid data format: Empty list provided.");
        assert_eq!(cluster.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_coordinator_accepts_large_body() {
        let cluster = MockCluster::new();
        // Well past axum's 2 MB default
        let data: Vec<i64> = (0..400_000).rev().map(|i| i + 1_000_000).collect();
        let body = json!({ "data": data }).to_string();
        assert!(body.len() > 2 * 1024 * 1024);

        let response = coordinator_app(&cluster)
            .oneshot(post_json("/sort", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let sorted = body["sorted_data"].as_array().unwrap();
        assert_eq!(sorted.len(), 400_000);
        assert_eq!(sorted[0], 1_000_000);
        assert_eq!(body["distributed"], true);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_payload_too_large() {
        let data: Vec<i64> = (0..2_000).collect();
        let response = worker_app_with_limit(1024)
            .oneshot(post_json("/sort", json!({ "data": data }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_coordinator_health() {
        let cluster = MockCluster::new();
        cluster.set_down(3);
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = coordinator_app(&cluster).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "status": "healthy",
                "server_id": 1,
                "host": "0.0.0.0",
                "port": 5001,
                "role": "coordinator",
                "active_workers": [2]
            })
        );
    }

    #[tokio::test]
    async fn test_worker_sort_and_health() {
        let response = worker_app()
            .oneshot(post_json("/sort", json!({"data": [2.5, -1, 2]}).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sorted_data"], json!([-1, 2, 2.5]));
        assert_eq!(body["server_id"], 2);
        assert!(body.get("distributed").is_none());

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let body = body_json(worker_app().oneshot(request).await.unwrap()).await;
        assert_eq!(body["role"], "worker");
        assert_eq!(body["port"], 5002);
        assert!(body.get("active_workers").is_none());
    }

    #[tokio::test]
    async fn test_worker_rejects_non_numbers() {
        let response = worker_app()
            .oneshot(post_json("/sort", json!({"data": ["a", "b"]}).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
