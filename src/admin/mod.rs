//! Management API for the route table and gateway port.

pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use self::handlers::*;
use crate::routing::RouteManager;

pub fn setup_management_router(routes: Arc<RouteManager>) -> Router {
    Router::new()
        .route("/v1/gateway/ping", get(ping))
        .route("/v1/gateway/routes", get(get_routes).post(create_route))
        .route("/v1/gateway/port", get(get_port).put(set_port))
        .layer(TraceLayer::new_for_http())
        .with_state(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GatewayConfig, RuntimeState};
    use crate::routing::Route;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    fn manager_in(dir: &std::path::Path) -> Arc<RouteManager> {
        let config = GatewayConfig {
            runtime_path: dir.to_path_buf(),
            ..GatewayConfig::default()
        };
        Arc::new(RouteManager::new(Arc::new(RuntimeState::new(config))))
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_create_and_list_routes() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        let router = setup_management_router(manager.clone());

        let (status, _) = send(
            router.clone(),
            json_request(
                Method::POST,
                "/v1/gateway/routes",
                serde_json::json!({ "path": "/api", "target": "http://127.0.0.1:8080" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let request = Request::get("/v1/gateway/routes").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([{ "path": "/api", "target": "http://127.0.0.1:8080" }]));
        assert_eq!(manager.get_routes(), vec![Route::new("/api", "http://127.0.0.1:8080")]);
    }

    #[tokio::test]
    async fn test_invalid_target_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        let router = setup_management_router(manager.clone());

        let (status, body) = send(
            router,
            json_request(
                Method::POST,
                "/v1/gateway/routes",
                serde_json::json!({ "path": "/api", "target": "not a url" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("not a url"));
        assert!(manager.get_routes().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_body_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        let router = setup_management_router(manager.clone());

        let (status, body) = send(
            router.clone(),
            json_request(Method::POST, "/v1/gateway/routes", serde_json::json!({ "path": "/api" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("target"));
        assert!(manager.get_routes().is_empty());

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/v1/gateway/port")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"port\":"))
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
        assert_eq!(manager.get_gateway_port(), "8080");
    }

    #[tokio::test]
    async fn test_persist_failure_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("runtime");
        std::fs::write(&blocker, "").unwrap();
        let router = setup_management_router(manager_in(&blocker));

        let (status, body) = send(
            router,
            json_request(
                Method::POST,
                "/v1/gateway/routes",
                serde_json::json!({ "path": "/api", "target": "http://127.0.0.1:8080" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_get_and_set_port() {
        let dir = tempfile::tempdir().unwrap();
        let router = setup_management_router(manager_in(dir.path()));

        let request = Request::get("/v1/gateway/port").body(Body::empty()).unwrap();
        let (status, body) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "port": "8080" }));

        let (status, body) = send(
            router.clone(),
            json_request(Method::PUT, "/v1/gateway/port", serde_json::json!({ "port": "9090" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "port": "9090" }));

        let (status, _) = send(
            router,
            json_request(Method::PUT, "/v1/gateway/port", serde_json::json!({ "port": "99999" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ping() {
        let dir = tempfile::tempdir().unwrap();
        let router = setup_management_router(manager_in(dir.path()));

        let response = router
            .oneshot(Request::get("/v1/gateway/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
