#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use vitals_api::config::ServerConfig;
use vitals_api::router::build_app_router;
use vitals_api::state::AppState;
use vitals_ingest::client::MqttConfig;
use vitals_ingest::status::ListenerHandle;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        mqtt: MqttConfig {
            broker: "localhost".to_string(),
            port: 1883,
            topic: "health/data".to_string(),
            client_id: "vitals-test".to_string(),
            keep_alive_secs: 60,
        },
    }
}

/// Build the full application router over `pool` with a fresh listener handle.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with_listener(pool, ListenerHandle::new())
}

/// Build the full application router sharing `listener` with the caller.
pub fn build_test_app_with_listener(pool: SqlitePool, listener: ListenerHandle) -> Router {
    let state = AppState { pool, listener };
    build_app_router(state, &test_config())
}

/// Build the full application router with a custom configuration.
pub fn build_test_app_with_config(pool: SqlitePool, config: &ServerConfig) -> Router {
    let state = AppState {
        pool,
        listener: ListenerHandle::new(),
    };
    build_app_router(state, config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
