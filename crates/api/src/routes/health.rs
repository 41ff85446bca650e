use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
}

/// Liveness summary, no auth required.
async fn status(State(state): State<AppState>) -> Json<Value> {
    let engine_state = *state.engine_state.read().await;
    Json(json!({
        "status": "online",
        "service": "Trading Signal Bot",
        "uptime_secs": state.uptime_secs(),
        "engine": engine_state.to_string(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use common::EngineState;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    use crate::{router, AppState};

    async fn get_json(uri: &str, engine: EngineState) -> (StatusCode, serde_json::Value) {
        let state = AppState::new(Arc::new(RwLock::new(engine)));
        let resp = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn root_reports_online_with_engine_state() {
        let (status, body) = get_json("/", EngineState::Running).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "online");
        assert_eq!(body["service"], "Trading Signal Bot");
        assert_eq!(body["engine"], "running");
        assert!(body["uptime_secs"].is_u64());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (status, body) = get_json("/health", EngineState::Stopped).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let state = AppState::new(Arc::new(RwLock::new(EngineState::Stopped)));
        let resp = router(state)
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
