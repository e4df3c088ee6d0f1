//! Route table and handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::pipeline::{Pipeline, StatusReport};

/// Build the router: `POST /` takes events, `GET /` and `GET /healthz` are liveness checks
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(health).post(handle_event))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle_event(
    State(pipeline): State<Arc<Pipeline>>,
    Json(event): Json<Value>,
) -> (StatusCode, Json<StatusReport>) {
    let result = pipeline.handle(&event).await;

    let status = if result.is_failure() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status, Json(result.report()))
}
