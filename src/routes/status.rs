//! Informational endpoints: index, health, and statistics.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use super::AppState;

pub async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "chat": "/api/chat (POST)",
            "health": "/api/health (GET)",
            "stats": "/api/stats (GET)"
        },
        "database_connected": state.database_connected()
    }))
}

pub async fn favicon_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "database_connected": state.database_connected(),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        let store = state.lock_store()?;
        anyhow::ensure!(store.is_connected(), "Database not connected");
        anyhow::Ok(store.statistics())
    })
    .await;

    match result {
        Ok(Ok(stats)) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "stats": stats })),
        )
            .into_response(),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "error": format!("stats task failed: {e}") })),
        )
            .into_response(),
    }
}
