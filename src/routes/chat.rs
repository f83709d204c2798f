//! `POST /api/chat`: knowledge base first, generative fallback second.

use anyhow::Result;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::engine::{conversation, select};

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub privacy_mode: bool,
}

fn default_user_id() -> String {
    "anonymous".into()
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Database,
    Fallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Fallback => "fallback",
        }
    }
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
    pub status: &'static str,
    pub privacy_mode: bool,
    pub source: Source,
}

/// Outcome of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub response: String,
    pub source: Source,
}

/// Run one chat turn: match, fall back if needed, then record unless private.
///
/// Only a generator failure is an error. Lookup problems degrade to the
/// fallback path and recording problems are logged.
pub async fn respond(
    state: &AppState,
    message: &str,
    user_id: &str,
    privacy_mode: bool,
) -> Result<ChatTurn> {
    let turn = match lookup(state, message).await {
        Some(response) => ChatTurn {
            response,
            source: Source::Database,
        },
        None => ChatTurn {
            response: state.generator.generate(message).await?,
            source: Source::Fallback,
        },
    };

    if privacy_mode {
        tracing::debug!("privacy mode: conversation not saved");
    } else {
        save(state, user_id, message, &turn.response).await;
    }

    Ok(turn)
}

async fn lookup(state: &AppState, message: &str) -> Option<String> {
    let state = state.clone();
    let message = message.to_string();
    let threshold = state.config.matching.fuzzy_threshold;

    let result = tokio::task::spawn_blocking(move || {
        let store = state.lock_store()?;
        let reply = select(
            &message,
            store.knowledge_base(),
            threshold,
            &mut rand::thread_rng(),
        );
        anyhow::Ok(reply.map(str::to_owned))
    })
    .await;

    match result {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "knowledge base lookup failed; using fallback");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "lookup task failed; using fallback");
            None
        }
    }
}

async fn save(state: &AppState, user_id: &str, message: &str, response: &str) {
    let state = state.clone();
    let user_id = user_id.to_string();
    let message = message.to_string();
    let response = response.to_string();

    let result = tokio::task::spawn_blocking(move || {
        let mut store = state.lock_store()?;
        if !store.is_connected() {
            tracing::debug!("store not connected: conversation not saved");
            return anyhow::Ok(());
        }
        conversation::record(&mut store, &user_id, &message, &response, Utc::now());
        anyhow::Ok(())
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "conversation not saved"),
        Err(e) => tracing::warn!(error = %e, "save task failed"),
    }
}

/// Chat handler
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    // Whitespace-only counts as missing.
    let message = match req.message {
        Some(m) if !m.trim().is_empty() => m,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Message is required" })),
            )
                .into_response();
        }
    };

    tracing::info!(
        user_id = %req.user_id,
        privacy_mode = req.privacy_mode,
        message_len = message.len(),
        "chat request"
    );

    match respond(&state, &message, &req.user_id, req.privacy_mode).await {
        Ok(turn) => {
            tracing::info!(source = turn.source.as_str(), "chat reply");
            let response = ChatResponse {
                response: turn.response,
                timestamp: Utc::now().to_rfc3339(),
                status: "success",
                privacy_mode: req.privacy_mode,
                source: turn.source,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "fallback generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "response": state.config.generator.fallback_message,
                    "error": e.to_string(),
                    "status": "error"
                })),
            )
                .into_response()
        }
    }
}
