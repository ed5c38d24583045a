//! HTTP handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use super::ServerState;
use crate::gemini::ChatConfig;
use crate::models::RenderedMessage;
use crate::session::{Removal, SessionSnapshot, RESET_NOTICE};

// === Request/Response Types ===

/// Body of `POST /api/sessions`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Session to resume, if the client already has one.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// Body of `POST /api/sessions/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    /// The user record and the assistant record appended by this turn.
    pub messages: Vec<RenderedMessage>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub notice: &'static str,
    pub session: SessionSnapshot,
}

// === Handlers ===

pub async fn index() -> Html<&'static str> {
    Html(include_str!("ui.html"))
}

pub async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.sessions.live_count().await,
    })
}

pub async fn get_config(State(state): State<Arc<ServerState>>) -> Json<ChatConfig> {
    Json(state.sessions.config().clone())
}

pub async fn create_session(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let (id, _) = state.sessions.get_or_create(req.session_id).await;
    let session = state.sessions.acquire(id).await?;
    Ok(Json(session.snapshot()))
}

pub async fn get_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.sessions.acquire(id).await?;
    Ok(Json(session.snapshot()))
}

pub async fn send_message(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let mut session = state.sessions.acquire(id).await?;

    // The turn runs on its own task so that a client hanging up mid-call
    // does not abort it halfway.
    let turn = tokio::spawn(async move {
        let result = session
            .handle_turn(&req.content)
            .await
            .map(|appended| appended.iter().map(RenderedMessage::from).collect::<Vec<_>>());
        drop(session);
        state.sessions.finish_turn(id).await;
        result
    });

    let messages = turn.await.map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(TurnResponse { messages }))
}

pub async fn reset_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResetResponse>, ApiError> {
    let mut session = state.sessions.acquire(id).await?;
    session.reset();
    Ok(Json(ResetResponse {
        notice: RESET_NOTICE,
        session: session.snapshot(),
    }))
}

pub async fn delete_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match state.sessions.remove(id).await? {
        Removal::Removed => Ok(StatusCode::NO_CONTENT),
        Removal::Deferred => Ok(StatusCode::ACCEPTED),
    }
}
