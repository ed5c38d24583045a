//! Chat server - serves the chat page and the session API.
//!
//! Endpoints:
//! - GET / - Chat UI
//! - GET /api/health - Liveness and live session count
//! - GET /api/config - Model and system instruction in use
//! - POST /api/sessions - Create (or resume) a session
//! - GET /api/sessions/{id} - Session snapshot
//! - DELETE /api/sessions/{id} - Tear a session down (202 if a turn is still running)
//! - POST /api/sessions/{id}/messages - Run one turn
//! - POST /api/sessions/{id}/reset - Clear the conversation
//!
//! Sessions left unused for longer than the idle timeout are dropped by a
//! background sweeper.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::gemini::{ChatConfig, ChatProvider};
use crate::session::SessionManager;

/// Shared server state.
pub struct ServerState {
    /// Live sessions, one per open chat page.
    sessions: SessionManager,
}

impl ServerState {
    pub fn new(provider: Arc<dyn ChatProvider>, config: ChatConfig) -> Self {
        Self {
            sessions: SessionManager::new(provider, config),
        }
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/config", get(handlers::get_config))
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/{id}/messages", post(handlers::send_message))
        .route("/api/sessions/{id}/reset", post(handlers::reset_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop sessions unused for `idle_timeout`.
pub fn spawn_idle_sweeper(state: Arc<ServerState>, idle_timeout: Duration) -> JoinHandle<()> {
    let period = (idle_timeout / 2).max(Duration::from_millis(100));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        tracing::debug!(idle_secs = idle_timeout.as_secs(), "idle sweeper started");
        loop {
            ticker.tick().await;
            state.sessions.evict_idle(idle_timeout).await;
        }
    })
}

/// Start the server and run until Ctrl-C.
pub async fn start_server(
    state: Arc<ServerState>,
    addr: SocketAddr,
    open_browser: bool,
    idle_timeout: Duration,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let addr = listener.local_addr()?;

    tracing::info!(%addr, model = %state.sessions.config().model, "chat server listening");
    println!("Chat server running on http://{addr}");

    if open_browser {
        if let Err(e) = open::that(format!("http://{addr}")) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    let sweeper = spawn_idle_sweeper(state.clone(), idle_timeout);
    let served = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    served.context("Server error")?;

    tracing::info!("chat server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
