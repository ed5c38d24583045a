//! A single session: message log, chat handle, and the turn handler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::SessionError;
use crate::gemini::{ChatConfig, ChatHandle, ChatProvider};
use crate::models::{Message, RenderedMessage};

/// Prepended to the error text when the model call fails.
pub const WARNING_PREFIX: &str = "⚠️ Model call failed: ";

/// Confirmation shown after a reset.
pub const RESET_NOTICE: &str = "Conversation reset";

/// One user's conversation.
///
/// The log only grows by whole turns (one user record, then one assistant
/// record) and only shrinks through [`ChatSession::reset`]. Both records of a
/// turn are appended together after the model call returns, so a turn that
/// is dropped mid-call leaves no trace.
pub struct ChatSession {
    id: Uuid,
    messages: Vec<Message>,
    chat: Box<dyn ChatHandle>,
    provider: Arc<dyn ChatProvider>,
    config: ChatConfig,
    created_at: DateTime<Utc>,
    last_active: Instant,
}

/// Read-only view returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub system_instruction: String,
    pub messages: Vec<RenderedMessage>,
}

impl ChatSession {
    /// Start a session with an empty log and a fresh chat.
    pub fn new(id: Uuid, provider: Arc<dyn ChatProvider>, config: ChatConfig) -> Self {
        let chat = provider.start_chat(&config);
        Self {
            id,
            messages: Vec::new(),
            chat,
            provider,
            config,
            created_at: Utc::now(),
            last_active: Instant::now(),
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn config(&self) -> &ChatConfig {
        self.chat.config()
    }

    /// Mark the session as used now.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Time since the session was last used.
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    /// Drop the log and the chat, and start over with the same configuration.
    pub fn reset(&mut self) {
        tracing::info!(session = %self.id, dropped = self.messages.len(), "resetting session");
        self.messages.clear();
        self.chat = self.provider.start_chat(&self.config);
    }

    /// Run one turn and return the two records it appended.
    ///
    /// A failed model call still completes the turn: the assistant record
    /// then carries [`WARNING_PREFIX`] and the error text.
    pub async fn handle_turn(&mut self, input: &str) -> Result<&[Message], SessionError> {
        if input.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let user = Message::user(input);
        tracing::debug!(session = %self.id, chars = input.len(), "sending turn");

        let reply = match self.chat.send_message(input).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "model call failed");
                format!("{WARNING_PREFIX}{e}")
            }
        };

        let start = self.messages.len();
        self.messages.push(user);
        self.messages.push(Message::assistant(reply));
        self.touch();

        Ok(&self.messages[start..])
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            created_at: self.created_at,
            system_instruction: self.config().system_instruction.clone(),
            messages: self.messages.iter().map(RenderedMessage::from).collect(),
        }
    }
}
