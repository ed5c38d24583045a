//! Per-client chat sessions.
//!
//! A session is the message log plus the chat handle it is mirrored to.
//! The manager keeps one per connected client and tears it down on request
//! or once it has sat idle too long.

mod context;
mod manager;

pub use context::{ChatSession, SessionSnapshot, RESET_NOTICE, WARNING_PREFIX};
pub use manager::{Removal, SessionManager};

use thiserror::Error;
use uuid::Uuid;

/// Errors from session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),

    /// Another turn is still waiting on the model.
    #[error("session {0} is busy with another turn")]
    Busy(Uuid),

    #[error("message must not be empty")]
    EmptyInput,
}
