//! Gemini chat client.
//!
//! The rest of the crate only sees two seams: a [`ChatProvider`] that opens
//! chats and a [`ChatHandle`] that sends text and gets text back.

mod client;
mod error;
mod provider;
mod wire;

#[cfg(test)]
pub mod testing;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use provider::{
    ChatConfig, ChatHandle, ChatProvider, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
