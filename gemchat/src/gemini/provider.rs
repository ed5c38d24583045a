//! Provider seams and the fixed chat configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::GeminiError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 800;

/// Configuration a chat is bound to at creation. Not changed per turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Preamble shaping the model's behavior for the whole chat.
    pub system_instruction: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Cap on generated tokens per reply.
    pub max_output_tokens: u32,
}

impl ChatConfig {
    /// Default model and sampling settings with the given instruction.
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_instruction: system_instruction.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// A live conversation with the provider.
///
/// The handle owns whatever context the provider needs to answer in light of
/// earlier turns; callers only send text and read text back.
#[async_trait]
pub trait ChatHandle: Send + Sync {
    /// Send one user message and wait for the full reply.
    async fn send_message(&mut self, text: &str) -> Result<String, GeminiError>;

    /// Configuration this chat was created with.
    fn config(&self) -> &ChatConfig;
}

/// Something that can open new chats.
pub trait ChatProvider: Send + Sync {
    fn start_chat(&self, config: &ChatConfig) -> Box<dyn ChatHandle>;
}
