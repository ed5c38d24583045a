//! Data models for chat entities.

mod message;
mod render;

pub use message::{Message, MessageRole};
pub use render::RenderedMessage;
