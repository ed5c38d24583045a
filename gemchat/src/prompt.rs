//! System instruction loading.

use std::io::ErrorKind;
use std::path::Path;

use crate::config::ConfigError;

/// File read for the system instruction when no other path is given.
pub const DEFAULT_PROMPT_FILE: &str = "prompt.txt";

/// Used when the prompt file is absent or blank.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful, concise assistant.";

/// Load the system instruction from `path`, trimmed.
///
/// A missing file silently falls back to [`DEFAULT_SYSTEM_INSTRUCTION`].
/// Any other read failure is reported.
pub fn load_system_instruction(path: &Path) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                tracing::warn!(path = %path.display(), "prompt file is empty, using default instruction");
                Ok(DEFAULT_SYSTEM_INSTRUCTION.to_string())
            } else {
                tracing::info!(path = %path.display(), "loaded system instruction");
                Ok(trimmed.to_string())
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        Err(source) => Err(ConfigError::Prompt {
            path: path.to_path_buf(),
            source,
        }),
    }
}
