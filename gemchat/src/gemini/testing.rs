//! In-memory provider for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{ChatConfig, ChatHandle, ChatProvider, GeminiError};

/// Replies `[chat N] <text>`, where N counts chats opened by this provider.
/// Messages starting with `fail` produce a 503.
#[derive(Default)]
pub struct ScriptedProvider {
    started: AtomicUsize,
    configs: Mutex<Vec<ChatConfig>>,
    delay: Duration,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every reply waits `delay` first.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn chats_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn configs(&self) -> Vec<ChatConfig> {
        self.configs.lock().unwrap().clone()
    }
}

impl ChatProvider for ScriptedProvider {
    fn start_chat(&self, config: &ChatConfig) -> Box<dyn ChatHandle> {
        let serial = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        self.configs.lock().unwrap().push(config.clone());
        Box::new(ScriptedChat {
            serial,
            config: config.clone(),
            delay: self.delay,
        })
    }
}

struct ScriptedChat {
    serial: usize,
    config: ChatConfig,
    delay: Duration,
}

#[async_trait]
impl ChatHandle for ScriptedChat {
    async fn send_message(&mut self, text: &str) -> Result<String, GeminiError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if text.starts_with("fail") {
            return Err(GeminiError::Api {
                status: 503,
                message: "UNAVAILABLE: The model is overloaded.".to_string(),
            });
        }
        Ok(format!("[chat {}] {text}", self.serial))
    }

    fn config(&self) -> &ChatConfig {
        &self.config
    }
}
