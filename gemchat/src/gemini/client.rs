//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::provider::{ChatConfig, ChatHandle, ChatProvider};
use super::wire::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use super::GeminiError;
use crate::config::{ApiKey, Settings};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Opens chats against the Gemini REST API.
///
/// Cheap to clone; every chat shares the same connection pool.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: ApiKey,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeminiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GeminiError::Transport)?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, GeminiError> {
        Self::new(
            settings.api_key.clone(),
            settings.base_url.clone(),
            settings.request_timeout,
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    async fn generate(
        &self,
        config: &ChatConfig,
        contents: &[&Content],
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            contents,
            system_instruction: (!config.system_instruction.is_empty())
                .then(|| Content::bare(&config.system_instruction)),
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint(&config.model))
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::from_transport(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeminiError::from_transport(e, self.timeout))?;

        if !status.is_success() {
            return Err(GeminiError::from_status(status, &body));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::Decode(e.to_string()))?;
        parsed.into_text()
    }
}

impl ChatProvider for GeminiClient {
    fn start_chat(&self, config: &ChatConfig) -> Box<dyn ChatHandle> {
        tracing::debug!(model = %config.model, "starting chat");
        Box::new(GeminiChat {
            client: self.clone(),
            config: config.clone(),
            history: Vec::new(),
        })
    }
}

/// One conversation. The REST endpoint is stateless, so the chat replays its
/// own history on every call.
struct GeminiChat {
    client: GeminiClient,
    config: ChatConfig,
    /// Alternating user/model contents of every successful turn.
    history: Vec<Content>,
}

#[async_trait]
impl ChatHandle for GeminiChat {
    async fn send_message(&mut self, text: &str) -> Result<String, GeminiError> {
        let user = Content::user(text);
        let reply = {
            let contents: Vec<&Content> = self.history.iter().chain([&user]).collect();
            self.client.generate(&self.config, &contents).await?
        };

        // Only a completed turn enters the context sent next time.
        self.history.push(user);
        self.history.push(Content::model(&reply));
        Ok(reply)
    }

    fn config(&self) -> &ChatConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// What the stub saw for one request.
    #[derive(Debug, Clone)]
    struct Captured {
        call: String,
        api_key: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct Stub {
        seen: Arc<Mutex<Vec<Captured>>>,
        replies: Arc<Mutex<Vec<(StatusCode, Value)>>>,
        delay: Duration,
    }

    impl Stub {
        fn new(replies: Vec<(StatusCode, Value)>) -> Self {
            Self {
                seen: Arc::new(Mutex::new(Vec::new())),
                replies: Arc::new(Mutex::new(replies)),
                delay: Duration::ZERO,
            }
        }

        fn seen(&self) -> Vec<Captured> {
            self.seen.lock().unwrap().clone()
        }
    }

    async fn stub_handler(
        State(stub): State<Stub>,
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        stub.seen.lock().unwrap().push(Captured {
            call,
            api_key: headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            body,
        });
        if !stub.delay.is_zero() {
            tokio::time::sleep(stub.delay).await;
        }
        let (status, reply) = stub.replies.lock().unwrap().remove(0);
        (status, Json(reply))
    }

    async fn spawn_stub(stub: Stub) -> String {
        let app = Router::new()
            .route("/v1beta/models/{call}", post(stub_handler))
            .with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1beta/")
    }

    fn text_reply(text: &str) -> (StatusCode, Value) {
        (
            StatusCode::OK,
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }]
            }),
        )
    }

    fn config() -> ChatConfig {
        ChatConfig::new("Reply only in French.")
    }

    #[tokio::test]
    async fn test_send_message_posts_config_and_history() {
        let stub = Stub::new(vec![text_reply("Bonjour"), text_reply("Ça va")]);
        let base = spawn_stub(stub.clone()).await;
        let client = GeminiClient::new(ApiKey::new("k-123"), base, Duration::from_secs(5)).unwrap();

        let mut chat = client.start_chat(&config());
        assert_eq!(chat.send_message("Hello").await.unwrap(), "Bonjour");
        assert_eq!(chat.send_message("How are you?").await.unwrap(), "Ça va");

        let seen = stub.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].call, "gemini-2.5-flash:generateContent");
        assert_eq!(seen[0].api_key.as_deref(), Some("k-123"));
        assert_eq!(
            seen[0].body["systemInstruction"]["parts"][0]["text"],
            "Reply only in French."
        );
        assert_eq!(seen[0].body["generationConfig"]["maxOutputTokens"], 800);
        assert_eq!(seen[0].body["contents"].as_array().unwrap().len(), 1);

        let second = seen[1].body["contents"].as_array().unwrap();
        let roles: Vec<&str> = second.iter().map(|c| c["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(second[1]["parts"][0]["text"], "Bonjour");
        assert_eq!(second[2]["parts"][0]["text"], "How are you?");
    }

    #[tokio::test]
    async fn test_failed_turn_is_not_replayed() {
        let stub = Stub::new(vec![
            (
                StatusCode::TOO_MANY_REQUESTS,
                json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}),
            ),
            text_reply("ok"),
        ]);
        let base = spawn_stub(stub.clone()).await;
        let client = GeminiClient::new(ApiKey::new("k"), base, Duration::from_secs(5)).unwrap();

        let mut chat = client.start_chat(&config());
        let err = chat.send_message("first").await.unwrap_err();
        assert!(matches!(err, GeminiError::Api { status: 429, .. }));
        assert!(err.to_string().contains("Quota exceeded"));

        chat.send_message("second").await.unwrap();
        let contents = stub.seen()[1].body["contents"].as_array().unwrap().clone();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["parts"][0]["text"], "second");
    }

    #[tokio::test]
    async fn test_slow_reply_times_out() {
        let mut stub = Stub::new(vec![text_reply("too late")]);
        stub.delay = Duration::from_millis(500);
        let base = spawn_stub(stub).await;
        let client = GeminiClient::new(ApiKey::new("k"), base, Duration::from_millis(50)).unwrap();

        let mut chat = client.start_chat(&config());
        let err = chat.send_message("hi").await.unwrap_err();
        assert!(matches!(err, GeminiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_cancelled_turn_is_not_replayed() {
        let mut stub = Stub::new(vec![text_reply("never seen"), text_reply("ok")]);
        stub.delay = Duration::from_millis(200);
        let base = spawn_stub(stub.clone()).await;
        let client = GeminiClient::new(ApiKey::new("k"), base, Duration::from_secs(5)).unwrap();

        let mut chat = client.start_chat(&config());
        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), chat.send_message("dropped")).await;
        assert!(cancelled.is_err());

        chat.send_message("kept").await.unwrap();
        let seen = stub.seen();
        let contents = seen.last().unwrap().body["contents"].as_array().unwrap().clone();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["parts"][0]["text"], "kept");
    }

    #[tokio::test]
    async fn test_chats_are_independent() {
        let stub = Stub::new(vec![text_reply("one"), text_reply("two")]);
        let base = spawn_stub(stub.clone()).await;
        let client = GeminiClient::new(ApiKey::new("k"), base, Duration::from_secs(5)).unwrap();

        let mut first = client.start_chat(&config());
        first.send_message("a").await.unwrap();
        let mut second = client.start_chat(&config());
        second.send_message("b").await.unwrap();

        let contents = stub.seen()[1].body["contents"].as_array().unwrap().clone();
        assert_eq!(contents.len(), 1);
        assert_eq!(second.config(), &config());
    }
}
