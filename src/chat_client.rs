use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::telemetry::error_chain_fmt;

/// Returned when the upstream reply carries no plain-text content.
pub const NO_RESPONSE_SENTINEL: &str = "No response received";

/// Client for a Cohere-style chat completion API.
///
/// Stateless passthrough: every call is a single non-streaming completion
/// request with a fixed model identifier.
#[derive(Clone, Debug)]
pub struct ChatClient {
    base_url: String,
    http_client: Client,
    api_key: Secret<String>,
    model: String,
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    stream: bool,
    model: &'a str,
    messages: Vec<OutboundMessage<'a>>,
}

#[derive(serde::Serialize)]
struct OutboundMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ChatResponseBody {
    message: Option<AssistantMessage>,
}

#[derive(serde::Deserialize)]
struct AssistantMessage {
    content: Option<MessageContent>,
}

/// The upstream `content` field is either a plain string or a sequence of
/// typed blocks, depending on the model.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(serde::Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(serde::Deserialize)]
struct UpstreamError {
    message: String,
}

#[derive(thiserror::Error)]
pub enum ChatClientError {
    /// The upstream API rejected the request; carries its error message.
    #[error("{0}")]
    Api(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl std::fmt::Debug for ChatClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ChatClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        model: String,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = Client::builder().timeout(timeout).build().unwrap();
        Self {
            http_client,
            base_url,
            api_key,
            model,
        }
    }

    /// Forwards a single user message and returns the normalized reply text.
    #[tracing::instrument(name = "Forwarding chat message", skip(self, message))]
    pub async fn chat(&self, message: &str) -> Result<String, ChatClientError> {
        let url = format!("{}/v2/chat", self.base_url);
        let request_body = ChatRequest {
            stream: false,
            model: &self.model,
            messages: vec![OutboundMessage {
                role: "user",
                content: message,
            }],
        };
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await?;

        if let Err(error) = response.error_for_status_ref() {
            tracing::error!("Chat API returned an error status: {:?}", error);
            // Prefer the API's own error message over the bare status line.
            let message = match response.json::<UpstreamError>().await {
                Ok(upstream) => upstream.message,
                Err(_) => error.to_string(),
            };
            return Err(ChatClientError::Api(message));
        }

        let body: ChatResponseBody = response.json().await?;
        Ok(extract_text(body))
    }
}

/// Extracts the first plain-text content from an upstream reply, falling back
/// to [`NO_RESPONSE_SENTINEL`] when none is present.
fn extract_text(body: ChatResponseBody) -> String {
    match body.message.and_then(|message| message.content) {
        Some(MessageContent::Text(text)) => text,
        Some(MessageContent::Blocks(blocks)) => blocks
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .unwrap_or_else(|| NO_RESPONSE_SENTINEL.into()),
        None => NO_RESPONSE_SENTINEL.into(),
    }
}
