use async_trait::async_trait;
use crate::error::AgentError;
use crate::llm::{ChatBackend, ChatRequest};
use crate::types::{ChatResponse, Message, Role};

// ── Anthropic request types ──────────────────────────────

#[derive(serde::Serialize)]
struct AnthropicRequest {
    model:       String,
    max_tokens:  u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system:      Option<String>,
    messages:    Vec<AnthropicMessage>,
}

#[derive(serde::Serialize)]
struct AnthropicMessage {
    role:    String,
    content: String,
}

// ── Anthropic response types ─────────────────────────────

#[derive(serde::Deserialize, Debug)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    // Not requested by this runtime (chat-only family) but tolerated so an
    // unexpected block does not fail deserialization.
    #[serde(other)]
    Other,
}

// ── Backend ──────────────────────────────────────────────

/// The chat-only family: no tool table is ever sent, the leading `system`
/// message is hoisted into the request's dedicated field, and max_tokens
/// defaults to 4096 when the caller left it unset.
pub struct AnthropicBackend {
    client:   reqwest::Client,
    api_key:  String,
    api_base: String,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client:   reqwest::Client::new(),
            api_key:  api_key.into(),
            api_base: "https://api.anthropic.com".to_string(),
        }
    }

    pub fn from_env() -> Result<Self, AgentError> {
        let key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AgentError::Provider("ANTHROPIC_API_KEY not set".to_string()))?;
        Ok(Self::new(key))
    }

    fn build_request(request: &ChatRequest) -> AnthropicRequest {
        let (system, messages) = Self::build_messages(&request.messages);
        AnthropicRequest {
            model:       request.model.clone(),
            max_tokens:  request.max_tokens.unwrap_or(4096),
            temperature: request.temperature,
            system,
            messages,
        }
    }

    /// Splits the canonical log into (system, turns). Only user/assistant
    /// turns with text content survive; tool plumbing has no Anthropic
    /// representation here.
    fn build_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system = None;
        let mut turns  = Vec::new();

        for m in messages {
            match m.role {
                Role::System => {
                    if system.is_none() {
                        system = m.content.clone();
                    }
                }
                Role::User | Role::Assistant => {
                    if let Some(content) = &m.content {
                        turns.push(AnthropicMessage {
                            role:    m.role.to_string(),
                            content: content.clone(),
                        });
                    }
                }
                Role::Tool => {}
            }
        }

        (system, turns)
    }
}

#[async_trait]
impl ChatBackend for AnthropicBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let body = Self::build_request(request);

        let response = self.client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key",         &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type",      "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("Network error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body   = response.text().await.unwrap_or_default();
            return Err(AgentError::Provider(format!("Anthropic API error {}: {}", status, body)));
        }

        let parsed: AnthropicResponse = response.json()
            .await
            .map_err(|e| AgentError::Provider(format!("Failed to parse Anthropic response: {}", e)))?;

        for block in parsed.content {
            if let AnthropicContentBlock::Text { text } = block {
                return Ok(ChatResponse::text(text));
            }
        }

        Err(AgentError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, ToolCallRequest};

    fn chat_request(messages: Vec<Message>) -> ChatRequest {
        ChatRequest::simple("claude-3-opus", messages, 0.5)
    }

    #[test]
    fn leading_system_message_is_hoisted() {
        let request = chat_request(vec![
            Message::system("be terse"),
            Message::user("hello"),
            Message::assistant("hi"),
        ]);

        let body = AnthropicBackend::build_request(&request);

        assert_eq!(body.system.as_deref(), Some("be terse"));
        assert_eq!(body.messages.len(), 2, "the system message must not remain a turn");
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.messages[0].content, "hello");
        assert_eq!(body.messages[1].role, "assistant");
    }

    #[test]
    fn only_the_first_system_message_wins() {
        let request = chat_request(vec![
            Message::system("first"),
            Message::user("q"),
            Message::system("second"),
        ]);

        let body = AnthropicBackend::build_request(&request);

        assert_eq!(body.system.as_deref(), Some("first"));
        assert_eq!(body.messages.len(), 1, "a later system message is neither hoisted nor forwarded");
    }

    #[test]
    fn tool_plumbing_is_dropped_from_turns() {
        let call = ToolCallRequest {
            id:        "id_1".to_string(),
            name:      "echo".to_string(),
            arguments: "{}".to_string(),
        };
        let request = chat_request(vec![
            Message::system("sys"),
            Message::user("q"),
            Message::tool_request(None, vec![call]),
            Message::tool("id_1", "echo", "result"),
            Message::assistant("done"),
        ]);

        let body = AnthropicBackend::build_request(&request);

        // Only the user turn and the text answer survive; the content-less
        // tool request and the tool result have no representation here.
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].content, "q");
        assert_eq!(body.messages[1].content, "done");
    }

    #[test]
    fn max_tokens_defaults_to_4096_when_unset() {
        let request = chat_request(vec![Message::user("q")]);
        let body = AnthropicBackend::build_request(&request);
        assert_eq!(body.max_tokens, 4096);

        let explicit = ChatRequest { max_tokens: Some(512), ..chat_request(vec![Message::user("q")]) };
        let body = AnthropicBackend::build_request(&explicit);
        assert_eq!(body.max_tokens, 512, "an explicit value passes through unmodified");
    }

    #[test]
    fn temperature_passes_through() {
        let request = chat_request(vec![Message::user("q")]);
        let body = AnthropicBackend::build_request(&request);
        assert_eq!(body.temperature, 0.5);
        assert_eq!(body.model, "claude-3-opus");
    }
}
