use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage,
        ChatCompletionTool,
        ChatCompletionToolChoiceOption,
        ChatCompletionToolType,
        CreateChatCompletionRequestArgs,
        FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use crate::error::AgentError;
use crate::llm::{ChatBackend, ChatRequest};
use crate::types::{ChatResponse, Message, Role, ToolCallRequest, ToolChoice};
use serde_json::json;

/// The function-calling-capable family. Also reaches OpenAI-compatible
/// servers (Groq, Together, Ollama, ...) via `with_base_url`.
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self { client: Client::with_config(config) }
    }

    /// Standard client using the OPENAI_API_KEY env var.
    pub fn from_env() -> Self {
        Self { client: Client::new() }
    }

    /// Custom base URL — e.g. "https://api.groq.com/openai/v1".
    pub fn with_base_url(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        Self { client: Client::with_config(config) }
    }

    /// Convert our ToolSchema list into async-openai's ChatCompletionTool type.
    fn build_tools(request: &ChatRequest) -> Vec<ChatCompletionTool> {
        request.tools.iter().map(|schema| {
            ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name:        schema.name.clone(),
                    description: Some(schema.description.clone()),
                    parameters:  Some(schema.input_schema.clone()),
                },
            }
        }).collect()
    }

    /// Render canonical messages into the OpenAI wire shape, then serde
    /// round-trip into async-openai's typed messages.
    fn build_messages(messages: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let wire: Vec<serde_json::Value> = messages.iter().map(|m| match m.role {
            Role::Assistant if !m.tool_calls.is_empty() => {
                let calls: Vec<serde_json::Value> = m.tool_calls.iter().map(|tc| json!({
                    "id":   tc.id,
                    "type": "function",
                    "function": { "name": tc.name, "arguments": tc.arguments },
                })).collect();
                json!({
                    "role":       "assistant",
                    "content":    m.content,
                    "tool_calls": calls,
                })
            }
            Role::Tool => json!({
                "role":         "tool",
                "tool_call_id": m.tool_call_id,
                "content":      m.content.clone().unwrap_or_default(),
            }),
            _ => json!({
                "role":    m.role.to_string(),
                "content": m.content.clone().unwrap_or_default(),
            }),
        }).collect();

        serde_json::from_value(serde_json::Value::Array(wire))
            .map_err(|e| AgentError::Provider(format!("Failed to build messages: {}", e)))
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let messages = Self::build_messages(&request.messages)?;
        let tools    = Self::build_tools(request);

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature);

        if let Some(max_tokens) = request.max_tokens {
            builder.max_tokens(max_tokens);
        }

        // Tools are omitted entirely when the table is empty — some
        // OpenAI-compatible servers reject an empty tools array.
        if !tools.is_empty() {
            builder.tools(tools);
            builder.tool_choice(match request.tool_choice {
                ToolChoice::Auto     => ChatCompletionToolChoiceOption::Auto,
                ToolChoice::None     => ChatCompletionToolChoiceOption::None,
                ToolChoice::Required => ChatCompletionToolChoiceOption::Required,
            });
        }

        let req = builder.build()
            .map_err(|e| AgentError::Provider(format!("Failed to build request: {}", e)))?;

        let response = self.client.chat()
            .create(req)
            .await
            .map_err(|e| AgentError::Provider(format!("OpenAI API error: {}", e)))?;

        let choice = response.choices.into_iter().next()
            .ok_or(AgentError::EmptyResponse)?;
        let message = choice.message;

        let tool_calls = message.tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCallRequest {
                id:        tc.id,
                name:      tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        Ok(ChatResponse {
            content: message.content,
            tool_calls,
        })
    }
}
