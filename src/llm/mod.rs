use crate::config::RuntimeConfig;
use crate::error::AgentError;
use crate::tools::ToolSchema;
use crate::types::{ChatResponse, Message, ToolChoice};
use async_trait::async_trait;
use std::collections::HashMap;

mod openai;
mod anthropic;
mod mock;

pub use openai::OpenAiBackend;
pub use anthropic::AnthropicBackend;
pub use mock::{MockBackend, MockRequestLog};

/// The closed set of supported providers.
///
/// Model names are matched against family tokens once, at agent
/// construction — an unmatched name is a configuration error there, never
/// a per-call surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    /// Classify a model identifier by its family tokens.
    ///
    /// "claude" / "anthropic" → Anthropic; "gpt" / "o1" / "o3" → OpenAI.
    pub fn for_model(model: &str) -> Result<Self, AgentError> {
        let m = model.to_ascii_lowercase();
        if m.contains("claude") || m.contains("anthropic") {
            Ok(Provider::Anthropic)
        } else if m.contains("gpt") || m.contains("o1") || m.contains("o3") {
            Ok(Provider::OpenAi)
        } else {
            Err(AgentError::UnknownProvider(model.to_string()))
        }
    }

    /// Whether this family accepts a tool table. The Anthropic backend is
    /// chat-only in this runtime: tool-bearing conversations routed there
    /// are effectively single-turn.
    pub fn supports_tools(&self) -> bool {
        matches!(self, Provider::OpenAi)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Provider::OpenAi    => write!(f, "OpenAI"),
            Provider::Anthropic => write!(f, "Anthropic"),
        }
    }
}

/// One canonical completion request, provider-agnostic.
///
/// Temperature and max_tokens pass through to the vendor unmodified;
/// `tools`/`tool_choice` are forwarded only when the table is non-empty
/// and the family supports function calling.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model:       String,
    pub messages:    Vec<Message>,
    pub temperature: f32,
    pub max_tokens:  Option<u32>,
    pub tools:       Vec<ToolSchema>,
    pub tool_choice: ToolChoice,
}

impl ChatRequest {
    /// A plain completion with no tool table.
    pub fn simple(model: impl Into<String>, messages: Vec<Message>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
            max_tokens:  None,
            tools:       Vec::new(),
            tool_choice: ToolChoice::Auto,
        }
    }
}

/// The single interface between the runtime and any vendor API.
///
/// # Contract
/// - Must be Send + Sync (used behind Box<dyn ChatBackend>)
/// - Returns Ok(ChatResponse) for any valid completion, with the model's
///   requested tool calls preserved in emitted order
/// - Returns Err ONLY for unrecoverable failures (network, auth,
///   unparseable response) — no retries are performed at this layer
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}

/// Provider-dispatching client: an explicit registration table mapping
/// each [`Provider`] to its backend.
///
/// Constructed once by the application from a [`RuntimeConfig`] and shared
/// (by `Arc`) across agents. Tests register a [`MockBackend`] instead.
pub struct LlmClient {
    backends: HashMap<Provider, Box<dyn ChatBackend>>,
}

impl LlmClient {
    /// An empty table. Useful with [`LlmClient::register`].
    pub fn new() -> Self {
        Self { backends: HashMap::new() }
    }

    /// Registers one backend per configured API key. Keys are read once,
    /// here — a missing key means the provider stays unregistered and any
    /// agent routed to it fails at construction.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut client = Self::new();
        if let Some(key) = &config.openai_api_key {
            client.register(Provider::OpenAi, Box::new(OpenAiBackend::new(key.clone())));
        }
        if let Some(key) = &config.anthropic_api_key {
            client.register(Provider::Anthropic, Box::new(AnthropicBackend::new(key.clone())));
        }
        client
    }

    pub fn from_env() -> Self {
        Self::from_config(&RuntimeConfig::from_env())
    }

    pub fn register(&mut self, provider: Provider, backend: Box<dyn ChatBackend>) {
        self.backends.insert(provider, backend);
    }

    pub fn supports(&self, provider: Provider) -> bool {
        self.backends.contains_key(&provider)
    }

    /// Classifies the model and checks a backend is registered for it.
    /// Both failure modes are fatal configuration errors.
    pub fn resolve(&self, model: &str) -> Result<Provider, AgentError> {
        let provider = Provider::for_model(model)?;
        if !self.supports(provider) {
            return Err(AgentError::ProviderNotConfigured(provider));
        }
        Ok(provider)
    }

    pub async fn complete(
        &self,
        provider: Provider,
        request:  &ChatRequest,
    ) -> Result<ChatResponse, AgentError> {
        let backend = self.backends.get(&provider)
            .ok_or(AgentError::ProviderNotConfigured(provider))?;
        tracing::debug!(%provider, model = %request.model, messages = request.messages.len(),
            tools = request.tools.len(), "provider call");
        backend.complete(request).await
    }
}

impl Default for LlmClient {
    fn default() -> Self { Self::new() }
}
