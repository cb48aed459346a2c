use crate::agent::Agent;
use crate::config::{DEFAULT_MAX_TOOL_TURNS, DEFAULT_MODEL};
use crate::conversation::Conversation;
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::tools::{ToolFn, ToolRegistry};
use std::sync::Arc;

/// Ergonomic construction for [`Agent`].
///
/// Provider resolution happens in [`AgentBuilder::build`]: an unknown
/// model family or an unconfigured backend is rejected there, before any
/// call is made.
pub struct AgentBuilder {
    name:           String,
    system_prompt:  String,
    model:          Option<String>,
    temperature:    f32,
    max_tool_turns: usize,
    max_tokens:     Option<u32>,
    client:         Option<Arc<LlmClient>>,
    tools:          ToolRegistry,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:           name.into(),
            system_prompt:  String::new(),
            model:          None,
            temperature:    0.0,
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
            max_tokens:     None,
            client:         None,
            tools:          ToolRegistry::new(),
        }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into(); self
    }

    /// # Example
    /// ```no_run
    /// # use agentloop::AgentBuilder;
    /// AgentBuilder::new("researcher").model("gpt-4o");
    /// AgentBuilder::new("researcher").model("claude-3-opus");  // Anthropic
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into()); self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature; self
    }

    pub fn max_tool_turns(mut self, turns: usize) -> Self {
        self.max_tool_turns = turns; self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens); self
    }

    pub fn client(mut self, client: Arc<LlmClient>) -> Self {
        self.client = Some(client); self
    }

    pub fn tool(
        mut self,
        name:        impl Into<String>,
        description: impl Into<String>,
        schema:      serde_json::Value,
        func:        ToolFn,
    ) -> Self {
        self.tools.register(name, description, schema, func);
        self
    }

    pub fn build(self) -> Result<Agent, AgentError> {
        let client = self.client
            .ok_or_else(|| AgentError::Build("LLM client is required".to_string()))?;

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let provider = client.resolve(&model)?;

        Ok(Agent {
            name:           self.name,
            model,
            provider,
            temperature:    self.temperature,
            max_tool_turns: self.max_tool_turns,
            max_tokens:     self.max_tokens,
            client,
            tools:          self.tools,
            conversation:   Conversation::new(self.system_prompt),
            tool_call_log:  Vec::new(),
        })
    }
}
