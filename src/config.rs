//! Runtime configuration.
//!
//! An explicit value owned by the application entry point and injected
//! into `LlmClient::from_config` — there is no global config instance.

/// Model used when an agent does not choose one explicitly.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Turn budget for the tool-calling loop when not overridden.
pub const DEFAULT_MAX_TOOL_TURNS: usize = 5;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Enables the OpenAI backend when present.
    pub openai_api_key:    Option<String>,
    /// Enables the Anthropic backend when present.
    pub anthropic_api_key: Option<String>,

    pub default_model:  String,
    pub temperature:    f32,
    pub max_tool_turns: usize,
    /// Passed through to providers unmodified; the Anthropic backend
    /// substitutes 4096 when unset.
    pub max_tokens:     Option<u32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            openai_api_key:    None,
            anthropic_api_key: None,
            default_model:     DEFAULT_MODEL.to_string(),
            temperature:       0.0,
            max_tool_turns:    DEFAULT_MAX_TOOL_TURNS,
            max_tokens:        None,
        }
    }
}

impl RuntimeConfig {
    /// Reads API keys from the environment once. Missing keys simply leave
    /// the corresponding backend unregistered; the error surfaces at agent
    /// construction if a model routed to that provider is requested.
    pub fn from_env() -> Self {
        Self {
            openai_api_key:    std::env::var("OPENAI_API_KEY").ok(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            ..Self::default()
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tool_turns(mut self, turns: usize) -> Self {
        self.max_tool_turns = turns;
        self
    }
}
