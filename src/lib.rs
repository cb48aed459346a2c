pub mod types;
pub mod error;
pub mod config;
pub mod tools;
pub mod conversation;
pub mod llm;
pub mod engine;
pub mod reflection;
pub mod agent;
pub mod builder;

// Convenience re-exports at crate root
pub use agent::{Agent, ReflectionOutcome};
pub use builder::AgentBuilder;
pub use config::RuntimeConfig;
pub use conversation::{Conversation, ConversationSnapshot};
pub use engine::{run_tool_loop, ToolLoopOutcome, MAX_TURNS_SENTINEL};
pub use error::AgentError;
pub use llm::{ChatBackend, ChatRequest, LlmClient, Provider};
pub use reflection::{parse_reflection, ReflectionResult, DEFAULT_CRITERIA};
pub use tools::{ToolFn, ToolRegistry, ToolSchema};
pub use types::{ChatResponse, LoopStatus, Message, Role, ToolCallRecord, ToolCallRequest, ToolChoice};

/// Installs a global tracing subscriber honoring RUST_LOG.
/// Call once from the application entry point; tests skip it.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
