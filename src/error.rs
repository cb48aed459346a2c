use crate::llm::Provider;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("No known provider matches model '{0}'")]
    UnknownProvider(String),

    #[error("Provider {0} is not configured (missing API key or backend)")]
    ProviderNotConfigured(Provider),

    #[error("Provider request failed: {0}")]
    Provider(String),

    #[error("Provider returned a response with no content")]
    EmptyResponse,

    #[error("Build error: {0}")]
    Build(String),
}
