use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Role::System    => write!(f, "system"),
            Role::User      => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool      => write!(f, "tool"),
        }
    }
}

/// A tool invocation requested by the LLM.
///
/// `id` is the opaque provider-issued correlation id; `arguments` stays in
/// the serialized form the provider emitted it in. Both are preserved
/// verbatim so each `tool` result message can be matched back to its
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id:        String,
    pub name:      String,
    pub arguments: String,
}

/// One entry in an agent's canonical message log.
///
/// The same shape serves all four roles:
/// - `system` / `user`: just `content`
/// - `assistant`: `content` and/or the `tool_calls` it requested
/// - `tool`: `content` plus `tool_call_id` + `tool_name` referencing a
///   prior assistant message's request in the same conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// An assistant message recording the tool calls the model requested.
    /// `content` is usually None but some providers attach commentary.
    pub fn tool_request(content: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
            tool_name:    None,
        }
    }

    /// A `tool` result message answering one requested call.
    pub fn tool(
        tool_call_id: impl Into<String>,
        tool_name:    impl Into<String>,
        content:      impl Into<String>,
    ) -> Self {
        Self {
            role:         Role::Tool,
            content:      Some(content.into()),
            tool_calls:   Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
            tool_name:    Some(tool_name.into()),
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content:      Some(content.into()),
            tool_calls:   Vec::new(),
            tool_call_id: None,
            tool_name:    None,
        }
    }
}

/// One completed dispatch in the append-only audit trail.
///
/// Recorded for every call the model requested, whether it hit a
/// registered tool, an unknown name, or a failing executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub name:      String,
    pub arguments: String,
    pub at:        DateTime<Utc>,
}

impl ToolCallRecord {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name:      name.into(),
            arguments: arguments.into(),
            at:        Utc::now(),
        }
    }
}

/// The normalized response every provider backend reduces to.
///
/// `tool_calls` preserves the model's emitted order — the loop executes
/// them in exactly this order.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub content:    Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), tool_calls: Vec::new() }
    }

    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self { content: None, tool_calls: calls }
    }
}

/// How the model may use the supplied tool table.
/// Only forwarded when the table is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoice {
    #[default]
    Auto,
    None,
    Required,
}

/// How a tool loop terminated.
///
/// `Exhausted` is a soft failure: the loop still returns the accumulated
/// log and audit, with the sentinel text in place of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Answered,
    Exhausted,
}
