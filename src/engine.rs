//! The multi-turn tool-calling loop.
//!
//! Alternates between two phases — awaiting the model and executing the
//! tools it requested — until the model answers without tool calls or the
//! turn budget runs out. Tool execution is strictly sequential in the
//! model's emitted order: providers correlate each `tool` message to its
//! `tool_call_id`, so order must be exact.

use crate::error::AgentError;
use crate::llm::{ChatRequest, LlmClient, Provider};
use crate::tools::ToolRegistry;
use crate::types::{ChatResponse, LoopStatus, Message, ToolCallRecord, ToolCallRequest, ToolChoice};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Returned in place of an answer when the turn budget is exhausted.
/// A soft failure — callers check [`LoopStatus`] or this exact string.
pub const MAX_TURNS_SENTINEL: &str = "[Max turns reached]";

/// Everything a finished loop hands back: the final text (or sentinel),
/// the full message log including every tool exchange, and the audit
/// trail of requested calls.
#[derive(Debug)]
pub struct ToolLoopOutcome {
    pub text:     String,
    pub messages: Vec<Message>,
    pub audit:    Vec<ToolCallRecord>,
    pub status:   LoopStatus,
}

impl ToolLoopOutcome {
    pub fn answered(&self) -> bool {
        self.status == LoopStatus::Answered
    }
}

/// Drives the loop to completion. `messages` is the initial log (system
/// prompt, prior turns, and the new user message already appended).
///
/// A provider/transport failure aborts with `Err`; tool-level faults
/// (unknown name, bad arguments, failing executable) never do — they are
/// encoded as JSON error payloads in the `tool` message so the model can
/// adapt on its next turn.
pub async fn run_tool_loop(
    client:      &LlmClient,
    provider:    Provider,
    model:       &str,
    mut messages: Vec<Message>,
    tools:       &ToolRegistry,
    max_turns:   usize,
    temperature: f32,
    max_tokens:  Option<u32>,
) -> Result<ToolLoopOutcome, AgentError> {
    let mut audit: Vec<ToolCallRecord> = Vec::new();
    let schemas = tools.schemas();

    for turn in 0..max_turns {
        tracing::info!(turn = turn + 1, max_turns, model, "tool loop turn");

        let request = ChatRequest {
            model:       model.to_string(),
            messages:    messages.clone(),
            temperature,
            max_tokens,
            tools:       schemas.clone(),
            tool_choice: ToolChoice::Auto,
        };

        let response: ChatResponse = client.complete(provider, &request).await?;

        // No tool calls requested — the model has answered.
        if response.tool_calls.is_empty() {
            let text = response.content.unwrap_or_default();
            messages.push(Message::assistant(text.clone()));
            tracing::debug!(turns_used = turn + 1, "tool loop answered");
            return Ok(ToolLoopOutcome {
                text,
                messages,
                audit,
                status: LoopStatus::Answered,
            });
        }

        // One assistant message carries the whole batch, ids and
        // arguments preserved; each call then gets its own tool message
        // immediately after execution, before the next call runs.
        messages.push(Message::tool_request(
            response.content.clone(),
            response.tool_calls.clone(),
        ));

        for call in &response.tool_calls {
            audit.push(ToolCallRecord::new(&call.name, &call.arguments));
            let output = dispatch(tools, call);
            messages.push(Message::tool(&call.id, &call.name, output));
        }
    }

    tracing::warn!(max_turns, "tool loop exhausted turn budget");
    Ok(ToolLoopOutcome {
        text:     MAX_TURNS_SENTINEL.to_string(),
        messages,
        audit,
        status:   LoopStatus::Exhausted,
    })
}

/// Executes one requested call, reducing every fault to a string payload.
/// The registered tool's return value is used verbatim; faults become
/// JSON `{"error": ...}` objects.
fn dispatch(tools: &ToolRegistry, call: &ToolCallRequest) -> String {
    if !tools.has(&call.name) {
        tracing::warn!(tool = %call.name, "model requested unknown tool");
        return json!({ "error": format!("Unknown tool: {}", call.name) }).to_string();
    }

    let args: HashMap<String, Value> = match serde_json::from_str(&call.arguments) {
        Ok(args) => args,
        Err(e) => {
            tracing::warn!(tool = %call.name, error = %e, "unparseable tool arguments");
            return json!({
                "error": format!("Invalid arguments for tool '{}': {}", call.name, e)
            }).to_string();
        }
    };

    tracing::debug!(tool = %call.name, "executing tool");
    match tools.execute(&call.name, &args) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(tool = %call.name, error = %e, "tool execution failed");
            json!({ "error": format!("Tool '{}' failed: {}", call.name, e) }).to_string()
        }
    }
}
