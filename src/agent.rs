use crate::conversation::Conversation;
use crate::engine::{run_tool_loop, ToolLoopOutcome};
use crate::error::AgentError;
use crate::llm::{ChatRequest, LlmClient, Provider};
use crate::reflection::{critique_prompt, parse_reflection, ReflectionResult, DEFAULT_CRITERIA};
use crate::tools::{ToolFn, ToolRegistry};
use crate::types::{LoopStatus, Message, ToolCallRecord};
use std::sync::Arc;

/// Result of [`Agent::run_with_reflection`].
#[derive(Debug)]
pub struct ReflectionOutcome {
    /// The final output — the last adopted revision, or the original run's
    /// answer when nothing was adopted.
    pub output:     String,
    /// The most recent reflection performed, if any.
    pub reflection: Option<ReflectionResult>,
    /// How many revised outputs were adopted.
    pub iterations: usize,
}

/// One configured agent: a system prompt, a model, a tool table, and the
/// conversation it owns.
///
/// Not for concurrent use — one instance mutates its own conversation
/// in place and must be serialized by the caller. Distinct instances
/// share nothing but the `LlmClient`.
pub struct Agent {
    pub(crate) name:           String,
    pub(crate) model:          String,
    pub(crate) provider:       Provider,
    pub(crate) temperature:    f32,
    pub(crate) max_tool_turns: usize,
    pub(crate) max_tokens:     Option<u32>,
    pub(crate) client:         Arc<LlmClient>,
    pub(crate) tools:          ToolRegistry,
    pub(crate) conversation:   Conversation,
    pub(crate) tool_call_log:  Vec<ToolCallRecord>,
}

impl Agent {
    /// Runs one user input through the tool-calling loop and adopts the
    /// resulting log as the live conversation.
    ///
    /// Returns the final answer, or the `MAX_TURNS_SENTINEL` string when
    /// the turn budget ran out (soft failure — the log and audit trail
    /// still carry everything that happened).
    pub async fn run(&mut self, input: &str) -> Result<String, AgentError> {
        self.conversation.push(Message::user(input));

        let ToolLoopOutcome { text, messages, audit, status } = run_tool_loop(
            &self.client,
            self.provider,
            &self.model,
            self.conversation.to_vec(),
            &self.tools,
            self.max_tool_turns,
            self.temperature,
            self.max_tokens,
        ).await?;

        if status == LoopStatus::Exhausted {
            tracing::warn!(agent = %self.name, "run exhausted its tool-turn budget");
        }

        self.conversation.replace(messages);
        self.tool_call_log.extend(audit);
        Ok(text)
    }

    /// One completion with no tool table; the exchange is appended to the
    /// live conversation.
    pub async fn run_simple(&mut self, input: &str) -> Result<String, AgentError> {
        self.conversation.push(Message::user(input));

        let request = ChatRequest {
            max_tokens: self.max_tokens,
            ..ChatRequest::simple(self.model.clone(), self.conversation.to_vec(), self.temperature)
        };

        let response = self.client.complete(self.provider, &request).await?;
        let content  = response.content.ok_or(AgentError::EmptyResponse)?;

        self.conversation.push(Message::assistant(content.clone()));
        Ok(content)
    }

    /// Critiques `output` against the default criteria.
    pub async fn reflect(&mut self, output: &str) -> Result<ReflectionResult, AgentError> {
        self.reflect_with(output, &DEFAULT_CRITERIA[..]).await
    }

    /// Critiques `output` in an isolated single-turn conversation.
    ///
    /// The live history is snapshotted, the log reset to just the system
    /// prompt for the critique call, and the snapshot restored afterwards
    /// (on the error path too) — reflection never consumes turns from or
    /// leaks into the caller's conversation.
    pub async fn reflect_with<S>(
        &mut self,
        output:   &str,
        criteria: &[S],
    ) -> Result<ReflectionResult, AgentError>
    where
        S: AsRef<str> + Sync,
    {
        let prompt = critique_prompt(output, criteria);

        let saved = self.conversation.snapshot();
        self.conversation.reset();
        let raw = self.run_simple(&prompt).await;
        self.conversation.restore(saved);

        let raw = raw?;
        let result = parse_reflection(&raw);
        tracing::debug!(agent = %self.name, score = result.score, "reflection parsed");
        Ok(result)
    }

    /// Runs the input once, then optionally drives a bounded
    /// reflect-and-revise loop over the result.
    ///
    /// With `auto_improve`, up to `max_iterations` reflections run; each
    /// revised output is adopted unless the score reached 9.0 or no
    /// revision was offered. Without it, a single reflection is performed
    /// for reporting and the original output is returned unchanged.
    pub async fn run_with_reflection(
        &mut self,
        input:          &str,
        auto_improve:   bool,
        max_iterations: usize,
    ) -> Result<ReflectionOutcome, AgentError> {
        let mut output     = self.run(input).await?;
        let mut iterations = 0;
        let mut reflection = None;

        if auto_improve {
            for i in 0..max_iterations {
                let result = self.reflect(&output).await?;

                match &result.revised_output {
                    Some(revised) if result.score < 9.0 => {
                        output = revised.clone();
                        iterations = i + 1;
                        reflection = Some(result);
                    }
                    // Good enough, or nothing to adopt — keep the critique
                    // for reporting and stop revising.
                    _ => {
                        reflection = Some(result);
                        break;
                    }
                }
            }
        } else {
            reflection = Some(self.reflect(&output).await?);
        }

        Ok(ReflectionOutcome { output, reflection, iterations })
    }

    /// Registers a tool after construction.
    pub fn add_tool(
        &mut self,
        name:        impl Into<String>,
        description: impl Into<String>,
        schema:      serde_json::Value,
        func:        ToolFn,
    ) {
        self.tools.register(name, description, schema, func);
    }

    /// Discards the conversation back to the single system message.
    pub fn reset(&mut self) {
        self.conversation.reset();
    }

    /// Switches models, re-resolving the provider. Fails fast on an
    /// unknown family or an unconfigured backend.
    pub fn set_model(&mut self, model: impl Into<String>) -> Result<(), AgentError> {
        let model = model.into();
        self.provider = self.client.resolve(&model)?;
        self.model = model;
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature;
    }

    // ── Inspection ──────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The full ordered message log.
    pub fn history(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Append-only audit trail of every tool call requested across runs.
    pub fn tool_call_log(&self) -> &[ToolCallRecord] {
        &self.tool_call_log
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("tools", &self.tools.len())
            .field("messages", &self.conversation.len())
            .finish()
    }
}
