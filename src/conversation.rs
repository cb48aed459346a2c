use crate::types::Message;

/// An owned copy of a conversation at a point in time.
///
/// Produced by [`Conversation::snapshot`] and consumed by
/// [`Conversation::restore`] — the explicit save/restore pair the
/// reflection engine uses to keep its isolated call out of the live log.
#[derive(Debug, Clone)]
pub struct ConversationSnapshot {
    messages: Vec<Message>,
    version:  u64,
}

impl ConversationSnapshot {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Version of the conversation at the time the snapshot was taken.
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// One agent's ordered message log.
///
/// Owned exclusively by its agent instance; every mutation goes through a
/// method here and bumps the version counter, so aliased in-place edits
/// cannot happen and a stale snapshot is detectable.
#[derive(Debug)]
pub struct Conversation {
    system_prompt: String,
    messages:      Vec<Message>,
    version:       u64,
}

impl Conversation {
    /// Seeds the log with exactly one `system` message. The system prompt
    /// is fixed at construction; only `reset()` re-materializes it.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let messages = vec![Message::system(system_prompt.clone())];
        Self { system_prompt, messages, version: 0 }
    }

    /// Discards everything and returns to the single system message.
    /// Idempotent: calling twice leaves the same one-message log.
    pub fn reset(&mut self) {
        self.messages = vec![Message::system(self.system_prompt.clone())];
        self.version += 1;
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.version += 1;
    }

    /// Adopts a full log returned by the tool loop.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.version += 1;
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            version:  self.version,
        }
    }

    pub fn restore(&mut self, snapshot: ConversationSnapshot) {
        self.messages = snapshot.messages;
        self.version += 1;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
