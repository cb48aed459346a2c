use serde_json::Value;
use std::collections::HashMap;

/// A tool function: takes deserialized JSON args, returns a string result
/// or an error string. Box<dyn Fn> — heap-allocated, Send + Sync so a
/// registry can sit behind shared references.
pub type ToolFn = Box<dyn Fn(&HashMap<String, Value>) -> Result<String, String> + Send + Sync>;

/// Tool schema for sending to the LLM (OpenAI / Anthropic tool format).
/// Immutable for the duration of a run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolSchema {
    pub name:         String,
    pub description:  String,
    pub input_schema: Value,   // JSON Schema object
}

struct ToolEntry {
    schema: ToolSchema,
    func:   ToolFn,
}

/// Maps tool name → {schema, executable}. Pure data input to the loop.
pub struct ToolRegistry {
    tools: HashMap<String, ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool with its schema and implementation.
    ///
    /// # Arguments
    /// * `name`        - Unique tool name (must match schema name)
    /// * `description` - What this tool does and when the model should use it
    /// * `schema`      - JSON Schema for the input parameters
    /// * `func`        - The actual implementation
    pub fn register(
        &mut self,
        name:        impl Into<String>,
        description: impl Into<String>,
        schema:      Value,
        func:        ToolFn,
    ) {
        let name = name.into();
        self.tools.insert(name.clone(), ToolEntry {
            schema: ToolSchema {
                name:         name.clone(),
                description:  description.into(),
                input_schema: schema,
            },
            func,
        });
    }

    /// Execute a named tool with given arguments.
    /// Returns Ok(result_string) or Err(error_string).
    /// Never panics — all errors are captured as Err variants.
    pub fn execute(&self, name: &str, args: &HashMap<String, Value>) -> Result<String, String> {
        match self.tools.get(name) {
            Some(entry) => (entry.func)(args),
            None        => Err(format!("Tool '{}' not found in registry", name)),
        }
    }

    /// Returns true if a tool with this name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns all tool schemas — used to build the tools array for LLM calls.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|e| e.schema.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self { Self::new() }
}
