//! Tool trait and registry.
//!
//! Tools are the agent's hands: named, schema-described operations the model
//! can request. Dispatch through the registry is total: whatever goes wrong
//! (unknown tool, missing arguments, execution failure), the model gets a
//! plain error string back and the conversation keeps going.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// A capability the model can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name, as offered to the model.
    fn name(&self) -> &str;

    /// Human/model-readable description.
    fn description(&self) -> &str;

    /// JSON Schema object describing the parameters
    /// (`{"type":"object","properties":{...},"required":[...]}`).
    fn parameters_schema(&self) -> Value;

    /// Run the tool. The output string is fed back to the model verbatim.
    async fn execute(&self, arguments: Value) -> Result<String, ToolError>;

    /// The definition advertised to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Serializable tool description sent to the model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Holds the registered tools and dispatches calls to them.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Re-registering a name overwrites the previous tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Remove a tool by name. Removing an unknown name is a no-op.
    pub fn unregister(&mut self, name: &str) {
        self.tools.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Definitions for the model's tool menu, in stable name order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call. Total: every failure mode comes back as an error
    /// string the model can read, never a panic or a typed error.
    pub async fn execute(&self, name: &str, params: &Value) -> String {
        let Some(tool) = self.tools.get(name) else {
            return format!("Error: tool '{name}' not found");
        };

        let missing = missing_required(&tool.parameters_schema(), params);
        if !missing.is_empty() {
            let details: Vec<String> = missing
                .iter()
                .map(|field| format!("Missing required parameter: {field}"))
                .collect();
            return format!("Error: {}", details.join("; "));
        }

        tracing::debug!(tool = %name, "executing tool");
        match tool.execute(params.clone()).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool execution failed");
                format!("Error executing {name}: {e}")
            }
        }
    }
}

/// Fields listed in the schema's `required` array but absent from `params`.
fn missing_required(schema: &Value, params: &Value) -> Vec<String> {
    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return Vec::new();
    };
    required
        .iter()
        .filter_map(Value::as_str)
        .filter(|field| params.get(field).is_none())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input text back"
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }

        async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
            Ok(arguments["text"].as_str().unwrap_or_default().to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        async fn execute(&self, _arguments: Value) -> Result<String, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "disk on fire".into(),
            })
        }
    }

    fn registry() -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        reg.register(Arc::new(FailingTool));
        reg
    }

    #[tokio::test]
    async fn executes_registered_tool() {
        let reg = registry();
        let out = reg.execute("echo", &json!({"text": "hi"})).await;
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_string() {
        let reg = registry();
        let out = reg.execute("nope", &json!({})).await;
        assert_eq!(out, "Error: tool 'nope' not found");
    }

    #[tokio::test]
    async fn missing_required_parameter_is_reported_without_invoking() {
        let reg = registry();
        let out = reg.execute("echo", &json!({})).await;
        assert_eq!(out, "Error: Missing required parameter: text");
    }

    #[tokio::test]
    async fn tool_failure_becomes_error_text() {
        let reg = registry();
        let out = reg.execute("broken", &json!({})).await;
        assert!(out.starts_with("Error executing broken:"));
        assert!(out.contains("disk on fire"));
    }

    #[test]
    fn register_overwrites_and_unregister_is_idempotent() {
        let mut reg = registry();
        assert_eq!(reg.len(), 2);
        reg.register(Arc::new(EchoTool));
        assert_eq!(reg.len(), 2);
        reg.unregister("echo");
        reg.unregister("echo");
        assert_eq!(reg.names(), vec!["broken"]);
    }

    #[test]
    fn definitions_are_sorted_by_name() {
        let reg = registry();
        let defs = reg.definitions();
        assert_eq!(defs[0].name, "broken");
        assert_eq!(defs[1].name, "echo");
        assert!(defs[1].parameters["required"][0] == json!("text"));
    }
}
