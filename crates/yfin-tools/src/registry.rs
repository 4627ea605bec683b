//! Tool registry for managing available tools

use crate::{Error, Result, Tool};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Registry for managing tools
///
/// Tools are kept in registration order so listings are stable across calls.
/// Registering a name twice replaces the earlier tool in place.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<Vec<Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Registering tool: {}", tool.name());
        if let Some(slot) = tools.iter_mut().find(|t| t.name() == tool.name()) {
            *slot = tool;
        } else {
            tools.push(tool);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.iter().find(|t| t.name() == name).cloned()
    }

    /// List all registered tools in registration order
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.clone()
    }

    /// Names of all registered tools in registration order
    pub fn names(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Look up a tool by name and execute it
    pub async fn execute(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        tool.execute(params).await
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool {
        name: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        async fn execute(&self, _params: Value) -> Result<Value> {
            Ok(json!(self.reply))
        }

        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echoes a fixed reply"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    fn echo(name: &'static str, reply: &'static str) -> Arc<dyn Tool> {
        Arc::new(EchoTool { name, reply })
    }

    #[test]
    fn test_registration_order_is_stable() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(echo("zeta", "z"));
        registry.register(echo("alpha", "a"));
        registry.register(echo("mid", "m"));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.names(), registry.names());
    }

    #[test]
    fn test_reregister_replaces_in_place() {
        let registry = ToolRegistry::new();
        registry.register(echo("first", "1"));
        registry.register(echo("second", "2"));
        registry.register(echo("first", "one"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_execute_by_name() {
        let registry = ToolRegistry::new();
        registry.register(echo("first", "1"));
        registry.register(echo("first", "one"));

        let value = registry.execute("first", json!({})).await.unwrap();
        assert_eq!(value, json!("one"));
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.execute("missing", json!({})).await.unwrap_err();

        assert!(matches!(err, Error::UnknownTool(ref name) if name == "missing"));
        assert_eq!(err.to_string(), "Unknown tool: missing");
    }

    #[test]
    fn test_get() {
        let registry = ToolRegistry::new();
        registry.register(echo("first", "1"));

        assert!(registry.get("first").is_some());
        assert!(registry.get("other").is_none());
    }
}
