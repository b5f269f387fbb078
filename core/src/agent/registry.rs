use crate::agent::ExecContext;
use crate::traits::{Tool, ToolResult, ToolSpec};
use std::sync::{Arc, Mutex};

pub struct ToolRegistry {
    tools: Mutex<Vec<Arc<dyn Tool>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.lock().unwrap();
        tools.push(tool);
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        let tools = self.tools.lock().unwrap();
        tools.iter().map(|t| t.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.lock().unwrap();
        tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Executes one tool call. A lookup miss or a failing tool becomes a
    /// failed [`ToolResult`]; nothing here aborts the run.
    pub async fn execute(
        &self,
        call_id: &str,
        name: &str,
        raw_args: &str,
        ctx: &ExecContext,
    ) -> ToolResult {
        match self.get(name) {
            Some(tool) => match tool.execute_json(raw_args, ctx).await {
                Ok(result) => ToolResult::ok(call_id, name, result),
                Err(e) => ToolResult::failed(call_id, name, format!("{e:#}")),
            },
            None => ToolResult::failed(call_id, name, format!("tool '{name}' not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, ObjectSchema};
    use crate::traits::TypedTool;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    struct EchoTool;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    #[derive(Serialize)]
    struct EchoOutput {
        text: String,
    }

    #[async_trait]
    impl TypedTool for EchoTool {
        type Input = EchoArgs;
        type Output = EchoOutput;

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes back the input"
        }

        fn input_schema(&self) -> ObjectSchema {
            ObjectSchema::new().field("text", FieldType::String, "Text to echo")
        }

        async fn invoke(&self, input: EchoArgs, _ctx: &ExecContext) -> anyhow::Result<EchoOutput> {
            Ok(EchoOutput { text: input.text })
        }
    }

    #[tokio::test]
    async fn execute_returns_result_keyed_by_call_id() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let result = registry
            .execute("call_9", "echo", r#"{"text":"hi"}"#, &ExecContext::default())
            .await;
        assert!(result.success);
        assert_eq!(result.tool_call_id, "call_9");
        assert_eq!(result.tool_name, "echo");
        assert_eq!(result.result, r#"{"text":"hi"}"#);
    }

    #[tokio::test]
    async fn lookup_miss_is_a_failed_result() {
        let registry = ToolRegistry::new();
        let result = registry
            .execute("x1", "nonexistent", "{}", &ExecContext::default())
            .await;
        assert!(!result.success);
        assert_eq!(result.tool_call_id, "x1");
        assert!(result.result.contains("not found"));
    }

    #[tokio::test]
    async fn malformed_arguments_are_a_failed_result() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        let result = registry
            .execute("x2", "echo", "{broken", &ExecContext::default())
            .await;
        assert!(!result.success);
        assert!(result.result.contains("invalid arguments"));
    }

    #[test]
    fn specs_list_registered_tools() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        let specs = registry.specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "echo");
    }
}
