use crate::agent::ExecContext;
use crate::schema::ObjectSchema;
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Name, description, and invocation schema, as sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Outcome of one tool call. Produced exactly once per requested call,
/// whether or not the call succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub result: String,
    pub success: bool,
}

impl ToolResult {
    pub fn ok(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            result: result.into(),
            success: true,
        }
    }

    pub fn failed(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            result: message.into(),
            success: false,
        }
    }
}

/// Type-erased tool contract used by the orchestrator and the bridge wire
/// protocol. Implementors usually go through [`TypedTool`] instead.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn schema(&self) -> serde_json::Value;

    /// Parses raw JSON arguments, runs the tool, and returns the serialized
    /// result. A parse or invocation failure surfaces as `Err`, never as a
    /// partial result.
    async fn execute_json(&self, raw_args: &str, ctx: &ExecContext) -> anyhow::Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema(),
        }
    }
}

/// Typed tool contract. The blanket [`Tool`] impl handles JSON decode and
/// encode so implementors only deal in their own input and output types.
///
/// An output representing "no return value" should be [`Empty`], which
/// serializes to `{}` so downstream consumers always see an object.
#[async_trait]
pub trait TypedTool: Send + Sync {
    type Input: DeserializeOwned + Send;
    type Output: Serialize + Send;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> ObjectSchema;

    async fn invoke(&self, input: Self::Input, ctx: &ExecContext)
    -> anyhow::Result<Self::Output>;
}

#[async_trait]
impl<T: TypedTool> Tool for T {
    fn name(&self) -> &str {
        TypedTool::name(self)
    }

    fn description(&self) -> &str {
        TypedTool::description(self)
    }

    fn schema(&self) -> serde_json::Value {
        self.input_schema().to_value()
    }

    async fn execute_json(&self, raw_args: &str, ctx: &ExecContext) -> anyhow::Result<String> {
        let name = TypedTool::name(self);

        // Empty or whitespace-only arguments mean "no arguments".
        let raw = raw_args.trim();
        let raw = if raw.is_empty() { "{}" } else { raw };

        let input: T::Input = serde_json::from_str(raw)
            .with_context(|| format!("invalid arguments for tool '{name}'"))?;

        if ctx.verbose {
            tracing::info!(tool = name, args = raw, "invoking tool");
        }

        match self.invoke(input, ctx).await {
            Ok(output) => {
                let serialized = serde_json::to_string(&output)
                    .with_context(|| format!("failed to serialize result of tool '{name}'"))?;
                if ctx.verbose {
                    tracing::info!(tool = name, result = %serialized, "tool returned");
                }
                Ok(serialized)
            }
            Err(e) => {
                if ctx.verbose {
                    tracing::info!(tool = name, error = %e, "tool failed");
                }
                Err(e)
            }
        }
    }
}

/// Zero-field payload: serializes to `{}`. Doubles as "no arguments" input
/// and "no return value" output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Empty {}
