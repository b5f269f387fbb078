use crate::agent::{ExecContext, ToolRegistry};
use crate::traits::{ChatRequest, Message, Provider};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Immutable per-agent settings.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub system_prompt: String,
    /// Upper bound on Reason-Act-Observe iterations per `run`. Must be > 0.
    pub max_iterations: usize,
    pub state_file_path: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant. Use the available tools when they help \
                            you answer."
                .to_string(),
            max_iterations: 10,
            state_file_path: PathBuf::from("state.json"),
        }
    }
}

/// The bounded Reason-Act-Observe loop. Owns the growing history for the
/// duration of each `run`; between runs it is visible as an immutable slice.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    ctx: ExecContext,
    history: Vec<Message>,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            config,
            ctx: ExecContext::default(),
            history: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: ExecContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Runs the loop on one user message until the model answers without
    /// requesting tools, or the iteration budget runs out.
    ///
    /// A failing chat call propagates verbatim; a failing tool call is fed
    /// back into the conversation and the loop continues.
    pub async fn run(&mut self, input: &str) -> Result<String> {
        self.history.push(Message::user(input));

        for _ in 0..self.config.max_iterations {
            let specs = self.tools.specs();

            let mut messages = Vec::with_capacity(self.history.len() + 1);
            messages.push(Message::system(&self.config.system_prompt));
            messages.extend_from_slice(&self.history);

            let request = ChatRequest {
                messages: &messages,
                tools: if specs.is_empty() { None } else { Some(&specs) },
            };
            let response = self.provider.chat(request).await?;

            if !response.has_tool_calls() {
                let text = response.content.unwrap_or_default();
                self.history.push(Message::assistant(text.clone()));
                return Ok(text);
            }

            self.history.push(Message::assistant_with_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            // One result per call, in the order the model emitted them.
            for call in &response.tool_calls {
                let result = self
                    .tools
                    .execute(&call.id, &call.name, &call.arguments, &self.ctx)
                    .await;
                let content = if result.success {
                    result.result
                } else {
                    format!("ERROR: {}", result.result)
                };
                self.history
                    .push(Message::tool_result(&call.id, &call.name, content));
            }
        }

        anyhow::bail!("max iterations reached ({})", self.config.max_iterations)
    }
}
