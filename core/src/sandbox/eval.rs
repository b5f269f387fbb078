//! The eval tool: runs model-authored python in a subprocess that can call
//! back into the tool set over the bridge. Launch errors, non-zero exits,
//! and timeouts are all folded into the `{output, exit_code}` value so the
//! loop can treat eval like any other tool.

use crate::agent::{ExecContext, ToolRegistry};
use crate::sandbox::bridge::BridgeServer;
use crate::sandbox::library::{BRIDGE_PORT_ENV, generate_library};
use crate::schema::{FieldType, ObjectSchema};
use crate::traits::{Empty, ToolSpec, TypedTool};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

pub const EXECUTE_CODE_TOOL: &str = "execute_code";
pub const TOOL_LIBRARY_TOOL: &str = "show_tool_library";

/// Reported when the subprocess is killed on timeout. No process exit
/// status is negative, so this never collides with a real exit code.
pub const TIMEOUT_EXIT_CODE: i32 = -1;
/// Reported when the interpreter could not be launched at all.
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 127;

const NO_OUTPUT_PLACEHOLDER: &str = "(no output)";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const LIBRARY_FILE: &str = "agent_tools.py";

#[derive(Debug, Deserialize)]
pub struct ExecuteCodeArgs {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ExecuteCodeOutput {
    pub output: String,
    pub exit_code: i32,
}

pub struct ExecuteCodeTool {
    tools: Arc<ToolRegistry>,
    interpreter: String,
    timeout: Duration,
}

impl ExecuteCodeTool {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            tools,
            interpreter: "python3".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run_sandboxed(&self, code: &str, ctx: &ExecContext) -> ExecuteCodeOutput {
        let specs = exposed_specs(&self.tools);
        let exposed: Vec<String> = specs.iter().map(|s| s.name.clone()).collect();

        let bridge = match BridgeServer::start(self.tools.clone(), exposed, *ctx).await {
            Ok(bridge) => bridge,
            Err(e) => {
                return ExecuteCodeOutput {
                    output: format!("failed to start tool bridge: {e:#}"),
                    exit_code: LAUNCH_FAILURE_EXIT_CODE,
                };
            }
        };

        let result = self.run_subprocess(code, &specs, bridge.port()).await;
        bridge.stop();

        match result {
            Ok(output) => output,
            Err(e) => ExecuteCodeOutput {
                output: format!("failed to launch '{}': {e:#}", self.interpreter),
                exit_code: LAUNCH_FAILURE_EXIT_CODE,
            },
        }
    }

    async fn run_subprocess(
        &self,
        code: &str,
        specs: &[ToolSpec],
        port: u16,
    ) -> Result<ExecuteCodeOutput> {
        // TempDir removes the scratch files on every exit path.
        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join(LIBRARY_FILE), generate_library(specs)).await?;
        let script_path = dir.path().join("script.py");
        let script = format!("from agent_tools import *\n\n{code}");
        tokio::fs::write(&script_path, script).await?;

        let mut child = Command::new(&self.interpreter)
            .arg(&script_path)
            .current_dir(dir.path())
            .env(BRIDGE_PORT_ENV, port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout_task = tokio::spawn(read_pipe(child.stdout.take()));
        let stderr_task = tokio::spawn(read_pipe(child.stderr.take()));

        let (timed_out, exit_code) = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => (false, status.code().unwrap_or(1)),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                let _ = child.kill().await;
                (true, TIMEOUT_EXIT_CODE)
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        let chosen = if stdout.trim().is_empty() { stderr } else { stdout };
        let mut output = chosen.trim_end().to_string();
        if timed_out {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&format!(
                "process timed out after {}s and was killed",
                self.timeout.as_secs()
            ));
        }
        if output.is_empty() {
            output = NO_OUTPUT_PLACEHOLDER.to_string();
        }

        Ok(ExecuteCodeOutput { output, exit_code })
    }
}

#[async_trait]
impl TypedTool for ExecuteCodeTool {
    type Input = ExecuteCodeArgs;
    type Output = ExecuteCodeOutput;

    fn name(&self) -> &str {
        EXECUTE_CODE_TOOL
    }

    fn description(&self) -> &str {
        "Run python code in a sandbox. Wrapper functions for the other tools are \
         preloaded; call show_tool_library first to see their signatures. Use print() \
         to produce output."
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new().field("code", FieldType::String, "Python source to execute")
    }

    async fn invoke(
        &self,
        input: ExecuteCodeArgs,
        ctx: &ExecContext,
    ) -> Result<ExecuteCodeOutput> {
        Ok(self.run_sandboxed(&input.code, ctx).await)
    }
}

/// Introspection helper: returns the generated wrapper library so the model
/// can read the available functions before writing code.
pub struct ToolLibraryTool {
    tools: Arc<ToolRegistry>,
}

impl ToolLibraryTool {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }
}

#[derive(Debug, Serialize)]
pub struct ToolLibraryOutput {
    pub library: String,
}

#[async_trait]
impl TypedTool for ToolLibraryTool {
    type Input = Empty;
    type Output = ToolLibraryOutput;

    fn name(&self) -> &str {
        TOOL_LIBRARY_TOOL
    }

    fn description(&self) -> &str {
        "Show the python functions available to code run through execute_code."
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new()
    }

    async fn invoke(&self, _input: Empty, _ctx: &ExecContext) -> Result<ToolLibraryOutput> {
        Ok(ToolLibraryOutput {
            library: generate_library(&exposed_specs(&self.tools)),
        })
    }
}

/// The sandbox never sees the eval tool or its introspection helper, which
/// rules out recursive self-invocation.
fn exposed_specs(tools: &ToolRegistry) -> Vec<ToolSpec> {
    tools
        .specs()
        .into_iter()
        .filter(|spec| spec.name != EXECUTE_CODE_TOOL && spec.name != TOOL_LIBRARY_TOOL)
        .collect()
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut buf).await;
    }
    buf
}
