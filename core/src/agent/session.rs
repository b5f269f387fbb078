use crate::agent::{AgentConfig, AgentLoop, ExecContext, ToolRegistry};
use crate::state::{PersistentKey, StateStore};
use crate::traits::{Message, Provider};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A scoped agent session: owns the state store for its lifetime and flushes
/// the persistent subset on `close`. The caller guarantees `close` on every
/// exit path; there is no shutdown hook.
pub struct AgentSession {
    agent: AgentLoop,
    store: Arc<Mutex<StateStore>>,
    state_file: PathBuf,
}

impl AgentSession {
    /// Opens a session, loading previously persisted state. A load failure
    /// is a warning, not an error: the session starts with defaults.
    pub fn open(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
        store: Arc<Mutex<StateStore>>,
        persistent_keys: &[&dyn PersistentKey],
    ) -> Self {
        let state_file = config.state_file_path.clone();
        {
            let mut store = store.lock().unwrap();
            if let Err(e) = store.load_from_file(&state_file, persistent_keys) {
                tracing::warn!("state load failed, starting with defaults: {e:#}");
            }
        }
        Self {
            agent: AgentLoop::new(provider, tools, config),
            store,
            state_file,
        }
    }

    pub fn with_context(mut self, ctx: ExecContext) -> Self {
        self.agent = self.agent.with_context(ctx);
        self
    }

    pub async fn run(&mut self, input: &str) -> Result<String> {
        self.agent.run(input).await
    }

    pub fn history(&self) -> &[Message] {
        self.agent.history()
    }

    /// Flushes persistent state. I/O failures are reported, not swallowed.
    pub fn close(self) -> Result<()> {
        let store = self.store.lock().unwrap();
        store.save_to_file(&self.state_file)
    }
}
