pub mod context;
pub mod loop_;
pub mod registry;
pub mod session;

pub use context::ExecContext;
pub use loop_::{AgentConfig, AgentLoop};
pub use registry::ToolRegistry;
pub use session::AgentSession;
