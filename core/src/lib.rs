pub mod agent;
pub mod config;
pub mod providers;
pub mod sandbox;
pub mod schema;
pub mod state;
pub mod tools;
pub mod traits;

pub use agent::{AgentConfig, AgentLoop, AgentSession, ExecContext, ToolRegistry};
pub use config::Config;
pub use schema::{FieldType, ObjectSchema};
pub use state::{PersistentKey, StateKey, StateStore};
pub use traits::{
    ChatRequest, ChatResponse, Empty, FinishReason, Message, Provider, Role, Tool, ToolCall,
    ToolResult, ToolSpec, TypedTool,
};
