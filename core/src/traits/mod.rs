pub mod provider;
pub mod tool;

pub use provider::{
    ChatRequest, ChatResponse, FinishReason, Message, Provider, Role, ToolCall,
};
pub use tool::{Empty, Tool, ToolResult, ToolSpec, TypedTool};
