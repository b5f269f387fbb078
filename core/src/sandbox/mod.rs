pub mod bridge;
pub mod eval;
pub mod library;

pub use bridge::{BridgeServer, ToolRequest, ToolResponse};
pub use eval::{
    EXECUTE_CODE_TOOL, ExecuteCodeOutput, ExecuteCodeTool, LAUNCH_FAILURE_EXIT_CODE,
    TIMEOUT_EXIT_CODE, TOOL_LIBRARY_TOOL, ToolLibraryTool,
};
pub use library::{BRIDGE_PORT_ENV, generate_library};
