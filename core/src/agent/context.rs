/// Explicit execution context threaded through every loop step and tool
/// invocation. Nothing here is ambient: callers pass it where it is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecContext {
    /// When set, tool invocations log name, arguments, and result.
    pub verbose: bool,
}

impl ExecContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
