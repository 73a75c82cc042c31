//! Runtime configuration.
//!
//! Configuration specifies limits and switches only; the runtime enforces
//! them.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of live frames, `None` for no limit.
    pub max_frames: Option<usize>,

    /// Log every executed instruction at `trace` level.
    pub trace_execution: bool,
}

impl RuntimeConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn with_trace_execution(mut self, trace_execution: bool) -> Self {
        self.trace_execution = trace_execution;
        self
    }
}
