// Solver Configuration
use crate::engine::error::SolveError;

/// Settings for the task pool backing a solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Async worker threads. `None` uses one per available core.
    pub worker_threads: Option<usize>,
    pub thread_name: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "circuit-worker".to_string(),
        }
    }
}

impl SolverConfig {
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads.max(1));
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Reject settings the runtime cannot be built with.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.worker_threads == Some(0) {
            return Err(SolveError::Runtime(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
