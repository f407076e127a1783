//! Error types for circuit evaluation.

use thiserror::Error;

/// Errors surfaced to callers of the solver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The computation, or one of its ancestors, was cancelled.
    ///
    /// Raised by a global stop, by a handle-scoped cancel, when a sibling's
    /// early exit pruned the branch, and for any failure inside a child task.
    #[error("circuit computation was cancelled")]
    Cancelled,

    /// The circuit producer handed over a node that cannot be evaluated.
    #[error("malformed circuit: {0}")]
    MalformedCircuit(String),

    /// The task runtime could not be started.
    #[error("failed to start evaluation runtime: {0}")]
    Runtime(String),
}

/// Errors raised by the task pool.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The pool has been shut down and accepts no new tasks.
    #[error("task pool is shut down")]
    ShutDown,
}
