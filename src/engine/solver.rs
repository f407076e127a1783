// Solver Facade
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::circuit::Circuit;
use crate::engine::config::SolverConfig;
use crate::engine::error::SolveError;
use crate::engine::pool::TaskPool;
use crate::engine::value::CircuitValue;

/// Evaluates circuits concurrently until stopped.
pub struct CircuitSolver {
    pool: TaskPool,
    accepting: AtomicBool,
}

impl CircuitSolver {
    pub fn new() -> Result<Self, SolveError> {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Result<Self, SolveError> {
        let pool = TaskPool::new(&config)?;
        debug!(?config, "circuit solver started");
        Ok(Self {
            pool,
            accepting: AtomicBool::new(true),
        })
    }

    /// Start evaluating `circuit` and return its handle without blocking.
    ///
    /// After [`stop`](Self::stop) the returned handle is already cancelled.
    pub fn solve(&self, circuit: &Circuit) -> CircuitValue {
        if !self.accepting.load(Ordering::Acquire) {
            return CircuitValue::cancelled();
        }

        match self.pool.submit(Arc::clone(circuit.root())) {
            Ok(submission) => CircuitValue::pending(submission),
            Err(error) => {
                debug!(%error, "solve request rejected");
                CircuitValue::cancelled()
            }
        }
    }

    /// Refuse further requests and cancel everything in flight.
    ///
    /// Idempotent. Returns without waiting for running tasks to unwind;
    /// their handles report [`SolveError::Cancelled`] once they do.
    pub fn stop(&self) {
        if self.accepting.swap(false, Ordering::AcqRel) {
            info!(alive = self.pool.active_tasks(), "stopping circuit solver");
        }
        self.pool.shutdown();
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Evaluation tasks still alive, including ones that are unwinding.
    pub fn active_tasks(&self) -> usize {
        self.pool.active_tasks()
    }
}

impl Drop for CircuitSolver {
    fn drop(&mut self) {
        self.stop();
    }
}
