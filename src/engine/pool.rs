// Task Pool
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::engine::circuit::Node;
use crate::engine::config::SolverConfig;
use crate::engine::error::{PoolError, SolveError};
use crate::engine::evaluator::evaluate;

/// Runs evaluation tasks on a dedicated multi-threaded runtime.
///
/// Evaluation tasks are async, so a gate waiting on its children parks
/// without holding a worker thread; the pool therefore admits any number of
/// concurrently pending tasks.
pub struct TaskPool {
    runtime: Option<Runtime>, // Option allows shutting down from Drop
    handle: Handle,
    shutdown: CancellationToken,
}

impl TaskPool {
    pub fn new(config: &SolverConfig) -> Result<Self, SolveError> {
        config.validate()?;

        let mut builder = Builder::new_multi_thread();
        builder
            .enable_time()
            .thread_name(config.thread_name.clone());
        if let Some(threads) = config.worker_threads {
            builder.worker_threads(threads);
        }

        let runtime = builder
            .build()
            .map_err(|e| SolveError::Runtime(e.to_string()))?;
        let handle = runtime.handle().clone();
        Ok(Self {
            runtime: Some(runtime),
            handle,
            shutdown: CancellationToken::new(),
        })
    }

    /// Submit the evaluation of `node` as a new root task.
    pub fn submit(&self, node: Arc<Node>) -> Result<Submission, PoolError> {
        if self.shutdown.is_cancelled() {
            return Err(PoolError::ShutDown);
        }
        // A stop racing past the check above still reaches the task through
        // its token, which is born cancelled in that case.
        let token = self.shutdown.child_token();
        let task = self.handle.spawn(evaluate(node, token.clone()));
        Ok(Submission {
            task,
            token,
            runtime: self.handle.clone(),
        })
    }

    /// Refuse new work and cancel every queued or running task. Does not wait.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            debug!(alive = self.active_tasks(), "shutting down task pool");
        }
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Tasks currently alive on the runtime, queued or running.
    pub fn active_tasks(&self) -> usize {
        self.handle.metrics().num_alive_tasks()
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// A submitted root task together with its cancellation signal.
pub struct Submission {
    task: JoinHandle<Result<bool, SolveError>>,
    token: CancellationToken,
    runtime: Handle,
}

impl Submission {
    /// Best-effort cancel: an unstarted task never runs, a running one
    /// unwinds its children at the next wait.
    pub fn cancel(&self) {
        self.token.cancel();
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancelled before it could produce a value.
    pub fn is_abandoned(&self) -> bool {
        self.token.is_cancelled() && !self.task.is_finished()
    }

    /// Block the calling thread until the task finishes.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async execution context.
    pub fn wait(&mut self) -> Result<bool, SolveError> {
        collect(self.runtime.block_on(&mut self.task))
    }

    pub async fn finished(&mut self) -> Result<bool, SolveError> {
        collect((&mut self.task).await)
    }
}

fn collect(joined: Result<Result<bool, SolveError>, JoinError>) -> Result<bool, SolveError> {
    match joined {
        Ok(outcome) => outcome,
        Err(error) if error.is_cancelled() => Err(SolveError::Cancelled),
        Err(error) => {
            warn!(%error, "root evaluation task failed, reporting cancellation");
            Err(SolveError::Cancelled)
        }
    }
}
