// Result Handle
use crate::engine::error::SolveError;
use crate::engine::pool::Submission;

enum State {
    Cancelled,
    Pending(Submission),
    Resolved(bool),
}

/// The value of one solve request.
///
/// The root task's result is read lazily on the first [`get`](Self::get)
/// and memoized; later reads never touch the runtime again.
pub struct CircuitValue {
    state: State,
}

impl CircuitValue {
    pub(crate) fn pending(submission: Submission) -> Self {
        Self {
            state: State::Pending(submission),
        }
    }

    /// A handle for a request that was never submitted.
    pub(crate) fn cancelled() -> Self {
        Self {
            state: State::Cancelled,
        }
    }

    /// Block until the circuit's value is known.
    ///
    /// Fails with [`SolveError::Cancelled`] if the request was rejected or
    /// its task was cancelled before producing a value.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async execution context; use
    /// [`value`](Self::value) there.
    pub fn get(&mut self) -> Result<bool, SolveError> {
        let outcome = match &mut self.state {
            State::Resolved(value) => return Ok(*value),
            State::Cancelled => return Err(SolveError::Cancelled),
            State::Pending(submission) if submission.is_abandoned() => Err(SolveError::Cancelled),
            State::Pending(submission) => submission.wait(),
        };
        self.settle(outcome)
    }

    /// Async counterpart of [`get`](Self::get).
    pub async fn value(&mut self) -> Result<bool, SolveError> {
        let outcome = match &mut self.state {
            State::Resolved(value) => return Ok(*value),
            State::Cancelled => return Err(SolveError::Cancelled),
            State::Pending(submission) if submission.is_abandoned() => Err(SolveError::Cancelled),
            State::Pending(submission) => submission.finished().await,
        };
        self.settle(outcome)
    }

    /// Cancel this request's task tree. A resolved value is kept.
    pub fn cancel(&mut self) {
        if let State::Pending(submission) = &self.state {
            submission.cancel();
            self.state = State::Cancelled;
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, State::Resolved(_))
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.state {
            State::Cancelled => true,
            State::Pending(submission) => submission.is_abandoned(),
            State::Resolved(_) => false,
        }
    }

    fn settle(&mut self, outcome: Result<bool, SolveError>) -> Result<bool, SolveError> {
        self.state = match &outcome {
            Ok(value) => State::Resolved(*value),
            Err(_) => State::Cancelled,
        };
        outcome
    }
}

impl std::fmt::Debug for CircuitValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Cancelled => "cancelled",
            State::Pending(_) => "pending",
            State::Resolved(true) => "true",
            State::Resolved(false) => "false",
        };
        f.debug_struct("CircuitValue").field("state", &state).finish()
    }
}
