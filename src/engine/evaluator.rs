// Gate Evaluator
//
// Every visited node becomes one task. A gate submits its children into a
// JoinSet, consumes them in completion order, and leaves as soon as its
// value is decided. Dropping the JoinSet aborts whatever is still running,
// and the scope token's drop guard signals the same children cooperatively,
// so no exit path leaves a child behind.
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::engine::circuit::{skip_negations, Latency, Leaf, Node};
use crate::engine::error::SolveError;
use crate::engine::window::{plan_gate, plan_threshold, CountWindow, Plan, Tally};

/// A boxed, spawnable evaluation of one node.
pub type Evaluation = Pin<Box<dyn Future<Output = Result<bool, SolveError>> + Send + 'static>>;

const CONDITION: usize = 0;
const WHEN_TRUE: usize = 1;
const WHEN_FALSE: usize = 2;

/// Evaluate `node`, submitting child evaluations to the current runtime.
///
/// Fails with [`SolveError::Cancelled`] if `token` is cancelled on entry or
/// while waiting for any child. Never returns a partial value.
pub fn evaluate(node: Arc<Node>, token: CancellationToken) -> Evaluation {
    Box::pin(async move {
        if token.is_cancelled() {
            return Err(SolveError::Cancelled);
        }

        // NOT chains are peeled here so their depth never reaches the stack.
        let (target, negated) = skip_negations(&node);
        let target = Arc::clone(target);

        let value = match target.as_ref() {
            Node::Leaf(leaf) => read_leaf(*leaf, &token).await,
            // not reached after skip_negations
            Node::Not(child) => evaluate(Arc::clone(child), token.clone())
                .await
                .map(|value| !value),
            Node::Gate { kind, children } => {
                run_plan(plan_gate(*kind, children.len()), children, &token).await
            }
            Node::Threshold {
                kind,
                threshold,
                children,
            } => {
                let plan = plan_threshold(*kind, *threshold, children.len());
                run_plan(plan, children, &token).await
            }
            Node::If {
                condition,
                when_true,
                when_false,
            } => choose([condition, when_true, when_false], &token).await,
        };
        value.map(|value| value != negated)
    })
}

async fn read_leaf(leaf: Leaf, token: &CancellationToken) -> Result<bool, SolveError> {
    match leaf.latency {
        Latency::Immediate => Ok(leaf.value),
        Latency::After(delay) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(SolveError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(leaf.value),
        },
        Latency::Never => {
            token.cancelled().await;
            Err(SolveError::Cancelled)
        }
    }
}

async fn run_plan(
    plan: Plan,
    children: &[Arc<Node>],
    token: &CancellationToken,
) -> Result<bool, SolveError> {
    match plan {
        Plan::Constant(value) => {
            debug!(value, children = children.len(), "threshold decided without children");
            Ok(value)
        }
        Plan::Count(window) => count(window, children, token).await,
    }
}

/// The shared AND/OR/GT/LT protocol.
async fn count(
    window: CountWindow,
    children: &[Arc<Node>],
    token: &CancellationToken,
) -> Result<bool, SolveError> {
    let scope = token.child_token();
    let _guard = scope.clone().drop_guard();

    let mut pending = JoinSet::new();
    for child in children {
        pending.spawn(evaluate(Arc::clone(child), scope.child_token()));
    }
    trace!(children = children.len(), "submitted gate children");

    let mut tally = Tally::default();
    while let Some(joined) = next_completion(&mut pending, token).await? {
        let value = match joined {
            Ok(outcome) => child_value(outcome)?,
            Err(error) => return Err(task_failure(error)),
        };
        tally.record(value);

        if let Some(value) = window.decide(tally) {
            debug!(
                value,
                trues = tally.trues,
                falses = tally.falses,
                pruned = pending.len(),
                "gate decided early"
            );
            return Ok(value);
        }
    }

    Ok(window.settle(tally))
}

/// IF: race condition and both branches.
async fn choose(parts: [&Arc<Node>; 3], token: &CancellationToken) -> Result<bool, SolveError> {
    let scope = token.child_token();
    let _guard = scope.clone().drop_guard();
    // One token per part so an unneeded branch can be dropped on its own.
    let tokens = [scope.child_token(), scope.child_token(), scope.child_token()];

    let mut pending = JoinSet::new();
    for (slot, part) in parts.into_iter().enumerate() {
        let evaluation = evaluate(Arc::clone(part), tokens[slot].clone());
        pending.spawn(async move { (slot, evaluation.await) });
    }

    let mut results: [Option<bool>; 3] = [None; 3];
    while let Some(joined) = next_completion(&mut pending, token).await? {
        let (slot, outcome) = match joined {
            Ok(pair) => pair,
            Err(error) => return Err(task_failure(error)),
        };
        if tokens[slot].is_cancelled() {
            // a branch we dropped ourselves
            continue;
        }
        results[slot] = Some(child_value(outcome)?);

        if let Some(condition) = results[CONDITION] {
            let (needed, unneeded) = if condition {
                (WHEN_TRUE, WHEN_FALSE)
            } else {
                (WHEN_FALSE, WHEN_TRUE)
            };
            tokens[unneeded].cancel();
            if let Some(value) = results[needed] {
                return Ok(value);
            }
            continue;
        }

        if let (Some(when_true), Some(when_false)) = (results[WHEN_TRUE], results[WHEN_FALSE]) {
            if when_true == when_false {
                debug!(value = when_true, "branches agree, condition dropped");
                return Ok(when_true);
            }
        }
    }

    match results {
        [Some(true), Some(value), _] | [Some(false), _, Some(value)] => Ok(value),
        _ => Err(SolveError::Cancelled),
    }
}

/// Wait for the next finished child, or fail once `token` is cancelled.
async fn next_completion<T: Send + 'static>(
    pending: &mut JoinSet<T>,
    token: &CancellationToken,
) -> Result<Option<Result<T, JoinError>>, SolveError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            trace!("cancelled while waiting on children");
            Err(SolveError::Cancelled)
        }
        joined = pending.join_next() => Ok(joined),
    }
}

// A failing child is reported upward as a cancellation.
fn child_value(outcome: Result<bool, SolveError>) -> Result<bool, SolveError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(SolveError::Cancelled) => Err(SolveError::Cancelled),
        Err(error) => {
            warn!(%error, "child evaluation failed, reporting cancellation");
            Err(SolveError::Cancelled)
        }
    }
}

fn task_failure(error: JoinError) -> SolveError {
    if !error.is_cancelled() {
        warn!(%error, "child task failed, reporting cancellation");
    }
    SolveError::Cancelled
}
