// Eager Reference Evaluator
// Evaluates every node with no pruning, no cancellation and no leaf latency.
// Children fan out over Rayon's pool.
use rayon::prelude::*;

use crate::engine::circuit::{skip_negations, GateKind, Node, ThresholdKind};

pub fn evaluate_eagerly(node: &Node) -> bool {
    match node {
        Node::Leaf(leaf) => leaf.value,
        Node::Not(child) => {
            let (inner, negated) = skip_negations(child);
            evaluate_eagerly(inner) == negated
        }
        Node::Gate { kind, children } => {
            let trues = count_true(children);
            match kind {
                GateKind::And => trues == children.len(),
                GateKind::Or => trues > 0,
            }
        }
        Node::Threshold {
            kind,
            threshold,
            children,
        } => {
            let trues = i64::try_from(count_true(children)).unwrap_or(i64::MAX);
            match kind {
                ThresholdKind::Gt => trues > *threshold,
                ThresholdKind::Lt => trues < *threshold,
            }
        }
        Node::If {
            condition,
            when_true,
            when_false,
        } => {
            let (condition, (when_true, when_false)) = rayon::join(
                || evaluate_eagerly(condition),
                || rayon::join(|| evaluate_eagerly(when_true), || evaluate_eagerly(when_false)),
            );
            if condition {
                when_true
            } else {
                when_false
            }
        }
    }
}

fn count_true(children: &[std::sync::Arc<Node>]) -> usize {
    children
        .par_iter()
        .filter(|child| evaluate_eagerly(child))
        .count()
}
