//! Property tests: concurrent evaluation agrees with the eager evaluator.
//!
//! - solve(c) = evaluate_eagerly(c) for random circuits with small leaf delays
//! - a stopped solver never produces a value

use std::time::Duration;

use parallel_circuits::{evaluate_eagerly, Circuit, CircuitSolver, Node, SolveError, SolverConfig};
use proptest::prelude::*;

// ============================================================================
// Circuit Generators
// ============================================================================

fn arb_leaf() -> impl Strategy<Value = Node> {
    (any::<bool>(), 0u64..4).prop_map(|(value, delay)| {
        if delay == 0 {
            Node::leaf(value)
        } else {
            Node::delayed_leaf(value, Duration::from_millis(delay))
        }
    })
}

fn arb_node() -> impl Strategy<Value = Node> {
    arb_leaf().prop_recursive(4, 64, 5, |inner| {
        let children = prop::collection::vec(inner.clone(), 0..5);
        prop_oneof![
            inner.clone().prop_map(|child| Node::not(child)),
            children.clone().prop_map(|children| Node::and(children)),
            children.clone().prop_map(|children| Node::or(children)),
            (-1i64..6, children.clone()).prop_map(|(k, children)| Node::gt(k, children)),
            (-1i64..6, children).prop_map(|(k, children)| Node::lt(k, children)),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(condition, yes, no)| Node::if_then_else(condition, yes, no)),
        ]
    })
}

fn solver() -> CircuitSolver {
    CircuitSolver::with_config(SolverConfig::default().with_worker_threads(2)).unwrap()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn concurrent_matches_eager(root in arb_node()) {
        let solver = solver();
        let expected = evaluate_eagerly(&root);
        let mut value = solver.solve(&Circuit::new(root));
        prop_assert_eq!(value.get(), Ok(expected));
        // memoized
        prop_assert_eq!(value.get(), Ok(expected));
    }

    #[test]
    fn stopped_solver_never_answers(root in arb_node()) {
        let solver = solver();
        solver.stop();
        let mut value = solver.solve(&Circuit::new(root));
        prop_assert!(value.is_cancelled());
        prop_assert_eq!(value.get(), Err(SolveError::Cancelled));
    }
}
