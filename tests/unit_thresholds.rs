//! Exhaustive checks of the threshold gates over small child counts.

use parallel_circuits::{Circuit, CircuitSolver, CircuitValue, Node, SolverConfig};

const MAX_CHILDREN: usize = 6;

fn assignment(n: usize, mask: u32) -> Vec<Node> {
    (0..n).map(|bit| Node::leaf(mask & (1 << bit) != 0)).collect()
}

#[test]
fn test_threshold_grid() {
    let solver = CircuitSolver::with_config(SolverConfig::default().with_worker_threads(4)).unwrap();
    let mut pending: Vec<(String, bool, CircuitValue)> = Vec::new();

    for n in 0..=MAX_CHILDREN {
        for mask in 0..(1u32 << n) {
            let trues = i64::from(mask.count_ones());
            for k in 0..=n as i64 {
                let gt = Node::gt(k, assignment(n, mask));
                pending.push((
                    format!("GT({k}) over {mask:0n$b}"),
                    trues > k,
                    solver.solve(&Circuit::new(gt)),
                ));
                let lt = Node::lt(k, assignment(n, mask));
                pending.push((
                    format!("LT({k}) over {mask:0n$b}"),
                    trues < k,
                    solver.solve(&Circuit::new(lt)),
                ));
            }
        }
    }

    for (label, expected, mut value) in pending {
        assert_eq!(value.get(), Ok(expected), "{label}");
    }
}

#[test]
fn test_constant_thresholds_skip_children() {
    let solver = CircuitSolver::new().unwrap();
    for n in 0..=MAX_CHILDREN {
        let stalled = || (0..n).map(|_| Node::stalled_leaf(true)).collect::<Vec<_>>();
        let n = n as i64;

        for k in [-3, -1, 0] {
            let mut value = solver.solve(&Circuit::new(Node::lt(k, stalled())));
            assert_eq!(value.get(), Ok(false), "LT({k}) over {n} children");
        }
        for k in [n, n + 1, n + 5] {
            let mut value = solver.solve(&Circuit::new(Node::gt(k, stalled())));
            assert_eq!(value.get(), Ok(false), "GT({k}) over {n} children");
        }
        for k in [n + 1, n + 4] {
            let mut value = solver.solve(&Circuit::new(Node::lt(k, stalled())));
            assert_eq!(value.get(), Ok(true), "LT({k}) over {n} children");
        }
    }
}
