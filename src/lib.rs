//! Concurrent evaluation of boolean circuits.
//!
//! A [`CircuitSolver`] evaluates read-only circuits of AND, OR, NOT, IF and
//! threshold (GT/LT) gates. Children are evaluated concurrently, gates stop
//! waiting as soon as their value is decided, and [`CircuitSolver::stop`]
//! cancels every outstanding computation.
//!
//! ```
//! use parallel_circuits::{Circuit, CircuitSolver, Node};
//!
//! let solver = CircuitSolver::new().unwrap();
//! // the stalled leaf never finishes, but AND is decided by the false leaf
//! let circuit = Circuit::new(Node::and([Node::stalled_leaf(true), Node::leaf(false)]));
//! let mut value = solver.solve(&circuit);
//! assert_eq!(value.get(), Ok(false));
//! solver.stop();
//! ```

pub mod engine;

pub use engine::circuit::{Circuit, GateKind, Latency, Leaf, Node, NodeKind, ThresholdKind};
pub use engine::config::SolverConfig;
pub use engine::eager::evaluate_eagerly;
pub use engine::error::{PoolError, SolveError};
pub use engine::solver::CircuitSolver;
pub use engine::value::CircuitValue;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn parallel_circuits(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Expose the solver and its result handle to Python
    m.add_class::<engine::controller::SolverController>()?;
    m.add_class::<engine::controller::PyCircuitValue>()?;
    Ok(())
}
