// Controller
use std::sync::Arc;

use pyo3::exceptions::{PyInterruptedError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyTuple;

use crate::engine::circuit::{Circuit, Node, NodeKind};
use crate::engine::config::SolverConfig;
use crate::engine::error::SolveError;
use crate::engine::solver::CircuitSolver;
use crate::engine::value::CircuitValue;

fn to_py_err(error: SolveError) -> PyErr {
    match error {
        SolveError::Cancelled => PyInterruptedError::new_err(error.to_string()),
        SolveError::MalformedCircuit(_) => PyValueError::new_err(error.to_string()),
        SolveError::Runtime(_) => PyRuntimeError::new_err(error.to_string()),
    }
}

fn malformed(message: impl Into<String>) -> PyErr {
    to_py_err(SolveError::MalformedCircuit(message.into()))
}

/// Convert a nested tuple description into a node.
///
/// Accepted shapes: `("leaf", bool)`, `("not", node)`, `("and", [nodes])`,
/// `("or", [nodes])`, `("gt", k, [nodes])`, `("lt", k, [nodes])` and
/// `("if", cond, then, else)`.
fn extract_node(obj: &Bound<'_, PyAny>) -> PyResult<Arc<Node>> {
    let tuple = obj
        .downcast::<PyTuple>()
        .map_err(|_| malformed("circuit nodes must be tuples"))?;
    if tuple.is_empty() {
        return Err(malformed("empty node tuple"));
    }
    let tag: String = tuple.get_item(0)?.extract()?;
    let kind: NodeKind = tag.parse().map_err(to_py_err)?;

    let extract_list = |index: usize| -> PyResult<Vec<Arc<Node>>> {
        let items: Vec<Bound<'_, PyAny>> = tuple.get_item(index)?.extract()?;
        items.iter().map(extract_node).collect()
    };

    let (value, threshold, children) = match kind {
        NodeKind::Leaf => (Some(tuple.get_item(1)?.extract::<bool>()?), None, Vec::new()),
        NodeKind::Not => (None, None, vec![extract_node(&tuple.get_item(1)?)?]),
        NodeKind::And | NodeKind::Or => (None, None, extract_list(1)?),
        NodeKind::Gt | NodeKind::Lt => {
            let threshold: i64 = tuple.get_item(1)?.extract()?;
            (None, Some(threshold), extract_list(2)?)
        }
        NodeKind::If => {
            let mut parts = Vec::with_capacity(3);
            for index in 1..tuple.len() {
                parts.push(extract_node(&tuple.get_item(index)?)?);
            }
            (None, None, parts)
        }
    };

    Node::from_parts(kind, value, threshold, children)
        .map(Arc::new)
        .map_err(to_py_err)
}

#[pyclass(name = "CircuitValue")]
pub struct PyCircuitValue {
    inner: CircuitValue,
}

#[pymethods]
impl PyCircuitValue {
    /// Block until the value is known. The GIL is released while waiting.
    pub fn get(&mut self, py: Python<'_>) -> PyResult<bool> {
        let inner = &mut self.inner;
        py.allow_threads(|| inner.get()).map_err(to_py_err)
    }

    pub fn cancel(&mut self) {
        self.inner.cancel();
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.is_resolved()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

#[pyclass(name = "CircuitSolver")]
pub struct SolverController {
    solver: CircuitSolver,
}

#[pymethods]
impl SolverController {
    #[new]
    #[pyo3(signature = (worker_threads=None))]
    pub fn new(worker_threads: Option<usize>) -> PyResult<Self> {
        let mut config = SolverConfig::default();
        if let Some(threads) = worker_threads {
            config = config.with_worker_threads(threads);
        }
        let solver = CircuitSolver::with_config(config).map_err(to_py_err)?;
        Ok(Self { solver })
    }

    /// Start evaluating a circuit; returns immediately.
    pub fn solve(&self, circuit: &Bound<'_, PyAny>) -> PyResult<PyCircuitValue> {
        let root = extract_node(circuit)?;
        let inner = self.solver.solve(&Circuit::new(root));
        Ok(PyCircuitValue { inner })
    }

    pub fn stop(&self) {
        self.solver.stop();
    }

    pub fn active_tasks(&self) -> usize {
        self.solver.active_tasks()
    }
}
