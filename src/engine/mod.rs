// Module Definition
pub mod circuit;
pub mod config;
#[cfg(feature = "python")]
pub mod controller; // Python bindings over the solver
pub mod eager; // Reference evaluator without pruning
pub mod error;
pub mod evaluator;
pub mod pool; // Task substrate: runtime, submission, shutdown
pub mod solver;
pub mod value;
pub mod window;
