//! DI RT
//!
//! The tree-walking runtime: the evaluator that executes syntax trees
//! against an environment, and the [`Interpreter`] façade that owns a
//! persistent environment across source fragments.

pub mod eval;
pub mod interpreter;

pub use di_core::{DiError, DiResult, Env, ErrorKind, Value};
pub use eval::Evaluator;
pub use interpreter::Interpreter;
