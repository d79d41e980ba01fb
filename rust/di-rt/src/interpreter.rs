//! The interpreter façade: a persistent environment fed by source
//! fragments.
//!
//! `execute` evaluates a fragment and flushes the top-level names it
//! introduced, so repeated executions stay independent; `import` keeps
//! them, which is how library fragments and the REPL build up state.

use crate::eval::Evaluator;
use di_compiler::parse_source;
use di_core::env::Env;
use di_core::error::DiResult;
use di_core::value::Value;

#[derive(Debug, Default)]
pub struct Interpreter {
    env: Env,
    result: Value,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and evaluate `source` against the persistent environment,
    /// storing and returning the value of its last top-level expression.
    pub fn execute(&mut self, source: &str) -> DiResult<Value> {
        let program = parse_source(source)?;
        let value = Evaluator::new().eval_program(&program, &self.env, true)?;
        self.result = value.clone();
        Ok(value)
    }

    /// Evaluate `source` with scope flushing disabled: its top-level
    /// bindings persist for later fragments.
    pub fn import(&mut self, source: &str) -> DiResult<Value> {
        let program = parse_source(source)?;
        Evaluator::new().eval_program(&program, &self.env, false)
    }

    /// Drop every binding from the environment.
    pub fn clear(&mut self) {
        self.env.clear();
    }

    /// The value produced by the most recent successful [`execute`].
    ///
    /// [`execute`]: Interpreter::execute
    pub fn result(&self) -> &Value {
        &self.result
    }
}
