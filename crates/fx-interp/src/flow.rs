//! The runtime-result protocol.
//!
//! Every visitor returns `Result<Flow, FxError>`. The error side carries
//! real failures (and the `exit()` unwind); the [`Flow`] side distinguishes
//! an ordinary value from the non-local outcomes `return`, `break`, and
//! `continue`, which bubble up through enclosing visitors until a loop or
//! function boundary consumes them. No host exceptions are involved.

use fx_util::FxError;

use crate::value::Value;

/// The outcome of evaluating one AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    /// Ordinary completion with a value.
    Value(Value),
    /// A `return` travelling to the nearest function boundary.
    Return(Value),
    /// A `break` travelling to the nearest loop.
    Break,
    /// A `continue` travelling to the nearest loop.
    Continue,
}

impl Flow {
    /// The plain value, if this is ordinary completion.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Flow::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Result type of every visitor.
pub type RunResult = Result<Flow, FxError>;

/// Unwraps the value of a sub-evaluation, propagating errors with `?` and
/// early-returning any non-value [`Flow`] to the caller unchanged.
macro_rules! eval_value {
    ($e:expr) => {
        match $e? {
            $crate::flow::Flow::Value(value) => value,
            other => return Ok(other),
        }
    };
}
pub(crate) use eval_value;
