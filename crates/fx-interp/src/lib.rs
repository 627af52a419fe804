//! Tree-walking evaluator for the Fx language.
//!
//! The interpreter walks the AST produced by `fx-par` and evaluates it in a
//! lexically scoped environment. Its pieces:
//!
//! - [`value`]: the runtime value family and per-operator dispatch
//! - [`flow`]: the result protocol multiplexing values, returns, and loop
//!   control over `Result`
//! - [`scope`]: symbol tables and the context chain used for lookup and
//!   tracebacks
//! - [`builtins`]: the built-in function registry
//! - [`io`]: the host trait the builtins talk to, so evaluation is testable
//! - [`modules`]: the filesystem-backed module loader and its cache
//! - [`interp`]: the visitors themselves

pub mod builtins;
pub mod flow;
pub mod interp;
pub mod io;
pub mod modules;
pub mod scope;
pub mod value;

pub use builtins::Builtin;
pub use flow::{Flow, RunResult};
pub use interp::Interpreter;
pub use io::{Host, StdHost, TestHost};
pub use modules::ModuleCache;
pub use scope::{global_table, Context, ScopeRef, SymbolTable};
pub use value::{DictKey, Function, Num, Value};
