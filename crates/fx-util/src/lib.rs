//! Shared infrastructure for the Fx interpreter pipeline.
//!
//! This crate provides the types every later stage builds on: source
//! locations ([`Span`], [`FileId`]), the registry of loaded files
//! ([`SourceMap`]), and the error type reported by the lexer, parser,
//! and evaluator ([`FxError`]), including its caret-underline renderer.

pub mod error;
pub mod source;
pub mod span;

pub use error::{ErrorKind, FxError, FxResult, TraceFrame};
pub use source::{SourceFile, SourceMap};
pub use span::{FileId, Span};
