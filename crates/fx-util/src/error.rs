//! The error type shared by every pipeline stage.
//!
//! Lexing, parsing, and evaluation all report failures as an [`FxError`]: an
//! error kind plus details, anchored to a [`Span`] in one source file.
//! Runtime errors additionally carry the call-stack frames recorded when the
//! error was raised, rendered as a traceback above the message.

use std::fmt::Write as _;

use thiserror::Error;

use crate::source::SourceMap;
use crate::span::{FileId, Span};

/// Classification of an [`FxError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The lexer hit a character it has no rule for.
    IllegalChar,
    /// The lexer expected the second half of a multi-character operator.
    ExpectedChar,
    /// The parser rejected the token stream.
    InvalidSyntax,
    /// The evaluator rejected a runtime operation.
    Runtime,
    /// Carrier for the `exit()` builtin. Holds the exit code; never rendered.
    Exit(i32),
}

impl ErrorKind {
    /// The user-visible name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::IllegalChar => "Illegal Character",
            ErrorKind::ExpectedChar => "Expected Character",
            ErrorKind::InvalidSyntax => "Invalid Syntax",
            ErrorKind::Runtime => "Runtime Error",
            ErrorKind::Exit(_) => "Exit",
        }
    }
}

/// One call-stack frame recorded on a runtime error.
///
/// Frames are stored outermost first, so rendering them in order yields a
/// `most recent call last` traceback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    /// File the frame was executing.
    pub file: FileId,
    /// 1-based line of the active position in that frame.
    pub line: u32,
    /// Scope display name, e.g. `<program>` or the function name.
    pub scope: String,
}

/// Result alias used across the pipeline.
pub type FxResult<T> = Result<T, FxError>;

/// An error anchored to a span of source text.
#[derive(Clone, Debug, Error)]
#[error("{}: {}", kind.name(), details)]
pub struct FxError {
    /// What went wrong, broadly.
    pub kind: ErrorKind,
    /// Human-readable detail message.
    pub details: String,
    /// File the span refers to.
    pub file: FileId,
    /// Offending range of source text.
    pub span: Span,
    /// Call stack for runtime errors, outermost frame first.
    pub trace: Vec<TraceFrame>,
}

impl FxError {
    fn new(kind: ErrorKind, details: impl Into<String>, file: FileId, span: Span) -> Self {
        Self {
            kind,
            details: details.into(),
            file,
            span,
            trace: Vec::new(),
        }
    }

    /// An `Illegal Character` error from the lexer.
    pub fn illegal_char(details: impl Into<String>, file: FileId, span: Span) -> Self {
        Self::new(ErrorKind::IllegalChar, details, file, span)
    }

    /// An `Expected Character` error from the lexer.
    pub fn expected_char(details: impl Into<String>, file: FileId, span: Span) -> Self {
        Self::new(ErrorKind::ExpectedChar, details, file, span)
    }

    /// An `Invalid Syntax` error from the parser.
    pub fn invalid_syntax(details: impl Into<String>, file: FileId, span: Span) -> Self {
        Self::new(ErrorKind::InvalidSyntax, details, file, span)
    }

    /// A `Runtime Error` from the evaluator. The traceback is attached by
    /// the evaluator via [`FxError::with_trace`].
    pub fn runtime(details: impl Into<String>, file: FileId, span: Span) -> Self {
        Self::new(ErrorKind::Runtime, details, file, span)
    }

    /// The non-error used to unwind out of `exit()`.
    pub fn exit(code: i32) -> Self {
        Self::new(ErrorKind::Exit(code), "", FileId::DUMMY, Span::DUMMY)
    }

    /// Attach call-stack frames (outermost first).
    pub fn with_trace(mut self, trace: Vec<TraceFrame>) -> Self {
        self.trace = trace;
        self
    }

    /// The exit code if this is the `exit()` carrier.
    pub fn exit_code(&self) -> Option<i32> {
        match self.kind {
            ErrorKind::Exit(code) => Some(code),
            _ => None,
        }
    }

    /// Render the error against the sources it refers to:
    ///
    /// ```text
    /// Invalid Syntax: Expected ':'
    /// File script.fx, line 3
    ///
    /// while x 1
    ///         ^
    /// ```
    ///
    /// Runtime errors replace the `File ..` line with a full traceback.
    pub fn render(&self, sources: &SourceMap) -> String {
        let mut out = String::new();

        match self.kind {
            ErrorKind::Runtime if !self.trace.is_empty() => {
                out.push_str("Traceback (most recent call last):\n");
                for frame in &self.trace {
                    let name = sources
                        .get(frame.file)
                        .map_or("<unknown>", |f| f.name.as_str());
                    let _ = writeln!(out, "  File {}, line {}, in {}", name, frame.line, frame.scope);
                }
                let _ = write!(out, "{}: {}", self.kind.name(), self.details);
            }
            _ => {
                let _ = write!(out, "{}: {}", self.kind.name(), self.details);
                if let Some(file) = sources.get(self.file) {
                    let _ = write!(out, "\nFile {}, line {}", file.name, self.span.line.max(1));
                }
            }
        }

        if let Some(file) = sources.get(self.file) {
            let line = self.span.line.max(1);
            let text = file.line_text(line);
            out.push_str("\n\n");
            out.push_str(text);
            out.push('\n');
            out.push_str(&caret_line(&file.text, self.span));
        }

        out
    }
}

/// Build the `^^^` underline for a span, clamped to its first source line.
fn caret_line(source: &str, span: Span) -> String {
    let column = span.column.max(1) as usize;

    // Width in characters: the part of the span on its first line.
    let start = span.start.min(source.len());
    let end = span.end.min(source.len());
    let width = source[start..end]
        .chars()
        .take_while(|&c| c != '\n')
        .count()
        .max(1);

    let mut out = String::with_capacity(column + width);
    for _ in 0..column - 1 {
        out.push(' ');
    }
    for _ in 0..width {
        out.push('^');
    }
    out
}
