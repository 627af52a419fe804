//! Driver for the Fx interpreter.
//!
//! A [`Session`] owns the state that outlives a single program run: the
//! source map (for error rendering), the module cache, and the global
//! symbol table the REPL accumulates bindings in. The driver wires source
//! text through lex → parse → evaluate and maps the outcome to process
//! exit codes.

pub mod repl;

use std::path::Path;
use std::rc::Rc;

use anyhow::Context as _;

use fx_interp::{global_table, Host, Interpreter, ModuleCache, ScopeRef, StdHost, Value};
use fx_lex::{Lexer, Token};
use fx_par::{ast::Block, Parser};
use fx_util::{FxError, FxResult, SourceMap};

/// How far to take the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmitMode {
    /// Stop after lexing and print the token stream.
    Tokens,
    /// Stop after parsing and print the AST.
    Ast,
    /// Evaluate the program.
    #[default]
    Run,
}

/// One interpreter session: a file run or a whole REPL sitting.
pub struct Session {
    sources: SourceMap,
    modules: ModuleCache,
    globals: ScopeRef,
}

impl Session {
    /// A fresh session with the host globals installed.
    pub fn new() -> Self {
        Self {
            sources: SourceMap::new(),
            modules: ModuleCache::new(),
            globals: global_table(),
        }
    }

    /// Run a program against the process stdio.
    ///
    /// Bindings land in the session globals, so consecutive calls see each
    /// other's definitions (the REPL relies on this).
    pub fn run_source(&mut self, name: &str, text: &str) -> FxResult<Value> {
        let mut host = StdHost;
        self.run_with_host(name, text, &mut host)
    }

    /// Run a program against a caller-supplied host.
    pub fn run_with_host(
        &mut self,
        name: &str,
        text: &str,
        host: &mut dyn Host,
    ) -> FxResult<Value> {
        Interpreter::new(&mut self.sources, &mut self.modules, host).run(
            name,
            text,
            Rc::clone(&self.globals),
        )
    }

    /// Lex only.
    pub fn emit_tokens(&mut self, name: &str, text: &str) -> FxResult<Vec<Token>> {
        let file = self.sources.add_file(name, text);
        Lexer::new(text, file).tokenize()
    }

    /// Lex and parse only.
    pub fn emit_ast(&mut self, name: &str, text: &str) -> FxResult<Block> {
        let file = self.sources.add_file(name, text);
        let tokens = Lexer::new(text, file).tokenize()?;
        Parser::new(tokens, file).parse_program()
    }

    /// Render an error against everything this session has loaded.
    pub fn render_error(&self, err: &FxError) -> String {
        err.render(&self.sources)
    }

    /// Run a file through the pipeline and map the outcome to an exit
    /// code: 0 on success, the `exit()` code if the program called it, 1
    /// on a rendered language error. Host I/O failures surface as `Err`.
    pub fn run_file(&mut self, path: &Path, emit: EmitMode) -> anyhow::Result<i32> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let name = path.display().to_string();
        tracing::debug!(file = %name, ?emit, "running file");

        let failure = match emit {
            EmitMode::Tokens => match self.emit_tokens(&name, &text) {
                Ok(tokens) => {
                    for token in &tokens {
                        println!("{:?}", token.kind);
                    }
                    return Ok(0);
                }
                Err(err) => err,
            },
            EmitMode::Ast => match self.emit_ast(&name, &text) {
                Ok(program) => {
                    println!("{program:#?}");
                    return Ok(0);
                }
                Err(err) => err,
            },
            EmitMode::Run => match self.run_source(&name, &text) {
                Ok(_) => return Ok(0),
                Err(err) => err,
            },
        };

        if let Some(code) = failure.exit_code() {
            return Ok(code);
        }
        println!("{}", self.render_error(&failure));
        Ok(1)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
