//! The `fx` command line interface.
//!
//! `fx script.fx` runs a file; `fx` with no argument starts the REPL.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fx_drv::{repl, EmitMode, Session};

#[derive(Debug, Parser)]
#[command(name = "fx", version, about = "The Fx language interpreter")]
struct Cli {
    /// Script to run; starts the REPL when omitted
    file: Option<PathBuf>,

    /// Stop after lexing and print the token stream
    #[arg(long, conflicts_with = "emit_ast")]
    emit_tokens: bool,

    /// Stop after parsing and print the AST
    #[arg(long)]
    emit_ast: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn emit_mode(&self) -> EmitMode {
        if self.emit_tokens {
            EmitMode::Tokens
        } else if self.emit_ast {
            EmitMode::Ast
        } else {
            EmitMode::Run
        }
    }
}

/// Initialize the logging system. `-v` selects debug level; otherwise the
/// `RUST_LOG` environment variable applies.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut session = Session::new();
    let code = match &cli.file {
        Some(path) => match session.run_file(path, cli.emit_mode()) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("fx: {err:#}");
                2
            }
        },
        None => repl::run_repl(&mut session),
    };

    ExitCode::from(code.clamp(0, 255) as u8)
}
