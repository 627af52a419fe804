//! Host I/O abstraction for the builtins.
//!
//! `print`, `input`, and `clear` are the only points where evaluation
//! touches the outside world. They go through the [`Host`] trait so the
//! interpreter can run against captured buffers in tests and against the
//! process stdio in the CLI.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// The host surface the builtins use.
pub trait Host {
    /// Write text to the host output. No newline is appended.
    fn write(&mut self, text: &str);

    /// Read one line of input, without its trailing newline. End of input
    /// yields an empty string.
    fn read_line(&mut self) -> String;

    /// Clear the host display.
    fn clear_screen(&mut self);
}

/// Process stdio: the host used by the CLI and REPL.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn write(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        line.trim_end_matches(['\n', '\r']).to_string()
    }

    fn clear_screen(&mut self) {
        let command = if cfg!(windows) { "cls" } else { "clear" };
        let _ = std::process::Command::new(command).status();
    }
}

/// Captures output and serves scripted input lines, for tests.
#[derive(Debug, Default)]
pub struct TestHost {
    /// Everything written so far.
    pub output: String,
    /// Lines handed out by `read_line`, front first.
    pub input: VecDeque<String>,
    /// How many times the screen was cleared.
    pub clears: usize,
}

impl TestHost {
    /// A host with no scripted input.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that will serve the given input lines.
    pub fn with_input(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Host for TestHost {
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn read_line(&mut self) -> String {
        self.input.pop_front().unwrap_or_default()
    }

    fn clear_screen(&mut self) {
        self.clears += 1;
    }
}
