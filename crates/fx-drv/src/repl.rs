//! The interactive read-eval-print loop.
//!
//! Each line is a complete program evaluated in the session's globals, so
//! bindings persist across lines. The result's repr is echoed unless it is
//! `Null` (statements like `print(..)` or `let` bindings of `Null` would
//! otherwise clutter the transcript).

use std::io::{BufRead, Write};

use fx_interp::{StdHost, Value};

use crate::Session;

const PROMPT: &str = "FxPy>>> ";

/// Run the REPL until end of input or `exit()`. Returns the process exit
/// code.
pub fn run_repl(session: &mut Session) -> i32 {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut host = StdHost;

    loop {
        let _ = write!(stdout, "{PROMPT}");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            // End of input: leave quietly.
            Ok(0) | Err(_) => return 0,
            Ok(_) => {}
        }

        if line.trim().is_empty() {
            continue;
        }

        match session.run_with_host("<stdin>", &line, &mut host) {
            Ok(Value::Null) => {}
            Ok(value) => println!("{}", value.repr()),
            Err(err) => {
                if let Some(code) = err.exit_code() {
                    return code;
                }
                println!("{}", session.render_error(&err));
            }
        }
    }
}
