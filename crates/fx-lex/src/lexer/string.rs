//! String literal lexing.

use fx_util::{FxError, FxResult, Span};

use crate::lexer::Lexer;
use crate::token::TokenKind;

impl<'a> Lexer<'a> {
    /// Lexes a string literal delimited by `'` or `"` (the closing quote
    /// must match the opening one).
    ///
    /// Escapes `\n \t \r \\ \' \"` are processed; an unknown escape yields
    /// the escaped character itself. A string that runs to the end of input
    /// is an `Illegal Character` error anchored on the opening quote.
    pub(super) fn lex_string(&mut self) -> FxResult<TokenKind> {
        let quote = self.cursor.current_char();
        self.cursor.advance();

        let mut content = String::new();

        loop {
            if self.cursor.is_at_end() {
                // Anchor on the opening quote, one character wide.
                let span = Span::new(
                    self.token_start,
                    self.token_start + 1,
                    self.token_start_line,
                    self.token_start_column,
                );
                return Err(FxError::illegal_char(
                    "Unterminated string".to_string(),
                    self.file,
                    span,
                ));
            }

            let c = self.cursor.current_char();

            if c == quote {
                self.cursor.advance();
                return Ok(TokenKind::Str(content));
            }

            if c == '\\' {
                self.cursor.advance();
                if self.cursor.is_at_end() {
                    continue; // report as unterminated on the next pass
                }
                let escaped = self.cursor.current_char();
                content.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
                self.cursor.advance();
            } else {
                content.push(c);
                self.cursor.advance();
            }
        }
    }
}
