//! Identifier and keyword lexing.

use crate::lexer::Lexer;
use crate::token::{Keyword, TokenKind};

impl<'a> Lexer<'a> {
    /// Lexes an identifier or keyword.
    ///
    /// Identifiers start with a letter or underscore and continue with
    /// letters, digits, underscores, or `.` — the dot supports
    /// module-qualified names like `math.abs`, which the import machinery
    /// splits apart again.
    pub(super) fn lex_identifier(&mut self) -> TokenKind {
        let start = self.token_start;

        while matches!(
            self.cursor.current_char(),
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.'
        ) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(start);
        match Keyword::from_str(text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident(text.to_string()),
        }
    }
}
