//! Multi-character operator lexing.
//!
//! Each routine here has already seen its first character and decides
//! between the one- and two-character forms by peeking at the next.

use crate::lexer::Lexer;
use crate::token::TokenKind;

impl<'a> Lexer<'a> {
    /// Lexes `-` or `->`.
    pub(super) fn lex_minus(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('>') {
            TokenKind::Arrow
        } else {
            TokenKind::Minus
        }
    }

    /// Lexes `=` or `==`.
    pub(super) fn lex_equals(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::EqEq
        } else {
            TokenKind::Eq
        }
    }

    /// Lexes `!` or `!=`.
    pub(super) fn lex_bang(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::NotEq
        } else {
            TokenKind::Not
        }
    }

    /// Lexes `<` or `<=`.
    pub(super) fn lex_less(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    /// Lexes `>` or `>=`.
    pub(super) fn lex_greater(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::GtEq
        } else {
            TokenKind::Gt
        }
    }
}
