//! Main lexer implementation for the Fx language.
//!
//! [`Lexer`] walks the source with a [`Cursor`] and emits one [`Token`] per
//! call to `next_token`, dispatching on the first character to the
//! specialised routines in the submodules (numbers, strings, identifiers,
//! multi-character operators).

mod identifier;
mod number;
mod operator;
mod string;

use fx_util::{FileId, FxError, FxResult, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// The lexer for Fx source code.
///
/// # Example
///
/// ```
/// use fx_lex::{Lexer, TokenKind};
/// use fx_util::FileId;
///
/// let tokens = Lexer::new("let x = 42", FileId::DUMMY).tokenize().unwrap();
/// assert!(matches!(tokens.last().unwrap().kind, TokenKind::Eof));
/// assert_eq!(tokens.len(), 5);
/// ```
pub struct Lexer<'a> {
    /// Character cursor for traversing source.
    cursor: Cursor<'a>,

    /// File the source belongs to, stamped into every span and error.
    file: FileId,

    /// Start byte of the current token.
    token_start: usize,

    /// Start line of the current token.
    token_start_line: u32,

    /// Start column of the current token.
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source code.
    pub fn new(source: &'a str, file: FileId) -> Self {
        Self {
            cursor: Cursor::new(source),
            file,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Tokenizes the entire input.
    ///
    /// Returns the token stream ending with [`TokenKind::Eof`], or the error
    /// for the first offending character.
    pub fn tokenize(mut self) -> FxResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Returns the next token from the source.
    fn next_token(&mut self) -> FxResult<Token> {
        self.skip_whitespace_and_comments();

        // Record start position of this token
        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(self.token(TokenKind::Eof));
        }

        // Dispatch based on first character
        let kind = match self.cursor.current_char() {
            '\n' | ';' => {
                self.cursor.advance();
                TokenKind::Newline
            }

            // Single-character operators and delimiters
            '+' => {
                self.cursor.advance();
                TokenKind::Plus
            }
            '*' => {
                self.cursor.advance();
                TokenKind::Star
            }
            '/' => {
                self.cursor.advance();
                TokenKind::Slash
            }
            '%' => {
                self.cursor.advance();
                TokenKind::Percent
            }
            '^' => {
                self.cursor.advance();
                TokenKind::Caret
            }
            ',' => {
                self.cursor.advance();
                TokenKind::Comma
            }
            ':' => {
                self.cursor.advance();
                TokenKind::Colon
            }
            '(' => {
                self.cursor.advance();
                TokenKind::LParen
            }
            ')' => {
                self.cursor.advance();
                TokenKind::RParen
            }
            '[' => {
                self.cursor.advance();
                TokenKind::LBracket
            }
            ']' => {
                self.cursor.advance();
                TokenKind::RBracket
            }
            '{' => {
                self.cursor.advance();
                TokenKind::LBrace
            }
            '}' => {
                self.cursor.advance();
                TokenKind::RBrace
            }

            // Multi-character operators
            '-' => self.lex_minus(),
            '=' => self.lex_equals(),
            '!' => self.lex_bang(),
            '<' => self.lex_less(),
            '>' => self.lex_greater(),

            // String literals, either quote style
            '\'' | '"' => self.lex_string()?,

            // Identifiers and keywords
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier(),

            // Numbers
            c if c.is_ascii_digit() => self.lex_number(),

            // Unknown character: a one-character error span
            c => {
                self.cursor.advance();
                return Err(self.error_here(format!("'{c}'")));
            }
        };

        Ok(self.token(kind))
    }

    /// Skips spaces, tabs, and `#` line comments. Newlines are tokens and
    /// are not skipped, but a comment consumes its terminating newline.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' => self.cursor.advance(),
                '#' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                    // Consume the newline terminating the comment, if any.
                    self.cursor.advance();
                }
                _ => return,
            }
        }
    }

    /// Builds a token spanning from the recorded start to the cursor.
    fn token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.token_span())
    }

    /// The span from the recorded token start to the current position.
    fn token_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    /// An `Illegal Character` error over the current token span.
    fn error_here(&self, details: String) -> FxError {
        FxError::illegal_char(details, self.file, self.token_span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, FileId::DUMMY)
            .tokenize()
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_let_statement() {
        assert_eq!(
            kinds("let foo = 42"),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Ident("foo".into()),
                TokenKind::Eq,
                TokenKind::Int(42),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newline_and_semicolon() {
        assert_eq!(
            kinds("1\n2;3"),
            vec![
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Int(2),
                TokenKind::Newline,
                TokenKind::Int(3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ - * / % ^ = == != < > <= >= ! -> , :"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Caret,
                TokenKind::Eq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Not,
                TokenKind::Arrow,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            kinds("()[]{}"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_skipped() {
        assert_eq!(
            kinds("1 # a comment\n2"),
            vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]
        );
    }

    #[test]
    fn test_comment_at_eof() {
        assert_eq!(kinds("1 # trailing"), vec![TokenKind::Int(1), TokenKind::Eof]);
    }

    #[test]
    fn test_illegal_character() {
        let err = Lexer::new("let $ = 1", FileId::DUMMY)
            .tokenize()
            .unwrap_err();
        assert_eq!(err.details, "'$'");
        assert_eq!(err.span.len(), 1);
        assert_eq!(err.span.column, 5);
    }

    #[test]
    fn test_token_spans_cover_source() {
        let source = "let x = 1 + 2";
        let tokens = Lexer::new(source, FileId::DUMMY).tokenize().unwrap();
        for token in &tokens {
            if token.kind != TokenKind::Eof {
                assert!(token.span.start < token.span.end, "empty span: {token:?}");
                assert!(token.span.end <= source.len());
            }
        }
    }

    #[test]
    fn test_span_lines() {
        let tokens = Lexer::new("1\n  2", FileId::DUMMY).tokenize().unwrap();
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.column, 3);
    }
}
