//! Number literal lexing.

use crate::lexer::Lexer;
use crate::token::TokenKind;

impl<'a> Lexer<'a> {
    /// Lexes an integer or floating-point literal.
    ///
    /// The literal is the longest run of digits containing at most one `.`;
    /// a second `.` terminates the token. No sign is consumed here, unary
    /// sign is the parser's business.
    pub(super) fn lex_number(&mut self) -> TokenKind {
        let start = self.token_start;
        let mut saw_dot = false;

        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_digit() {
                self.cursor.advance();
            } else if c == '.' && !saw_dot {
                saw_dot = true;
                self.cursor.advance();
            } else {
                break;
            }
        }

        let text = self.cursor.slice_from(start);
        if saw_dot {
            // A digit run with one dot always parses as f64.
            TokenKind::Float(text.parse().unwrap_or(0.0))
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                // Too large for an integer: keep the value as a float.
                Err(_) => TokenKind::Float(text.parse().unwrap_or(0.0)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use fx_util::FileId;

    use crate::lexer::Lexer;
    use crate::token::TokenKind;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, FileId::DUMMY)
            .tokenize()
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_int() {
        assert_eq!(kinds("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(kinds("0"), vec![TokenKind::Int(0), TokenKind::Eof]);
    }

    #[test]
    fn test_float() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
        assert_eq!(kinds("0.5"), vec![TokenKind::Float(0.5), TokenKind::Eof]);
    }

    #[test]
    fn test_trailing_dot_is_float() {
        assert_eq!(kinds("123."), vec![TokenKind::Float(123.0), TokenKind::Eof]);
    }

    #[test]
    fn test_second_dot_terminates() {
        // "1.2.3" lexes as the float 1.2 followed by a stray '.' which is
        // an illegal character.
        let err = Lexer::new("1.2.3", FileId::DUMMY).tokenize().unwrap_err();
        assert_eq!(err.details, "'.'");
    }

    #[test]
    fn test_huge_integer_degrades_to_float() {
        let tokens = kinds("99999999999999999999999999");
        assert!(matches!(tokens[0], TokenKind::Float(_)));
    }

    #[test]
    fn test_no_sign_lexed() {
        assert_eq!(
            kinds("-7"),
            vec![TokenKind::Minus, TokenKind::Int(7), TokenKind::Eof]
        );
    }
}
