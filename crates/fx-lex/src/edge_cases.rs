//! Edge case tests for fx-lex

#[cfg(test)]
mod tests {
    use fx_util::FileId;

    use crate::{Keyword, Lexer, Token, TokenKind};

    fn lex_all(source: &str) -> Vec<Token> {
        Lexer::new(source, FileId::DUMMY).tokenize().expect(source)
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_whitespace_only() {
        let tokens = lex_all("   \t  ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_edge_long_identifier() {
        let name = "a".repeat(10_000);
        let tokens = lex_all(&format!("let {name} = 1"));
        assert_eq!(tokens[1].kind, TokenKind::Ident(name));
    }

    #[test]
    fn test_edge_many_newlines() {
        let tokens = lex_all("\n\n\n;\n");
        let newlines = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Newline)
            .count();
        assert_eq!(newlines, 5);
    }

    #[test]
    fn test_edge_comment_only() {
        assert_eq!(lex_all("# nothing here").len(), 1);
    }

    #[test]
    fn test_edge_comment_swallows_newline() {
        let tokens = lex_all("1 # note\n2");
        assert_eq!(
            tokens.iter().map(|t| &t.kind).collect::<Vec<_>>(),
            vec![&TokenKind::Int(1), &TokenKind::Int(2), &TokenKind::Eof]
        );
    }

    #[test]
    fn test_edge_adjacent_operators() {
        let tokens = lex_all("1+-2");
        assert_eq!(tokens[1].kind, TokenKind::Plus);
        assert_eq!(tokens[2].kind, TokenKind::Minus);
    }

    #[test]
    fn test_edge_arrow_inside_expression() {
        let tokens = lex_all("fex f(x)->x");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Arrow));
        assert!(tokens[0].is_keyword(Keyword::Fex));
    }

    #[test]
    fn test_edge_empty_string_literal() {
        let tokens = lex_all("\"\"");
        assert_eq!(tokens[0].kind, TokenKind::Str(String::new()));
    }

    #[test]
    fn test_edge_string_with_newline_escape_only() {
        let tokens = lex_all("'\\n'");
        assert_eq!(tokens[0].kind, TokenKind::Str("\n".into()));
    }

    #[test]
    fn test_edge_unicode_in_string() {
        let tokens = lex_all("\"héllo ∆\"");
        assert_eq!(tokens[0].kind, TokenKind::Str("héllo ∆".into()));
    }

    #[test]
    fn test_edge_unicode_identifier_rejected() {
        let err = Lexer::new("héllo", FileId::DUMMY).tokenize().unwrap_err();
        assert_eq!(err.details, "'é'");
    }

    #[test]
    fn test_edge_error_column_after_tab() {
        let err = Lexer::new("\t$", FileId::DUMMY).tokenize().unwrap_err();
        assert_eq!(err.span.column, 2);
    }

    #[test]
    fn test_edge_crlf_line_endings() {
        let tokens = lex_all("1\r\n2");
        assert_eq!(
            tokens.iter().map(|t| &t.kind).collect::<Vec<_>>(),
            vec![
                &TokenKind::Int(1),
                &TokenKind::Newline,
                &TokenKind::Int(2),
                &TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_edge_deeply_nested_delimiters() {
        let source = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        let tokens = lex_all(&source);
        assert_eq!(tokens.len(), 1002);
    }

    #[test]
    fn test_edge_float_and_field_like_dot() {
        // A dot directly after a number run belongs to the number.
        let tokens = lex_all("1. 2");
        assert_eq!(tokens[0].kind, TokenKind::Float(1.0));
        assert_eq!(tokens[1].kind, TokenKind::Int(2));
    }

    // ==================== PROPERTY TESTS ====================

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Lexing arbitrary input either succeeds or reports an error;
            /// it never panics.
            #[test]
            fn lexing_never_panics(source in ".{0,200}") {
                let _ = Lexer::new(&source, FileId::DUMMY).tokenize();
            }

            /// Token spans are in bounds, ordered, and non-overlapping.
            #[test]
            fn spans_are_ordered(source in "[a-z0-9 +*/()=<>,:\\[\\]\n]{0,120}") {
                if let Ok(tokens) = Lexer::new(&source, FileId::DUMMY).tokenize() {
                    let mut last_end = 0;
                    for token in &tokens {
                        prop_assert!(token.span.start >= last_end);
                        prop_assert!(token.span.end <= source.len());
                        last_end = token.span.end;
                    }
                }
            }

            /// The text between token spans is only whitespace or comments.
            #[test]
            fn gaps_are_insignificant(source in "[a-z0-9 +\\-*/()=\n]{0,120}") {
                if let Ok(tokens) = Lexer::new(&source, FileId::DUMMY).tokenize() {
                    let mut last_end = 0;
                    for token in &tokens {
                        let gap = &source[last_end..token.span.start];
                        prop_assert!(
                            gap.chars().all(|c| c == ' ' || c == '\t' || c == '\r'),
                            "unexpected gap {gap:?}"
                        );
                        last_end = token.span.end;
                    }
                }
            }
        }
    }
}
