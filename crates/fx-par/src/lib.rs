//! Recursive-descent parser for the Fx language.
//!
//! The parser consumes the token stream produced by `fx-lex` and builds the
//! AST defined in [`ast`]. It is backed by a token vector and an index, so
//! speculative parses (`return` with an optional value) simply snapshot and
//! restore the index. Errors follow a most-specific-wins discipline: a rule
//! only replaces a sub-rule's error with its own generic message when the
//! sub-rule failed without consuming any tokens.
//!
//! Grammar summary (low to high precedence, left-associative unless noted):
//!
//! ```text
//! statement  := 'return' expr? | 'continue' | 'break' | expr
//! expr       := 'let' IDENT '=' expr | logic
//! logic      := comp ( ('or'|'and') comp )*
//! comp       := '!' comp | arith ( (==|!=|<|>|<=|>=) arith )*
//! arith      := mod ( ('+'|'-') mod )*
//! mod        := term ( '%' term )*
//! term       := factor ( ('*'|'/') factor )*
//! factor     := ('+'|'-') factor | power
//! power      := call ( '^' factor )?          right-assoc
//! call       := atom ( '(' args ')' )?
//! atom       := literal | IDENT | '(' expr ')' | list | dict
//!             | if | for | while | fex | import | from-import
//! ```
//!
//! Nested bodies (`if`/`elif`/`else`/`for`/`while`/`fex` after `:`) run to
//! the keyword `end`; the top level of a program runs to end of input.

pub mod ast;
mod edge_cases;
mod expr;
mod stmt;

pub use ast::{
    BinOp, BinaryExpr, Block, BreakStmt, CallExpr, ContinueStmt, DictLit, Expr, FnBody, FnDef,
    ForLoop, FromImportStmt, IfExpr, ImportStmt, LetBinding, ListLit, Literal, LiteralExpr,
    ReturnStmt, UnOp, UnaryExpr, VarAccess, WhileLoop,
};

use fx_lex::{Keyword, Token, TokenKind};
use fx_util::{FileId, FxError, FxResult, Span};

/// What terminates a statement sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockEnd {
    /// The top level of a program or module: runs to end of input.
    Eof,
    /// A nested body: runs to the keyword `end`, which is consumed.
    End,
}

/// The Fx parser.
///
/// # Example
///
/// ```
/// use fx_lex::Lexer;
/// use fx_par::Parser;
/// use fx_util::FileId;
///
/// let tokens = Lexer::new("let x = 1 + 2", FileId::DUMMY).tokenize().unwrap();
/// let program = Parser::new(tokens, FileId::DUMMY).parse_program().unwrap();
/// assert_eq!(program.statements.len(), 1);
/// ```
pub struct Parser {
    /// Token stream from the lexer, ending with `Eof`.
    tokens: Vec<Token>,

    /// Current position in the token stream.
    position: usize,

    /// File the tokens came from, stamped into every error.
    file: FileId,
}

impl Parser {
    /// Create a new parser from tokens. The stream must end with an `Eof`
    /// token, which [`fx_lex::Lexer::tokenize`] guarantees.
    pub fn new(tokens: Vec<Token>, file: FileId) -> Self {
        let tokens = if tokens.is_empty() {
            vec![Token::new(TokenKind::Eof, Span::DUMMY)]
        } else {
            tokens
        };
        Self {
            tokens,
            position: 0,
            file,
        }
    }

    /// Parse a complete program: statements up to end of input.
    pub fn parse_program(&mut self) -> FxResult<ast::Block> {
        let start = self.current_span();
        let statements = self.statement_list(BlockEnd::Eof)?;
        let span = match statements.last() {
            Some(last) => start.merge(last.span()),
            None => start,
        };
        Ok(ast::Block { statements, span })
    }

    /// Parse a nested body terminated by `end` (consumed).
    pub(crate) fn parse_block(&mut self) -> FxResult<ast::Block> {
        let start = self.current_span();
        let statements = self.statement_list(BlockEnd::End)?;
        let span = match statements.last() {
            Some(last) => start.merge(last.span()),
            None => start,
        };
        Ok(ast::Block { statements, span })
    }

    /// Parse statements until the given terminator. Newlines between
    /// statements are separators; none are required.
    fn statement_list(&mut self, end: BlockEnd) -> FxResult<Vec<Expr>> {
        let mut statements = Vec::new();
        loop {
            while self.eat(&TokenKind::Newline) {}
            match end {
                BlockEnd::Eof => {
                    if self.at_eof() {
                        break;
                    }
                }
                BlockEnd::End => {
                    if self.eat_keyword(Keyword::End) {
                        break;
                    }
                    if self.at_eof() {
                        return Err(self.error("Expected 'end' or expression"));
                    }
                }
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    // =========================================================================
    // Token stream helpers
    // =========================================================================

    /// The current token. Past the end this stays on `Eof`.
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    /// Span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    pub(crate) fn prev_span(&self) -> Span {
        if self.position == 0 {
            self.current_span()
        } else {
            self.tokens[self.position - 1].span
        }
    }

    /// Move to the next token. Saturates at the trailing `Eof`.
    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    /// True when the current token is `Eof`.
    pub(crate) fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    /// Consume the current token if it equals `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.current().kind == *kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is the given keyword.
    pub(crate) fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.current().is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or fail with `message` at the current token.
    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> FxResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    /// Consume the given keyword or fail with `message`.
    pub(crate) fn expect_keyword(&mut self, keyword: Keyword, message: &str) -> FxResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    /// Consume an identifier, returning its name and span.
    pub(crate) fn expect_ident(&mut self, message: &str) -> FxResult<(String, Span)> {
        match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.current_span();
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.error(message)),
        }
    }

    /// An `Invalid Syntax` error anchored at the current token.
    pub(crate) fn error(&self, message: &str) -> FxError {
        FxError::invalid_syntax(message, self.file, self.current_span())
    }

    /// The file being parsed.
    pub(crate) fn file(&self) -> FileId {
        self.file
    }

    /// Current stream position, for speculative parsing.
    pub(crate) fn mark(&self) -> usize {
        self.position
    }

    /// Rewind to a position saved with [`Parser::mark`].
    pub(crate) fn rewind(&mut self, mark: usize) {
        self.position = mark;
    }

    /// The most-specific-error rule: keep `result`'s error if the failing
    /// sub-parse consumed tokens since `mark`, otherwise replace it with
    /// the caller's generic `message`.
    pub(crate) fn or_generic(
        &self,
        result: FxResult<Expr>,
        mark: usize,
        message: &str,
    ) -> FxResult<Expr> {
        match result {
            Err(_) if self.position == mark => Err(self.error(message)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> FxResult<ast::Block> {
        let tokens = fx_lex::Lexer::new(source, FileId::DUMMY).tokenize()?;
        Parser::new(tokens, FileId::DUMMY).parse_program()
    }

    #[test]
    fn test_empty_program() {
        let program = parse("").unwrap();
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_newlines_only() {
        let program = parse("\n\n;\n").unwrap();
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_statements_split_on_newlines() {
        let program = parse("1\n2;3").unwrap();
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn test_program_span_covers_statements() {
        let source = "let a = 1\nlet b = 2";
        let program = parse(source).unwrap();
        assert_eq!(program.span.start, 0);
        assert_eq!(program.span.end, source.len());
    }

    #[test]
    fn test_unclosed_block_reports_missing_end() {
        let err = parse("if 1: 2").unwrap_err();
        assert_eq!(err.details, "Expected 'end' or expression");
    }

    #[test]
    fn test_stray_end_is_error() {
        let err = parse("end").unwrap_err();
        assert!(err.details.starts_with("Expected 'return'"));
    }

    #[test]
    fn test_error_positions_inside_source() {
        let source = "let x = ";
        let err = parse(source).unwrap_err();
        assert!(err.span.start <= source.len());
        assert!(err.span.end <= source.len());
    }
}
