//! Statement parsing: control keywords, block constructs, function
//! definitions, and imports.

use std::rc::Rc;

use fx_lex::{Keyword, TokenKind};
use fx_util::FxResult;

use crate::ast::{
    BreakStmt, ContinueStmt, Expr, FnBody, FnDef, ForLoop, FromImportStmt, IfExpr, ImportStmt,
    ReturnStmt, WhileLoop,
};
use crate::Parser;

impl Parser {
    /// `statement := 'return' expr? | 'continue' | 'break' | expr`
    pub(crate) fn parse_statement(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();

        if self.eat_keyword(Keyword::Return) {
            // The return value is optional: speculatively parse an
            // expression and rewind the token cursor if there is none.
            let mark = self.mark();
            let value = match self.parse_expr() {
                Ok(expr) => Some(Box::new(expr)),
                Err(_) => {
                    self.rewind(mark);
                    None
                }
            };
            let span = match &value {
                Some(expr) => start_span.merge(expr.span()),
                None => start_span,
            };
            return Ok(Expr::Return(ReturnStmt { value, span }));
        }

        if self.eat_keyword(Keyword::Continue) {
            return Ok(Expr::Continue(ContinueStmt { span: start_span }));
        }

        if self.eat_keyword(Keyword::Break) {
            return Ok(Expr::Break(BreakStmt { span: start_span }));
        }

        let mark = self.mark();
        let result = self.parse_expr();
        self.or_generic(
            result,
            mark,
            "Expected 'return', 'continue', 'break', 'let', 'if', 'for', 'while', 'fex', \
             int, float, identifier, '+', '-', '(', '[' or 'not'",
        )
    }

    /// `if := 'if' expr ':' statements ('elif' expr ':' statements)*
    ///        ('else' ':' statements)?`
    ///
    /// Every branch body is its own `end`-terminated block.
    pub(crate) fn parse_if(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // if

        let mut cases = Vec::new();

        let condition = self.parse_expr()?;
        self.expect(TokenKind::Colon, "Expected ':'")?;
        let body = self.parse_block()?;
        cases.push((condition, body));

        loop {
            while self.eat(&TokenKind::Newline) {}
            if !self.eat_keyword(Keyword::Elif) {
                break;
            }
            let condition = self.parse_expr()?;
            self.expect(TokenKind::Colon, "Expected ':'")?;
            let body = self.parse_block()?;
            cases.push((condition, body));
        }

        let else_case = if self.eat_keyword(Keyword::Else) {
            self.expect(TokenKind::Colon, "Expected ':'")?;
            Some(self.parse_block()?)
        } else {
            None
        };

        let span = start_span.merge(self.prev_span());
        Ok(Expr::If(IfExpr {
            cases,
            else_case,
            span,
        }))
    }

    /// `for := 'for' IDENT '=' expr 'to' expr ('step' expr)? ':' statements`
    pub(crate) fn parse_for(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // for

        let (var, var_span) = self.expect_ident("Expected identifier")?;
        self.expect(TokenKind::Eq, "Expected '='")?;
        let start = self.parse_expr()?;
        self.expect_keyword(Keyword::To, "Expected 'to'")?;
        let end = self.parse_expr()?;

        let step = if self.eat_keyword(Keyword::Step) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };

        self.expect(TokenKind::Colon, "Expected ':'")?;
        let body = self.parse_block()?;

        let span = start_span.merge(self.prev_span());
        Ok(Expr::For(ForLoop {
            var,
            var_span,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body,
            span,
        }))
    }

    /// `while := 'while' expr ':' statements`
    pub(crate) fn parse_while(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // while

        let condition = self.parse_expr()?;
        self.expect(TokenKind::Colon, "Expected ':'")?;
        let body = self.parse_block()?;

        let span = start_span.merge(self.prev_span());
        Ok(Expr::While(WhileLoop {
            condition: Box::new(condition),
            body,
            span,
        }))
    }

    /// `func := 'fex' IDENT? '(' (IDENT (',' IDENT)*)? ')'
    ///          ( '->' statement | ':' statements )`
    pub(crate) fn parse_fn_def(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // fex

        let name = match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };

        self.expect(TokenKind::LParen, "Expected '('")?;

        let mut params = Vec::new();
        if let TokenKind::Ident(first) = &self.current().kind {
            params.push(first.clone());
            self.advance();
            while self.eat(&TokenKind::Comma) {
                let (param, _) = self.expect_ident("Expected identifier")?;
                params.push(param);
            }
        }
        self.expect(TokenKind::RParen, "Expected ')' or args")?;

        let body = if self.eat(&TokenKind::Arrow) {
            FnBody::Arrow(self.parse_statement()?)
        } else {
            self.expect(TokenKind::Colon, "Expected ':'")?;
            FnBody::Block(self.parse_block()?)
        };

        let span = start_span.merge(self.prev_span());
        Ok(Expr::FnDef(FnDef {
            name,
            params,
            body: Rc::new(body),
            span,
        }))
    }

    /// `import := 'import' IDENT ('as' IDENT)?`
    pub(crate) fn parse_import(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // import

        let (module, module_span) = self.expect_ident("Expected identifier")?;

        let alias = if self.eat_keyword(Keyword::As) {
            Some(self.expect_ident("Expected identifier")?.0)
        } else {
            None
        };

        let span = start_span.merge(self.prev_span());
        Ok(Expr::Import(ImportStmt {
            module,
            module_span,
            alias,
            span,
        }))
    }

    /// `from-import := 'from' IDENT 'import' IDENT ('as' IDENT)?
    ///                 (',' IDENT ('as' IDENT)?)*`
    pub(crate) fn parse_from_import(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // from

        let (module, module_span) = self.expect_ident("Expected identifier")?;
        self.expect_keyword(Keyword::Import, "Expected 'import'")?;

        let mut names = Vec::new();
        loop {
            let (name, _) = self.expect_ident("Expected identifier")?;
            let alias = if self.eat_keyword(Keyword::As) {
                Some(self.expect_ident("Expected identifier")?.0)
            } else {
                None
            };
            names.push((name, alias));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let span = start_span.merge(self.prev_span());
        Ok(Expr::FromImport(FromImportStmt {
            module,
            module_span,
            names,
            span,
        }))
    }
}
