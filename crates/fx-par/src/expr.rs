//! Expression parsing: the precedence chain, atoms, literals, and calls.

use fx_lex::{Keyword, TokenKind};
use fx_util::{FxError, FxResult};

use crate::ast::{
    BinOp, BinaryExpr, CallExpr, DictLit, Expr, LetBinding, ListLit, Literal, LiteralExpr, UnOp,
    UnaryExpr, VarAccess,
};
use crate::Parser;

/// Names seeded by the host; `let` may not rebind them.
const GLOBAL_NAMES: [&str; 3] = ["Null", "True", "False"];

impl Parser {
    /// `expr := 'let' IDENT '=' expr | logic`
    pub(crate) fn parse_expr(&mut self) -> FxResult<Expr> {
        if self.current().is_keyword(Keyword::Let) {
            return self.parse_let();
        }
        let mark = self.mark();
        let result = self.parse_logic();
        self.or_generic(result, mark, "Expected expression")
    }

    fn parse_let(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // let

        let (name, name_span) = self.expect_ident("Expected identifier")?;
        if GLOBAL_NAMES.contains(&name.as_str()) {
            return Err(FxError::invalid_syntax(
                "Cannot assign to global variable",
                self.file(),
                name_span,
            ));
        }

        self.expect(TokenKind::Eq, "Expected '='")?;

        let mark = self.mark();
        let result = self.parse_expr();
        let value = self.or_generic(result, mark, "Expected expression")?;

        let span = start_span.merge(value.span());
        Ok(Expr::Let(LetBinding {
            name,
            name_span,
            value: Box::new(value),
            span,
        }))
    }

    /// `logic := comp ( ('or'|'and') comp )*`
    ///
    /// `and` and `or` share one precedence level and associate left.
    fn parse_logic(&mut self) -> FxResult<Expr> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = if self.current().is_keyword(Keyword::And) {
                BinOp::And
            } else if self.current().is_keyword(Keyword::Or) {
                BinOp::Or
            } else {
                return Ok(lhs);
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// `comp := '!' comp | arith ( (==|!=|<|>|<=|>=) arith )*`
    fn parse_comparison(&mut self) -> FxResult<Expr> {
        if self.current().kind == TokenKind::Not {
            let op_span = self.current_span();
            self.advance();
            let operand = self.parse_comparison()?;
            let span = op_span.merge(operand.span());
            return Ok(Expr::Unary(UnaryExpr {
                op: UnOp::Not,
                operand: Box::new(operand),
                span,
            }));
        }

        let mark = self.mark();
        let result = (|| -> FxResult<Expr> {
            let mut lhs = self.parse_arith()?;
            loop {
                let op = match self.current().kind {
                    TokenKind::EqEq => BinOp::Eq,
                    TokenKind::NotEq => BinOp::Ne,
                    TokenKind::Lt => BinOp::Lt,
                    TokenKind::Gt => BinOp::Gt,
                    TokenKind::LtEq => BinOp::LtEq,
                    TokenKind::GtEq => BinOp::GtEq,
                    _ => return Ok(lhs),
                };
                self.advance();
                let rhs = self.parse_arith()?;
                lhs = binary(op, lhs, rhs);
            }
        })();
        self.or_generic(result, mark, "Expected expression")
    }

    /// `arith := mod ( ('+'|'-') mod )*`
    fn parse_arith(&mut self) -> FxResult<Expr> {
        let mut lhs = self.parse_mod()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_mod()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// `mod := term ( '%' term )*`
    fn parse_mod(&mut self) -> FxResult<Expr> {
        let mut lhs = self.parse_term()?;
        while self.eat(&TokenKind::Percent) {
            let rhs = self.parse_term()?;
            lhs = binary(BinOp::Mod, lhs, rhs);
        }
        Ok(lhs)
    }

    /// `term := factor ( ('*'|'/') factor )*`
    fn parse_term(&mut self) -> FxResult<Expr> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_factor()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// `factor := ('+'|'-') factor | power`
    ///
    /// Unary sign sits above `power`, so `-2 ^ 2` is `-(2 ^ 2)`.
    fn parse_factor(&mut self) -> FxResult<Expr> {
        let op = match self.current().kind {
            TokenKind::Plus => UnOp::Pos,
            TokenKind::Minus => UnOp::Neg,
            _ => return self.parse_power(),
        };
        let op_span = self.current_span();
        self.advance();
        let operand = self.parse_factor()?;
        let span = op_span.merge(operand.span());
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            span,
        }))
    }

    /// `power := call ( '^' factor )?` — right-associative because the
    /// right-hand side re-enters `factor`.
    fn parse_power(&mut self) -> FxResult<Expr> {
        let base = self.parse_call()?;
        if self.eat(&TokenKind::Caret) {
            let exponent = self.parse_factor()?;
            return Ok(binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    /// `call := atom ( '(' (expr (',' expr)*)? ')' )?`
    fn parse_call(&mut self) -> FxResult<Expr> {
        let callee = self.parse_atom()?;

        if !self.eat(&TokenKind::LParen) {
            return Ok(callee);
        }

        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            let mark = self.mark();
            let result = self.parse_expr();
            args.push(self.or_generic(result, mark, "Expected ')', or expression")?);

            while self.eat(&TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }

            self.expect(TokenKind::RParen, "Expected ',' or ')'")?;
        }

        let span = callee.span().merge(self.prev_span());
        Ok(Expr::Call(CallExpr {
            callee: Box::new(callee),
            args,
            span,
        }))
    }

    /// `atom := literal | IDENT | '(' expr ')' | list | dict | if | for
    ///        | while | fex | import | from-import`
    fn parse_atom(&mut self) -> FxResult<Expr> {
        let span = self.current_span();
        match &self.current().kind {
            TokenKind::Int(value) => {
                let value = *value;
                self.advance();
                Ok(literal(Literal::Int(value), span))
            }
            TokenKind::Float(value) => {
                let value = *value;
                self.advance();
                Ok(literal(Literal::Float(value), span))
            }
            TokenKind::Str(value) => {
                let value = value.clone();
                self.advance();
                Ok(literal(Literal::Str(value), span))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                // The boolean constants are literals; everything else,
                // including Null, resolves through the symbol table.
                match name.as_str() {
                    "True" => Ok(literal(Literal::Bool(true), span)),
                    "False" => Ok(literal(Literal::Bool(false), span)),
                    _ => Ok(Expr::Var(VarAccess { name, span })),
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "Expected ')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_dict(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Fex) => self.parse_fn_def(),
            TokenKind::Keyword(Keyword::Import) => self.parse_import(),
            TokenKind::Keyword(Keyword::From) => self.parse_from_import(),
            _ => Err(self.error("Expected int, float, identifier, '(', '[' or '{'")),
        }
    }

    /// `list := '[' (expr (',' expr)*)? ']'`
    fn parse_list(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // [

        let mut elements = Vec::new();
        if !self.eat(&TokenKind::RBracket) {
            elements.push(self.parse_expr()?);
            while self.eat(&TokenKind::Comma) {
                elements.push(self.parse_expr()?);
            }
            self.expect(TokenKind::RBracket, "Expected ',' or ']'")?;
        }

        let span = start_span.merge(self.prev_span());
        Ok(Expr::List(ListLit { elements, span }))
    }

    /// `dict := '{' (expr ':' expr (',' expr ':' expr)*)? '}'`
    fn parse_dict(&mut self) -> FxResult<Expr> {
        let start_span = self.current_span();
        self.advance(); // {

        let mut pairs = Vec::new();
        if !self.eat(&TokenKind::RBrace) {
            loop {
                let key = self.parse_expr()?;
                self.expect(TokenKind::Colon, "Expected ':'")?;
                let value = self.parse_expr()?;
                pairs.push((key, value));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace, "Expected ',' or '}'")?;
        }

        let span = start_span.merge(self.prev_span());
        Ok(Expr::Dict(DictLit { pairs, span }))
    }
}

fn literal(value: Literal, span: fx_util::Span) -> Expr {
    Expr::Literal(LiteralExpr { value, span })
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = lhs.span().merge(rhs.span());
    Expr::Binary(BinaryExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span,
    })
}

#[cfg(test)]
mod tests {
    use fx_util::FileId;

    use super::*;

    fn parse_one(source: &str) -> Expr {
        let tokens = fx_lex::Lexer::new(source, FileId::DUMMY)
            .tokenize()
            .expect(source);
        let mut parser = Parser::new(tokens, FileId::DUMMY);
        let mut program = parser.parse_program().expect(source);
        assert_eq!(program.statements.len(), 1, "want one statement: {source}");
        program.statements.remove(0)
    }

    fn parse_err(source: &str) -> FxError {
        let tokens = fx_lex::Lexer::new(source, FileId::DUMMY)
            .tokenize()
            .expect(source);
        Parser::new(tokens, FileId::DUMMY)
            .parse_program()
            .unwrap_err()
    }

    fn as_binary(expr: &Expr) -> &BinaryExpr {
        match expr {
            Expr::Binary(b) => b,
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_int_literal() {
        let expr = parse_one("42");
        assert!(matches!(
            expr,
            Expr::Literal(LiteralExpr {
                value: Literal::Int(42),
                ..
            })
        ));
    }

    #[test]
    fn test_bool_literals() {
        assert!(matches!(
            parse_one("True"),
            Expr::Literal(LiteralExpr {
                value: Literal::Bool(true),
                ..
            })
        ));
        assert!(matches!(
            parse_one("False"),
            Expr::Literal(LiteralExpr {
                value: Literal::Bool(false),
                ..
            })
        ));
    }

    #[test]
    fn test_null_is_a_variable() {
        assert!(matches!(parse_one("Null"), Expr::Var(_)));
    }

    #[test]
    fn test_precedence_mul_over_add() {
        // 2 + 3 * 4 => 2 + (3 * 4)
        let expr = parse_one("2 + 3 * 4");
        let add = as_binary(&expr);
        assert_eq!(add.op, BinOp::Add);
        assert_eq!(as_binary(&add.rhs).op, BinOp::Mul);
    }

    #[test]
    fn test_left_associativity() {
        // 10 - 2 - 3 => (10 - 2) - 3
        let expr = parse_one("10 - 2 - 3");
        let outer = as_binary(&expr);
        assert_eq!(outer.op, BinOp::Sub);
        assert_eq!(as_binary(&outer.lhs).op, BinOp::Sub);
    }

    #[test]
    fn test_power_right_associative() {
        // 2 ^ 3 ^ 2 => 2 ^ (3 ^ 2)
        let expr = parse_one("2 ^ 3 ^ 2");
        let outer = as_binary(&expr);
        assert_eq!(outer.op, BinOp::Pow);
        assert_eq!(as_binary(&outer.rhs).op, BinOp::Pow);
    }

    #[test]
    fn test_unary_minus_binds_above_power() {
        // -2 ^ 2 => -(2 ^ 2)
        let expr = parse_one("-2 ^ 2");
        match expr {
            Expr::Unary(u) => {
                assert_eq!(u.op, UnOp::Neg);
                assert_eq!(as_binary(&u.operand).op, BinOp::Pow);
            }
            other => panic!("expected unary, got {other:?}"),
        }
    }

    #[test]
    fn test_mod_binds_looser_than_mul() {
        // 7 % 2 * 3 => 7 % (2 * 3)
        let expr = parse_one("7 % 2 * 3");
        let outer = as_binary(&expr);
        assert_eq!(outer.op, BinOp::Mod);
        assert_eq!(as_binary(&outer.rhs).op, BinOp::Mul);
    }

    #[test]
    fn test_parens_override() {
        let expr = parse_one("(2 + 3) * 4");
        let mul = as_binary(&expr);
        assert_eq!(mul.op, BinOp::Mul);
        assert_eq!(as_binary(&mul.lhs).op, BinOp::Add);
    }

    #[test]
    fn test_comparison_chain() {
        let expr = parse_one("1 < 2 == True");
        let outer = as_binary(&expr);
        assert_eq!(outer.op, BinOp::Eq);
        assert_eq!(as_binary(&outer.lhs).op, BinOp::Lt);
    }

    #[test]
    fn test_and_or_same_level() {
        // a or b and c => (a or b) and c
        let expr = parse_one("a or b and c");
        let outer = as_binary(&expr);
        assert_eq!(outer.op, BinOp::And);
        assert_eq!(as_binary(&outer.lhs).op, BinOp::Or);
    }

    #[test]
    fn test_not_operator() {
        let expr = parse_one("!x");
        assert!(matches!(
            expr,
            Expr::Unary(UnaryExpr { op: UnOp::Not, .. })
        ));
    }

    #[test]
    fn test_let_binding() {
        let expr = parse_one("let x = 1 + 2");
        match expr {
            Expr::Let(binding) => {
                assert_eq!(binding.name, "x");
                assert_eq!(as_binary(&binding.value).op, BinOp::Add);
            }
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn test_let_rejects_globals() {
        for name in ["Null", "True", "False"] {
            let err = parse_err(&format!("let {name} = 1"));
            assert_eq!(err.details, "Cannot assign to global variable");
        }
    }

    #[test]
    fn test_let_requires_eq() {
        assert_eq!(parse_err("let x 1").details, "Expected '='");
        assert_eq!(parse_err("let 1 = 2").details, "Expected identifier");
    }

    #[test]
    fn test_call_with_args() {
        let expr = parse_one("f(1, 2, 3)");
        match expr {
            Expr::Call(call) => {
                assert!(matches!(*call.callee, Expr::Var(_)));
                assert_eq!(call.args.len(), 3);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_call_no_args() {
        let expr = parse_one("f()");
        assert!(matches!(expr, Expr::Call(CallExpr { ref args, .. }) if args.is_empty()));
    }

    #[test]
    fn test_call_missing_paren() {
        assert_eq!(parse_err("f(1, 2").details, "Expected ',' or ')'");
    }

    #[test]
    fn test_list_literal() {
        let expr = parse_one("[1, 2, 3]");
        assert!(matches!(expr, Expr::List(ListLit { ref elements, .. }) if elements.len() == 3));
        let expr = parse_one("[]");
        assert!(matches!(expr, Expr::List(ListLit { ref elements, .. }) if elements.is_empty()));
    }

    #[test]
    fn test_list_missing_bracket() {
        assert_eq!(parse_err("[1, 2").details, "Expected ',' or ']'");
    }

    #[test]
    fn test_dict_literal() {
        let expr = parse_one("{\"a\": 1, 2: \"b\"}");
        assert!(matches!(expr, Expr::Dict(DictLit { ref pairs, .. }) if pairs.len() == 2));
        let expr = parse_one("{}");
        assert!(matches!(expr, Expr::Dict(DictLit { ref pairs, .. }) if pairs.is_empty()));
    }

    #[test]
    fn test_dict_missing_colon() {
        assert_eq!(parse_err("{1 2}").details, "Expected ':'");
    }

    #[test]
    fn test_dotted_name_access() {
        let expr = parse_one("math.abs(1)");
        match expr {
            Expr::Call(call) => match *call.callee {
                Expr::Var(ref var) => assert_eq!(var.name, "math.abs"),
                ref other => panic!("expected var, got {other:?}"),
            },
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_deep_error_wins() {
        // The sub-parse consumed "1 +" before failing, so the deepest
        // message survives instead of a generic wrapper.
        let err = parse_err("(1 +");
        assert_eq!(err.details, "Expected int, float, identifier, '(', '[' or '{'");
    }

    #[test]
    fn test_generic_error_when_nothing_consumed() {
        // Here the inner expression fails on its first token, so the
        // wrapping rule's message is used.
        let err = parse_err("let x = (");
        assert_eq!(err.details, "Expected expression");
    }

    #[test]
    fn test_spans_merge() {
        let expr = parse_one("1 + 23");
        assert_eq!(expr.span().start, 0);
        assert_eq!(expr.span().end, 6);
    }
}
