//! The tree-walking evaluator.
//!
//! One `eval` arm per AST node. Every arm returns [`RunResult`]; the
//! `eval_value!` macro unwraps ordinary values and forwards returns, loop
//! control, and errors to the caller, which is how non-local exits travel
//! without host exceptions.

use std::rc::Rc;

use rand::Rng;

use fx_lex::Lexer;
use fx_par::ast::{
    BinOp, BinaryExpr, Block, CallExpr, DictLit, Expr, FnBody, ForLoop, IfExpr, ListLit, Literal,
    UnOp, UnaryExpr, WhileLoop,
};
use fx_par::Parser;
use fx_util::{FileId, FxError, FxResult, SourceMap, Span};

use crate::builtins::Builtin;
use crate::flow::{eval_value, Flow, RunResult};
use crate::io::Host;
use crate::modules::ModuleCache;
use crate::scope::{Context, ScopeRef, SymbolTable};
use crate::value::{dict_key, Function, Num, OpError, Value};

/// Guard against runaway recursion blowing the host stack.
const MAX_CALL_DEPTH: usize = 1000;

/// The Fx evaluator.
///
/// Holds mutable references to the session-owned source map and module
/// cache (both grow during evaluation) and the host the builtins talk to.
pub struct Interpreter<'a> {
    pub(crate) sources: &'a mut SourceMap,
    pub(crate) modules: &'a mut ModuleCache,
    host: &'a mut dyn Host,
    loop_depth: usize,
    call_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        sources: &'a mut SourceMap,
        modules: &'a mut ModuleCache,
        host: &'a mut dyn Host,
    ) -> Self {
        Self {
            sources,
            modules,
            host,
            loop_depth: 0,
            call_depth: 0,
        }
    }

    /// Run a complete program in the given global scope and produce its
    /// value (the last top-level statement's value).
    pub fn run(&mut self, name: &str, text: &str, globals: ScopeRef) -> FxResult<Value> {
        let ctx = Context::program(globals);
        self.exec_source(name, text, &ctx)
    }

    /// Lex, parse, and evaluate source text in an existing context. Used by
    /// [`Interpreter::run`], the module loader, and the `eval` builtin.
    pub(crate) fn exec_source(
        &mut self,
        name: &str,
        text: &str,
        ctx: &Rc<Context>,
    ) -> FxResult<Value> {
        tracing::debug!(source = name, "evaluating");
        let file = self.sources.add_file(name, text);
        let tokens = Lexer::new(text, file).tokenize()?;
        let program = Parser::new(tokens, file).parse_program()?;
        match self.eval_block(&program, file, ctx)? {
            Flow::Value(value) | Flow::Return(value) => Ok(value),
            // break/continue are rejected at their own sites, so a loose
            // loop signal cannot reach the top; yield Null if one ever does.
            Flow::Break | Flow::Continue => Ok(Value::Null),
        }
    }

    /// A runtime error at `span`, carrying the current call stack.
    pub(crate) fn rt_error(
        &self,
        details: impl Into<String>,
        file: FileId,
        span: Span,
        ctx: &Rc<Context>,
    ) -> FxError {
        FxError::runtime(details, file, span).with_trace(ctx.traceback(file, span.line))
    }

    fn op_error(&self, err: OpError, file: FileId, span: Span, ctx: &Rc<Context>) -> FxError {
        self.rt_error(err.0, file, span, ctx)
    }

    // =========================================================================
    // Visitors
    // =========================================================================

    fn eval(&mut self, expr: &Expr, file: FileId, ctx: &Rc<Context>) -> RunResult {
        match expr {
            Expr::Literal(node) => Ok(Flow::Value(match &node.value {
                Literal::Int(v) => Value::Number(Num::Int(*v)),
                Literal::Float(v) => Value::Number(Num::Float(*v)),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
            })),

            Expr::Var(node) => match ctx.table.borrow().get(&node.name) {
                Some(value) => Ok(Flow::Value(value)),
                None => Err(self.rt_error(
                    format!("'{}' is not defined", node.name),
                    file,
                    node.span,
                    ctx,
                )),
            },

            Expr::Let(node) => {
                let value = eval_value!(self.eval(&node.value, file, ctx));
                ctx.table.borrow_mut().set(node.name.clone(), value.clone());
                Ok(Flow::Value(value))
            }

            Expr::Unary(node) => self.eval_unary(node, file, ctx),
            Expr::Binary(node) => self.eval_binary(node, file, ctx),
            Expr::List(node) => self.eval_list(node, file, ctx),
            Expr::Dict(node) => self.eval_dict(node, file, ctx),
            Expr::Block(node) => self.eval_block(node, file, ctx),
            Expr::If(node) => self.eval_if(node, file, ctx),
            Expr::For(node) => self.eval_for(node, file, ctx),
            Expr::While(node) => self.eval_while(node, file, ctx),

            Expr::Break(node) => {
                if self.loop_depth == 0 {
                    return Err(self.rt_error("'break' outside of a loop", file, node.span, ctx));
                }
                Ok(Flow::Break)
            }

            Expr::Continue(node) => {
                if self.loop_depth == 0 {
                    return Err(self.rt_error(
                        "'continue' outside of a loop",
                        file,
                        node.span,
                        ctx,
                    ));
                }
                Ok(Flow::Continue)
            }

            Expr::Return(node) => {
                let value = match &node.value {
                    Some(expr) => eval_value!(self.eval(expr, file, ctx)),
                    None => Value::Number(Num::Int(0)),
                };
                Ok(Flow::Return(value))
            }

            Expr::FnDef(node) => {
                let func = Value::Function(Rc::new(Function {
                    name: node.name.clone(),
                    params: node.params.clone(),
                    body: Rc::clone(&node.body),
                    context: Rc::clone(ctx),
                    file,
                }));
                if let Some(name) = &node.name {
                    ctx.table.borrow_mut().set(name.clone(), func.clone());
                }
                Ok(Flow::Value(func))
            }

            Expr::Call(node) => self.eval_call(node, file, ctx),
            Expr::Import(node) => self.eval_import(node, file, ctx),
            Expr::FromImport(node) => self.eval_from_import(node, file, ctx),
        }
    }

    /// Evaluate a statement sequence; its value is the last statement's.
    pub(crate) fn eval_block(&mut self, block: &Block, file: FileId, ctx: &Rc<Context>) -> RunResult {
        let mut last = Value::Null;
        for statement in &block.statements {
            last = eval_value!(self.eval(statement, file, ctx));
        }
        Ok(Flow::Value(last))
    }

    fn eval_unary(&mut self, node: &UnaryExpr, file: FileId, ctx: &Rc<Context>) -> RunResult {
        let value = eval_value!(self.eval(&node.operand, file, ctx));
        let result = match node.op {
            UnOp::Neg => value.mul(&Value::Number(Num::Int(-1))),
            UnOp::Pos => Ok(value),
            UnOp::Not => Ok(value.not_op()),
        };
        result
            .map(Flow::Value)
            .map_err(|err| self.op_error(err, file, node.span, ctx))
    }

    fn eval_binary(&mut self, node: &BinaryExpr, file: FileId, ctx: &Rc<Context>) -> RunResult {
        let lhs = eval_value!(self.eval(&node.lhs, file, ctx));
        let rhs = eval_value!(self.eval(&node.rhs, file, ctx));

        let result = match node.op {
            BinOp::Add => lhs.add(&rhs),
            BinOp::Sub => lhs.sub(&rhs),
            BinOp::Mul => lhs.mul(&rhs),
            BinOp::Div => lhs.div(&rhs),
            BinOp::Mod => lhs.rem(&rhs),
            BinOp::Pow => lhs.pow(&rhs),
            BinOp::Eq => lhs.eq_op(&rhs),
            BinOp::Ne => lhs.ne_op(&rhs),
            BinOp::Lt => lhs.lt_op(&rhs),
            BinOp::Gt => lhs.gt_op(&rhs),
            BinOp::LtEq => lhs.le_op(&rhs),
            BinOp::GtEq => lhs.ge_op(&rhs),
            BinOp::And => lhs.and_op(&rhs),
            BinOp::Or => lhs.or_op(&rhs),
        };
        result
            .map(Flow::Value)
            .map_err(|err| self.op_error(err, file, node.span, ctx))
    }

    fn eval_list(&mut self, node: &ListLit, file: FileId, ctx: &Rc<Context>) -> RunResult {
        let mut elements = Vec::with_capacity(node.elements.len());
        for element in &node.elements {
            elements.push(eval_value!(self.eval(element, file, ctx)));
        }
        Ok(Flow::Value(Value::List(elements)))
    }

    fn eval_dict(&mut self, node: &DictLit, file: FileId, ctx: &Rc<Context>) -> RunResult {
        let mut map = indexmap::IndexMap::with_capacity(node.pairs.len());
        for (key_expr, value_expr) in &node.pairs {
            let key_value = eval_value!(self.eval(key_expr, file, ctx));
            let key = dict_key(&key_value)
                .map_err(|err| self.op_error(err, file, key_expr.span(), ctx))?;
            let value = eval_value!(self.eval(value_expr, file, ctx));
            map.insert(key, value);
        }
        Ok(Flow::Value(Value::Dict(map)))
    }

    fn eval_if(&mut self, node: &IfExpr, file: FileId, ctx: &Rc<Context>) -> RunResult {
        for (condition, body) in &node.cases {
            let value = eval_value!(self.eval(condition, file, ctx));
            if value.is_true() {
                return self.eval_block(body, file, ctx);
            }
        }
        match &node.else_case {
            Some(body) => self.eval_block(body, file, ctx),
            None => Ok(Flow::Value(Value::Null)),
        }
    }

    fn eval_for(&mut self, node: &ForLoop, file: FileId, ctx: &Rc<Context>) -> RunResult {
        let start = eval_value!(self.eval(&node.start, file, ctx));
        let Value::Number(start) = start else {
            return Err(self.rt_error("'for' bounds must be numbers", file, node.start.span(), ctx));
        };
        let end = eval_value!(self.eval(&node.end, file, ctx));
        let Value::Number(end) = end else {
            return Err(self.rt_error("'for' bounds must be numbers", file, node.end.span(), ctx));
        };
        let step = match &node.step {
            Some(expr) => {
                let value = eval_value!(self.eval(expr, file, ctx));
                let Value::Number(step) = value else {
                    return Err(self.rt_error("'for' bounds must be numbers", file, expr.span(), ctx));
                };
                step
            }
            None => Num::Int(1),
        };

        if step.is_zero() {
            return Err(self.rt_error("Step value cannot be zero", file, node.span, ctx));
        }

        self.loop_depth += 1;
        let result = self.run_for_body(node, start, end, step, file, ctx);
        self.loop_depth -= 1;
        result
    }

    fn run_for_body(
        &mut self,
        node: &ForLoop,
        start: Num,
        end: Num,
        step: Num,
        file: FileId,
        ctx: &Rc<Context>,
    ) -> RunResult {
        let ascending = step.as_f64() > 0.0;
        let mut i = start;

        loop {
            let proceed = if ascending {
                i.as_f64() <= end.as_f64()
            } else {
                i.as_f64() >= end.as_f64()
            };
            if !proceed {
                break;
            }

            // The loop variable lands in the enclosing table and stays
            // bound after the loop finishes.
            ctx.table
                .borrow_mut()
                .set(node.var.clone(), Value::Number(i));
            i = i.add(step);

            match self.eval_block(&node.body, file, ctx)? {
                Flow::Value(_) | Flow::Continue => {}
                Flow::Break => break,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }

        Ok(Flow::Value(Value::Null))
    }

    fn eval_while(&mut self, node: &WhileLoop, file: FileId, ctx: &Rc<Context>) -> RunResult {
        self.loop_depth += 1;
        let result = self.run_while_body(node, file, ctx);
        self.loop_depth -= 1;
        result
    }

    fn run_while_body(&mut self, node: &WhileLoop, file: FileId, ctx: &Rc<Context>) -> RunResult {
        loop {
            let condition = eval_value!(self.eval(&node.condition, file, ctx));
            if !condition.is_true() {
                break;
            }
            match self.eval_block(&node.body, file, ctx)? {
                Flow::Value(_) | Flow::Continue => {}
                Flow::Break => break,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Value(Value::Null))
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn eval_call(&mut self, node: &CallExpr, file: FileId, ctx: &Rc<Context>) -> RunResult {
        let callee = eval_value!(self.eval(&node.callee, file, ctx));

        let mut args = Vec::with_capacity(node.args.len());
        for arg in &node.args {
            args.push(eval_value!(self.eval(arg, file, ctx)));
        }

        match callee {
            Value::Function(func) => self
                .call_function(&func, args, file, node.span, ctx)
                .map(Flow::Value),
            Value::Builtin(builtin) => self
                .call_builtin(builtin, args, file, node.span, ctx)
                .map(Flow::Value),
            other => Err(self.rt_error(
                format!("'{}' is not a function", other.display()),
                file,
                node.callee.span(),
                ctx,
            )),
        }
    }

    fn check_arity(
        &self,
        got: usize,
        want: usize,
        name: &str,
        file: FileId,
        span: Span,
        ctx: &Rc<Context>,
    ) -> FxResult<()> {
        if got > want {
            return Err(self.rt_error(
                format!("{} too many args passed into '{name}'", got - want),
                file,
                span,
                ctx,
            ));
        }
        if got < want {
            return Err(self.rt_error(
                format!("{} too few args passed into '{name}'", want - got),
                file,
                span,
                ctx,
            ));
        }
        Ok(())
    }

    fn call_function(
        &mut self,
        func: &Function,
        args: Vec<Value>,
        file: FileId,
        span: Span,
        caller: &Rc<Context>,
    ) -> FxResult<Value> {
        self.check_arity(
            args.len(),
            func.params.len(),
            func.display_name(),
            file,
            span,
            caller,
        )?;
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(self.rt_error("Maximum call depth exceeded", file, span, caller));
        }

        // The new frame chains onto the function's captured definition
        // context, not the caller's: lexical scoping.
        let table = SymbolTable::with_parent(Rc::clone(&func.context.table)).into_ref();
        {
            let mut table = table.borrow_mut();
            for (param, arg) in func.params.iter().zip(args) {
                table.set(param.clone(), arg);
            }
        }
        let ctx = Context::child(
            func.display_name().to_string(),
            &func.context,
            (file, span.line),
            table,
        );

        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.call_depth += 1;

        let outcome = match &*func.body {
            // Arrow form auto-returns its expression's value.
            FnBody::Arrow(expr) => match self.eval(expr, func.file, &ctx) {
                Ok(Flow::Value(value) | Flow::Return(value)) => Ok(value),
                Ok(Flow::Break | Flow::Continue) => Ok(Value::Null),
                Err(err) => Err(err),
            },
            // Block form yields whatever `return` supplied, or 0 when
            // control falls off the end.
            FnBody::Block(block) => match self.eval_block(block, func.file, &ctx) {
                Ok(Flow::Return(value)) => Ok(value),
                Ok(_) => Ok(Value::Number(Num::Int(0))),
                Err(err) => Err(err),
            },
        };

        self.call_depth -= 1;
        self.loop_depth = saved_loop_depth;
        outcome
    }

    // =========================================================================
    // Builtins
    // =========================================================================

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        file: FileId,
        span: Span,
        ctx: &Rc<Context>,
    ) -> FxResult<Value> {
        self.check_arity(
            args.len(),
            builtin.params().len(),
            builtin.name(),
            file,
            span,
            ctx,
        )?;

        match builtin {
            Builtin::Print => {
                self.host.write(&one(args).display());
                Ok(Value::Null)
            }

            Builtin::Input => Ok(Value::Str(self.host.read_line())),

            Builtin::Clear => {
                self.host.clear_screen();
                Ok(Value::Null)
            }

            Builtin::Type => Ok(Value::Str(one(args).type_name().to_string())),

            Builtin::Len => match one(args) {
                Value::Str(s) => Ok(Value::Number(Num::Int(s.chars().count() as i64))),
                Value::List(items) => Ok(Value::Number(Num::Int(items.len() as i64))),
                other => Err(self.rt_error(
                    format!("len() takes a string or list, not {}", other.type_name()),
                    file,
                    span,
                    ctx,
                )),
            },

            Builtin::Exit => Err(FxError::exit(0)),

            Builtin::Eval => match one(args) {
                Value::Str(text) => {
                    let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
                    let result = self.exec_source("<eval>", &text, ctx);
                    self.loop_depth = saved_loop_depth;
                    result
                }
                other => Err(self.rt_error(
                    format!("eval() takes a string, not {}", other.type_name()),
                    file,
                    span,
                    ctx,
                )),
            },

            Builtin::Convert => {
                let (value, target) = two(args);
                self.convert(value, target, file, span, ctx)
            }

            Builtin::Random => {
                let (value, count) = two(args);
                let (Value::Number(Num::Int(max)), Value::Number(Num::Int(count))) =
                    (&value, &count)
                else {
                    return Err(self.rt_error(
                        "random() takes integer arguments",
                        file,
                        span,
                        ctx,
                    ));
                };
                if *max < 0 || *count < 0 {
                    return Err(self.rt_error(
                        "random() arguments must be non-negative",
                        file,
                        span,
                        ctx,
                    ));
                }
                let mut rng = rand::thread_rng();
                let items = (0..*count)
                    .map(|_| Value::Number(Num::Int(rng.gen_range(0..=*max))))
                    .collect();
                Ok(Value::List(items))
            }
        }
    }

    fn convert(
        &self,
        value: Value,
        target: Value,
        file: FileId,
        span: Span,
        ctx: &Rc<Context>,
    ) -> FxResult<Value> {
        let Value::Str(target) = target else {
            return Err(self.rt_error("convert() target must be a string", file, span, ctx));
        };

        match target.as_str() {
            "string" => Ok(Value::Str(value.display())),

            "number" => match value {
                Value::Number(_) => Ok(value),
                Value::Bool(b) => Ok(Value::Number(Num::Int(i64::from(b)))),
                Value::Str(s) => {
                    let text = s.trim();
                    if let Ok(int) = text.parse::<i64>() {
                        Ok(Value::Number(Num::Int(int)))
                    } else if let Ok(float) = text.parse::<f64>() {
                        Ok(Value::Number(Num::Float(float)))
                    } else {
                        Err(self.rt_error(
                            format!("Cannot convert '{s}' to number"),
                            file,
                            span,
                            ctx,
                        ))
                    }
                }
                other => Err(self.rt_error(
                    format!("Cannot convert {} to number", other.type_name()),
                    file,
                    span,
                    ctx,
                )),
            },

            "boolean" => match value {
                Value::Bool(_) => Ok(value),
                Value::Number(n) => Ok(Value::Bool(!n.is_zero())),
                Value::Str(s) => match s.as_str() {
                    "true" | "True" => Ok(Value::Bool(true)),
                    "false" | "False" => Ok(Value::Bool(false)),
                    _ => Err(self.rt_error(
                        format!("Cannot convert '{s}' to boolean"),
                        file,
                        span,
                        ctx,
                    )),
                },
                other => Err(self.rt_error(
                    format!("Cannot convert {} to boolean", other.type_name()),
                    file,
                    span,
                    ctx,
                )),
            },

            other => Err(self.rt_error(
                format!("Invalid conversion target '{other}'"),
                file,
                span,
                ctx,
            )),
        }
    }
}

/// The single argument of an arity-1 builtin. Arity is checked before this
/// runs, so the fallback is unreachable.
fn one(args: Vec<Value>) -> Value {
    args.into_iter().next().unwrap_or(Value::Null)
}

/// The two arguments of an arity-2 builtin.
fn two(args: Vec<Value>) -> (Value, Value) {
    let mut args = args.into_iter();
    let first = args.next().unwrap_or(Value::Null);
    let second = args.next().unwrap_or(Value::Null);
    (first, second)
}
