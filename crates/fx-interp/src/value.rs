//! The runtime value family and its per-operator dispatch.
//!
//! Binary operators dispatch on the left-hand value; each method knows the
//! right-hand variants it accepts and rejects everything else with
//! `Illegal operation`. Operation errors carry only a message; the
//! evaluator anchors them to the offending node's span.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use fx_par::ast::FnBody;
use fx_util::FileId;

use crate::builtins::Builtin;
use crate::scope::Context;

/// A number: integer or float, wrapped uniformly.
///
/// Integer arithmetic stays integral where it can; overflow and `/` promote
/// to float.
#[derive(Clone, Copy, Debug)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    /// The value as a float, promoting integers.
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }

    /// True for `0` and `0.0`.
    pub fn is_zero(self) -> bool {
        match self {
            Num::Int(v) => v == 0,
            Num::Float(v) => v == 0.0,
        }
    }

    pub(crate) fn add(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => match a.checked_add(b) {
                Some(v) => Num::Int(v),
                None => Num::Float(a as f64 + b as f64),
            },
            _ => Num::Float(self.as_f64() + other.as_f64()),
        }
    }

    fn sub(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => match a.checked_sub(b) {
                Some(v) => Num::Int(v),
                None => Num::Float(a as f64 - b as f64),
            },
            _ => Num::Float(self.as_f64() - other.as_f64()),
        }
    }

    fn mul(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => match a.checked_mul(b) {
                Some(v) => Num::Int(v),
                None => Num::Float(a as f64 * b as f64),
            },
            _ => Num::Float(self.as_f64() * other.as_f64()),
        }
    }

    /// Division always yields a float, like the language's `/`.
    fn div(self, other: Num) -> Num {
        Num::Float(self.as_f64() / other.as_f64())
    }

    /// Remainder with the sign of the divisor.
    fn rem(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => {
                let (a, b) = (a as i128, b as i128);
                Num::Int((((a % b) + b) % b) as i64)
            }
            _ => {
                let (a, b) = (self.as_f64(), other.as_f64());
                Num::Float(a - b * (a / b).floor())
            }
        }
    }

    fn pow(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) if b >= 0 => {
                let result = u32::try_from(b)
                    .ok()
                    .and_then(|exp| a.checked_pow(exp));
                match result {
                    Some(v) => Num::Int(v),
                    None => Num::Float((a as f64).powf(b as f64)),
                }
            }
            _ => Num::Float(self.as_f64().powf(other.as_f64())),
        }
    }
}

impl PartialEq for Num {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(v) => write!(f, "{v}"),
            Num::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
        }
    }
}

/// Dictionary keys are strings or integers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DictKey {
    Int(i64),
    Str(String),
}

impl DictKey {
    /// Rendered form: integers bare, strings double-quoted.
    pub fn repr(&self) -> String {
        match self {
            DictKey::Int(v) => v.to_string(),
            DictKey::Str(s) => format!("\"{s}\""),
        }
    }
}

/// A user-defined function value.
///
/// The body is shared with the AST it came from, and the definition context
/// is captured by reference, which is what makes closures work: calling the
/// function chains a fresh scope onto the captured one, not the caller's.
#[derive(Clone, Debug)]
pub struct Function {
    /// `None` for anonymous functions.
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<FnBody>,
    /// The context the function was defined in.
    pub context: Rc<Context>,
    /// The file its body's spans refer to.
    pub file: FileId,
}

impl Function {
    /// Display name used in arity errors and tracebacks.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

/// Error from a value operation. Carries only the message; the evaluator
/// attaches the span and traceback.
#[derive(Clone, Debug, PartialEq)]
pub struct OpError(pub String);

fn illegal() -> OpError {
    OpError("Illegal operation".to_string())
}

type OpResult = Result<Value, OpError>;

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Number(Num),
    Bool(bool),
    Str(String),
    List(Vec<Value>),
    Dict(IndexMap<DictKey, Value>),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl Value {
    /// The name reported by the `type` builtin.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Function(_) | Value::Builtin(_) => "function",
        }
    }

    /// Truthiness: `Null` and empty collections are false, numbers are true
    /// unless zero, functions are always true.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Number(n) => !n.is_zero(),
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Dict(map) => !map.is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// The form `print` writes: strings raw, everything else as `repr`.
    pub fn display(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.repr(),
        }
    }

    /// The form the REPL echoes: strings quoted, collections rendered
    /// element by element in insertion order.
    pub fn repr(&self) -> String {
        match self {
            Value::Null => "Null".to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Str(s) => format!("\"{s}\""),
            Value::List(items) => {
                let inner = items.iter().map(Value::repr).collect::<Vec<_>>().join(", ");
                format!("[{inner}]")
            }
            Value::Dict(map) => {
                let inner = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{inner}}}")
            }
            Value::Function(func) => format!("<function {}>", func.display_name()),
            Value::Builtin(builtin) => format!("<built-in function {}>", builtin.name()),
        }
    }

    // =========================================================================
    // Binary operators
    // =========================================================================

    /// `+`
    pub fn add(&self, rhs: &Value) -> OpResult {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.add(*b))),
            (Value::Number(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::Str(a), Value::Number(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                let mut items = a.clone();
                items.extend(b.iter().cloned());
                Ok(Value::List(items))
            }
            (Value::List(a), other) => {
                let mut items = a.clone();
                items.push(other.clone());
                Ok(Value::List(items))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                let mut map = a.clone();
                for (k, v) in b {
                    map.insert(k.clone(), v.clone());
                }
                Ok(Value::Dict(map))
            }
            (Value::Bool(a), other) => Ok(Value::Bool(*a || other.is_true())),
            _ => Err(illegal()),
        }
    }

    /// `-`
    pub fn sub(&self, rhs: &Value) -> OpResult {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.sub(*b))),
            (Value::List(items), Value::Number(Num::Int(index))) => {
                let mut items = items.clone();
                let idx = normalize_index(*index, items.len())
                    .ok_or_else(|| OpError("Index out of bounds".to_string()))?;
                items.remove(idx);
                Ok(Value::List(items))
            }
            (Value::Dict(map), key) => {
                let key = dict_key(key)?;
                let mut map = map.clone();
                if map.shift_remove(&key).is_none() {
                    return Err(OpError(format!("Key {} not found", key.repr())));
                }
                Ok(Value::Dict(map))
            }
            _ => Err(illegal()),
        }
    }

    /// `*`
    pub fn mul(&self, rhs: &Value) -> OpResult {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.mul(*b))),
            (Value::Str(s), Value::Number(Num::Int(n))) => {
                Ok(Value::Str(s.repeat((*n).max(0) as usize)))
            }
            (Value::List(items), Value::Number(Num::Int(n))) => {
                let count = (*n).max(0) as usize;
                let mut out = Vec::with_capacity(items.len() * count);
                for _ in 0..count {
                    out.extend(items.iter().cloned());
                }
                Ok(Value::List(out))
            }
            (Value::Bool(a), other) => Ok(Value::Bool(*a && other.is_true())),
            _ => Err(illegal()),
        }
    }

    /// `/` — numeric division, list indexing, dict lookup.
    pub fn div(&self, rhs: &Value) -> OpResult {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => {
                if b.is_zero() {
                    return Err(OpError("Division by zero".to_string()));
                }
                Ok(Value::Number(a.div(*b)))
            }
            (Value::List(items), Value::Number(Num::Int(index))) => {
                let idx = normalize_index(*index, items.len())
                    .ok_or_else(|| OpError("Index out of bounds".to_string()))?;
                Ok(items[idx].clone())
            }
            (Value::Dict(map), key) => {
                let key = dict_key(key)?;
                map.get(&key)
                    .cloned()
                    .ok_or_else(|| OpError(format!("Key {} not found", key.repr())))
            }
            _ => Err(illegal()),
        }
    }

    /// `%`
    pub fn rem(&self, rhs: &Value) -> OpResult {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => {
                if b.is_zero() {
                    return Err(OpError("Division by zero".to_string()));
                }
                Ok(Value::Number(a.rem(*b)))
            }
            _ => Err(illegal()),
        }
    }

    /// `^`
    pub fn pow(&self, rhs: &Value) -> OpResult {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.pow(*b))),
            _ => Err(illegal()),
        }
    }

    /// `==`
    pub fn eq_op(&self, rhs: &Value) -> OpResult {
        match (self, rhs) {
            (Value::Number(_), Value::Number(_))
            | (Value::Str(_), Value::Str(_))
            | (Value::List(_), Value::List(_)) => Ok(Value::Bool(value_eq(self, rhs))),
            _ => Err(illegal()),
        }
    }

    /// `!=`
    pub fn ne_op(&self, rhs: &Value) -> OpResult {
        match self.eq_op(rhs)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            _ => unreachable!("eq_op yields a boolean"),
        }
    }

    /// `<` — numeric on numbers, by length on lists.
    pub fn lt_op(&self, rhs: &Value) -> OpResult {
        self.ordering(rhs, |a, b| a < b, |a, b| a < b)
    }

    /// `>`
    pub fn gt_op(&self, rhs: &Value) -> OpResult {
        self.ordering(rhs, |a, b| a > b, |a, b| a > b)
    }

    /// `<=`
    pub fn le_op(&self, rhs: &Value) -> OpResult {
        self.ordering(rhs, |a, b| a <= b, |a, b| a <= b)
    }

    /// `>=`
    pub fn ge_op(&self, rhs: &Value) -> OpResult {
        self.ordering(rhs, |a, b| a >= b, |a, b| a >= b)
    }

    fn ordering(
        &self,
        rhs: &Value,
        num_cmp: fn(f64, f64) -> bool,
        len_cmp: fn(usize, usize) -> bool,
    ) -> OpResult {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => {
                Ok(Value::Bool(num_cmp(a.as_f64(), b.as_f64())))
            }
            (Value::List(a), Value::List(b)) => Ok(Value::Bool(len_cmp(a.len(), b.len()))),
            _ => Err(illegal()),
        }
    }

    /// `and` — requires a boolean on the left; the right side is coerced
    /// through its truthiness.
    pub fn and_op(&self, rhs: &Value) -> OpResult {
        match self {
            Value::Bool(a) => Ok(Value::Bool(*a && rhs.is_true())),
            _ => Err(illegal()),
        }
    }

    /// `or`
    pub fn or_op(&self, rhs: &Value) -> OpResult {
        match self {
            Value::Bool(a) => Ok(Value::Bool(*a || rhs.is_true())),
            _ => Err(illegal()),
        }
    }

    /// `not` — defined on every value.
    pub fn not_op(&self) -> Value {
        Value::Bool(!self.is_true())
    }
}

/// Structural equality across the whole value family, used by `==` and by
/// element-wise list comparison.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| value_eq(l, r))
        }
        (Value::Dict(x), Value::Dict(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| value_eq(v, other)))
        }
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => x == y,
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        value_eq(self, other)
    }
}

/// Convert a value into a dict key, rejecting everything that is not a
/// string or an integer.
pub fn dict_key(value: &Value) -> Result<DictKey, OpError> {
    match value {
        Value::Str(s) => Ok(DictKey::Str(s.clone())),
        Value::Number(Num::Int(i)) => Ok(DictKey::Int(*i)),
        other => Err(OpError(format!(
            "Dict keys must be strings or integers, not {}",
            other.type_name()
        ))),
    }
}

/// Resolve a possibly negative index against a collection length.
/// Negative indices count from the back.
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let idx = if index < 0 {
        index.checked_add(len as i64)?
    } else {
        index
    };
    if idx >= 0 && (idx as usize) < len {
        Some(idx as usize)
    } else {
        None
    }
}
