//! Symbol tables and the runtime context chain.
//!
//! A [`SymbolTable`] maps names to values and chains to a parent table;
//! lookup walks the chain, writes always land in the local table. Tables
//! live behind `Rc<RefCell<..>>` so function values can capture their
//! defining scope and keep it alive past the frame that created it.
//!
//! A [`Context`] is one frame of the call stack: a display name for
//! tracebacks, the call-site position it was entered from, the parent
//! frame, and the frame's symbol table.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use fx_util::{FileId, TraceFrame};

use crate::builtins::Builtin;
use crate::value::Value;

/// Shared handle to a symbol table.
pub type ScopeRef = Rc<RefCell<SymbolTable>>;

/// A mapping from names to values with an optional parent scope.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<String, Value>,
    parent: Option<ScopeRef>,
}

impl SymbolTable {
    /// A root table with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table chained onto `parent`.
    pub fn with_parent(parent: ScopeRef) -> Self {
        Self {
            symbols: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Wrap into the shared handle form.
    pub fn into_ref(self) -> ScopeRef {
        Rc::new(RefCell::new(self))
    }

    /// Look up a name, walking the parent chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.symbols.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Bind a name in this table only.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.symbols.insert(name.into(), value);
    }

    /// Remove a local binding.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.symbols.remove(name)
    }

    /// True if this table (not its parents) binds `name`.
    pub fn has_local(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// The local bindings, cloned. Used to compute module exports.
    pub fn locals(&self) -> Vec<(String, Value)> {
        self.symbols
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// The host-seeded global bindings: the `Null`/`True`/`False` constants and
/// every builtin function. Each program run and each module load gets a
/// fresh copy.
pub fn global_table() -> ScopeRef {
    let mut table = SymbolTable::new();
    table.set("Null", Value::Null);
    table.set("True", Value::Bool(true));
    table.set("False", Value::Bool(false));
    for builtin in Builtin::ALL {
        table.set(builtin.name(), Value::Builtin(builtin));
    }
    table.into_ref()
}

/// One frame of the runtime call stack.
#[derive(Debug)]
pub struct Context {
    /// Name shown in tracebacks, e.g. `<program>` or the function name.
    pub display_name: String,
    /// The calling frame.
    pub parent: Option<Rc<Context>>,
    /// Call-site position in the parent frame's file.
    pub entry: Option<(FileId, u32)>,
    /// This frame's symbol table.
    pub table: ScopeRef,
}

impl Context {
    /// The root frame of a program run.
    pub fn program(table: ScopeRef) -> Rc<Context> {
        Rc::new(Context {
            display_name: "<program>".to_string(),
            parent: None,
            entry: None,
            table,
        })
    }

    /// The root frame of a module load.
    pub fn module(name: &str, table: ScopeRef) -> Rc<Context> {
        Rc::new(Context {
            display_name: format!("<module {name}>"),
            parent: None,
            entry: None,
            table,
        })
    }

    /// A frame entered from `parent` at the given call site.
    pub fn child(
        display_name: String,
        parent: &Rc<Context>,
        entry: (FileId, u32),
        table: ScopeRef,
    ) -> Rc<Context> {
        Rc::new(Context {
            display_name,
            parent: Some(Rc::clone(parent)),
            entry: Some(entry),
            table,
        })
    }

    /// Build traceback frames for an error at `file`/`line` inside this
    /// context, ordered outermost first.
    pub fn traceback(self: &Rc<Context>, file: FileId, line: u32) -> Vec<TraceFrame> {
        let mut frames = Vec::new();
        let mut position = (file, line);
        let mut current = Some(Rc::clone(self));

        while let Some(ctx) = current {
            frames.push(TraceFrame {
                file: position.0,
                line: position.1,
                scope: ctx.display_name.clone(),
            });
            match ctx.entry {
                Some(entry) => position = entry,
                None => break,
            }
            current = ctx.parent.clone();
        }

        frames.reverse();
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Num;

    fn int(v: i64) -> Value {
        Value::Number(Num::Int(v))
    }

    #[test]
    fn test_set_and_get() {
        let mut table = SymbolTable::new();
        table.set("x", int(1));
        assert_eq!(table.get("x"), Some(int(1)));
        assert_eq!(table.get("y"), None);
    }

    #[test]
    fn test_lookup_walks_parent_chain() {
        let root = SymbolTable::new().into_ref();
        root.borrow_mut().set("x", int(1));
        let child = SymbolTable::with_parent(Rc::clone(&root)).into_ref();
        assert_eq!(child.borrow().get("x"), Some(int(1)));
    }

    #[test]
    fn test_set_writes_locally_only() {
        let root = SymbolTable::new().into_ref();
        root.borrow_mut().set("x", int(1));
        let child = SymbolTable::with_parent(Rc::clone(&root)).into_ref();
        child.borrow_mut().set("x", int(2));

        assert_eq!(child.borrow().get("x"), Some(int(2)));
        assert_eq!(root.borrow().get("x"), Some(int(1)));
    }

    #[test]
    fn test_shadowing_resolution_order() {
        let root = SymbolTable::new().into_ref();
        root.borrow_mut().set("x", int(1));
        root.borrow_mut().set("y", int(10));
        let child = SymbolTable::with_parent(Rc::clone(&root)).into_ref();
        child.borrow_mut().set("x", int(2));

        assert_eq!(child.borrow().get("x"), Some(int(2)));
        assert_eq!(child.borrow().get("y"), Some(int(10)));
    }

    #[test]
    fn test_global_table_contents() {
        let globals = global_table();
        let globals = globals.borrow();
        assert_eq!(globals.get("Null"), Some(Value::Null));
        assert_eq!(globals.get("True"), Some(Value::Bool(true)));
        assert_eq!(globals.get("False"), Some(Value::Bool(false)));
        assert!(matches!(globals.get("print"), Some(Value::Builtin(_))));
        assert!(matches!(globals.get("len"), Some(Value::Builtin(_))));
    }

    #[test]
    fn test_traceback_chain() {
        let file = FileId::DUMMY;
        let program = Context::program(global_table());
        let inner = Context::child(
            "fact".to_string(),
            &program,
            (file, 3),
            SymbolTable::new().into_ref(),
        );

        let frames = inner.traceback(file, 7);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].scope, "<program>");
        assert_eq!(frames[0].line, 3);
        assert_eq!(frames[1].scope, "fact");
        assert_eq!(frames[1].line, 7);
    }
}
