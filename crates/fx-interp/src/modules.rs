//! Filesystem-backed module loader.
//!
//! `import m.a` resolves `m.a` to `m/a.fx` relative to the working
//! directory, evaluates the file once in a fresh scope seeded with the
//! global table, and installs its top-level bindings into the importing
//! scope. Loads are cached by canonical path, so importing the same module
//! twice does not re-execute it.

use std::path::PathBuf;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use fx_util::{FileId, FxResult, Span};

use crate::flow::{Flow, RunResult};
use crate::interp::Interpreter;
use crate::scope::{global_table, Context, SymbolTable};
use crate::value::Value;

#[derive(Clone, Debug)]
enum ModuleEntry {
    /// The module is on the load stack right now.
    Loading,
    /// The module's exported bindings.
    Loaded(Vec<(String, Value)>),
}

/// Per-session cache of loaded modules, keyed by canonical path.
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: FxHashMap<PathBuf, ModuleEntry>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fully loaded modules.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, ModuleEntry::Loaded(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turn a dotted module name into its file path: `lib.math` → `lib/math.fx`.
pub fn module_path(name: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for part in name.split('.') {
        path.push(part);
    }
    path.set_extension("fx");
    path
}

impl Interpreter<'_> {
    /// Load a module and return its exported bindings.
    fn load_module(
        &mut self,
        name: &str,
        file: FileId,
        span: Span,
        ctx: &Rc<Context>,
    ) -> FxResult<Vec<(String, Value)>> {
        let path = module_path(name);
        // A missing file cannot be canonicalized; the raw path then serves
        // as the cache key and the read below reports the failure.
        let canonical = path.canonicalize().unwrap_or(path);

        if let Some(entry) = self.modules.entries.get(&canonical) {
            return match entry {
                ModuleEntry::Loaded(exports) => Ok(exports.clone()),
                ModuleEntry::Loading => Err(self.rt_error(
                    format!("Module '{name}' is already being loaded"),
                    file,
                    span,
                    ctx,
                )),
            };
        }

        let text = std::fs::read_to_string(&canonical).map_err(|_| {
            self.rt_error(format!("Module '{name}' not found"), file, span, ctx)
        })?;
        if text.trim().is_empty() {
            return Err(self.rt_error(format!("Module '{name}' is empty"), file, span, ctx));
        }

        tracing::debug!(module = name, path = %canonical.display(), "loading module");
        self.modules
            .entries
            .insert(canonical.clone(), ModuleEntry::Loading);

        // The module runs in its own scope chained onto a fresh copy of the
        // globals; its local bindings become the exports.
        let table = SymbolTable::with_parent(global_table()).into_ref();
        let module_ctx = Context::module(name, Rc::clone(&table));
        let source_name = canonical.display().to_string();

        if let Err(err) = self.exec_source(&source_name, &text, &module_ctx) {
            self.modules.entries.remove(&canonical);
            return Err(err);
        }

        let exports = table.borrow().locals();
        self.modules
            .entries
            .insert(canonical, ModuleEntry::Loaded(exports.clone()));
        Ok(exports)
    }

    /// `import m [as a]`: install each export under `"a.<name>"`.
    pub(crate) fn eval_import(
        &mut self,
        node: &fx_par::ast::ImportStmt,
        file: FileId,
        ctx: &Rc<Context>,
    ) -> RunResult {
        let exports = self.load_module(&node.module, file, node.module_span, ctx)?;
        let prefix = node.alias.as_deref().unwrap_or(&node.module);
        let mut table = ctx.table.borrow_mut();
        for (name, value) in exports {
            table.set(format!("{prefix}.{name}"), value);
        }
        Ok(Flow::Value(Value::Null))
    }

    /// `from m import x [as y], ..`: install the selected exports under
    /// their aliases into the importing scope.
    pub(crate) fn eval_from_import(
        &mut self,
        node: &fx_par::ast::FromImportStmt,
        file: FileId,
        ctx: &Rc<Context>,
    ) -> RunResult {
        let exports = self.load_module(&node.module, file, node.module_span, ctx)?;
        for (name, alias) in &node.names {
            let value = exports
                .iter()
                .find(|(export, _)| export == name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| {
                    self.rt_error(
                        format!("Module '{}' has no name '{name}'", node.module),
                        file,
                        node.span,
                        ctx,
                    )
                })?;
            let bound = alias.as_deref().unwrap_or(name);
            ctx.table.borrow_mut().set(bound, value);
        }
        Ok(Flow::Value(Value::Null))
    }
}
