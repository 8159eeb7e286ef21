//! Session namespace.
//!
//! The namespace is the explicit replacement for "inject into the caller's
//! environment": loading a module produces symbol handles, and merging them
//! into the namespace is a visible operation that returns the injected
//! names. Existing bindings of the same name are overwritten silently, the
//! way an interactive rebind works; there is no conflict detection.

use std::sync::Arc;

use libloading::Symbol;
use rustc_hash::FxHashMap;

use crate::error::Result;

use super::module::LoadedModule;
use super::symbols::{ExportedSymbol, SymbolKind};

/// A named entry point of a loaded module.
///
/// The handle keeps its module alive, so it stays callable even after the
/// namespace binding is overwritten by a later cell.
#[derive(Debug, Clone)]
pub struct SymbolHandle {
    symbol: ExportedSymbol,
    module: Arc<LoadedModule>,
}

impl SymbolHandle {
    /// Public name of the symbol.
    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    /// Mangled name in the artifact's dynamic table.
    pub fn mangled(&self) -> &str {
        &self.symbol.mangled
    }

    /// Function or data.
    pub fn kind(&self) -> SymbolKind {
        self.symbol.kind
    }

    /// Name of the module that defined this symbol.
    pub fn module_name(&self) -> &str {
        &self.module.compiled.name
    }

    /// Resolve to a typed symbol in the owning module.
    ///
    /// # Safety
    /// The caller asserts that `T` matches the symbol's actual signature.
    pub unsafe fn get<T>(&self) -> Result<Symbol<'_, T>> {
        unsafe { self.module.symbol(&self.symbol.name) }
    }
}

/// Name → symbol-handle map accumulated over a session.
#[derive(Debug, Default)]
pub struct Namespace {
    bindings: FxHashMap<String, SymbolHandle>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every export of a loaded module, overwriting same-named
    /// bindings silently. Returns the injected names, sorted.
    pub fn merge(&mut self, module: &Arc<LoadedModule>) -> Vec<String> {
        let mut injected = Vec::with_capacity(module.exports.len());
        for symbol in &module.exports {
            self.bindings.insert(
                symbol.name.clone(),
                SymbolHandle {
                    symbol: symbol.clone(),
                    module: Arc::clone(module),
                },
            );
            injected.push(symbol.name.clone());
        }
        injected.sort();
        injected
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&SymbolHandle> {
        self.bindings.get(name)
    }

    /// All bound names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the namespace is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
