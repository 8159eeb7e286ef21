//! Loaded artifact wrapper.

use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::compile::{CompiledModule, ToolchainManager};
use crate::error::{Error, Result};

use super::symbols::{self, ExportedSymbol};

/// A compiled artifact mapped into the process.
///
/// Owns the `libloading::Library`, so every symbol handle pointing into the
/// artifact stays valid for as long as the module (or any clone of its
/// `Arc`) is alive. Modules are never unloaded mid-session.
pub struct LoadedModule {
    /// The artifact this module was loaded from.
    pub compiled: CompiledModule,

    /// Public surface, sorted by name.
    pub exports: Vec<ExportedSymbol>,

    library: Library,
}

impl LoadedModule {
    /// Enumerate the artifact's exports, then map it into the process.
    ///
    /// A load failure after a successful compile propagates as-is; there is
    /// no fallback.
    pub fn load(toolchain: &ToolchainManager, compiled: CompiledModule) -> Result<Arc<Self>> {
        let exports = symbols::exported_symbols(toolchain.nm_path()?, &compiled.artifact_path)?;

        tracing::debug!(
            "loading {} ({} exported symbols)",
            compiled.artifact_path.display(),
            exports.len()
        );
        let library = unsafe { Library::new(&compiled.artifact_path) }?;

        Ok(Arc::new(Self {
            compiled,
            exports,
            library,
        }))
    }

    /// Look up an export by public name.
    pub fn export(&self, name: &str) -> Option<&ExportedSymbol> {
        self.exports.iter().find(|s| s.name == name)
    }

    /// Resolve a public name to a typed symbol.
    ///
    /// # Safety
    /// The caller asserts that `T` matches the symbol's actual signature;
    /// nothing about a Fortran export can be checked here.
    pub unsafe fn symbol<T>(&self, name: &str) -> Result<Symbol<'_, T>> {
        let export = self.export(name).ok_or_else(|| {
            Error::Symbols(format!(
                "no exported symbol '{name}' in module {}",
                self.compiled.name
            ))
        })?;
        unsafe { self.library.get(export.mangled.as_bytes()) }.map_err(Error::from)
    }
}

impl std::fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModule")
            .field("module", &self.compiled.name)
            .field("exports", &self.exports.len())
            .finish()
    }
}
