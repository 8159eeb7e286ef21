//! Interactive session: compile-or-reuse, load, inject.
//!
//! A session is the standalone stand-in for the notebook's interactive
//! environment. Each `eval` is an independent, blocking request/response
//! cycle; the only state carried across evals is the on-disk cache, the
//! table of loaded modules, and the namespace.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::compile::{CompilationResult, ModuleCompiler, ToolchainManager};
use crate::directive::{CellArgs, FortranCell};
use crate::error::{Error, Result};
use crate::load::{LoadedModule, Namespace};
use crate::paths::CacheDir;

/// What one `eval` did.
#[derive(Debug, Clone)]
pub struct EvalOutcome {
    /// Module name of the artifact.
    pub module: String,

    /// Full content-address key.
    pub key: String,

    /// True if a valid cached artifact was reused (no compiler ran).
    pub cached: bool,

    /// Names injected into the namespace, sorted.
    pub injected: Vec<String>,

    /// Build time in milliseconds (0 on cache hits).
    pub compile_time_ms: u64,
}

/// Owns the cache, toolchain, loaded modules and namespace.
pub struct Session {
    cache: CacheDir,
    toolchain: ToolchainManager,
    compiler: ModuleCompiler,
    defaults: CellArgs,
    modules: FxHashMap<String, Arc<LoadedModule>>,
    namespace: Namespace,
}

impl Session {
    /// Create a session over a cache directory, discovering the toolchain.
    pub fn new(cache: CacheDir) -> Self {
        Self::with_toolchain(cache, ToolchainManager::new())
    }

    /// Create a session with an explicit toolchain (tests inject stubs).
    pub fn with_toolchain(cache: CacheDir, toolchain: ToolchainManager) -> Self {
        let compiler = ModuleCompiler::new(cache.clone(), toolchain.clone());
        Self {
            cache,
            toolchain,
            compiler,
            defaults: CellArgs::default(),
            modules: FxHashMap::default(),
            namespace: Namespace::new(),
        }
    }

    /// Session-wide default arguments (the CLI's flags). Cell directives
    /// overlay these per cell.
    pub fn set_defaults(&mut self, defaults: CellArgs) {
        self.defaults = defaults;
    }

    /// Evaluate cell text: parse the directive, compile or reuse, load,
    /// and merge the exports into the namespace.
    ///
    /// On any failure the namespace is left untouched.
    pub fn eval(&mut self, text: &str) -> Result<EvalOutcome> {
        let cell = FortranCell::parse(text)?;
        self.eval_cell(cell)
    }

    /// Evaluate a cell read from a file.
    pub fn eval_file(&mut self, path: &Path) -> Result<EvalOutcome> {
        let cell = FortranCell::from_file(path)?;
        self.eval_cell(cell)
    }

    /// Evaluate an already-parsed cell.
    pub fn eval_cell(&mut self, cell: FortranCell) -> Result<EvalOutcome> {
        let args = self.defaults.merged_with(&cell.args);

        let (compiled, cached) = match self.compiler.compile(&cell, &args, false)? {
            CompilationResult::Success(m) => (m, false),
            CompilationResult::Cached(m) => (m, true),
            CompilationResult::Failed { module, output } => {
                return Err(Error::Compile { module, output });
            }
        };

        let module = match self.modules.get(&compiled.key) {
            Some(loaded) => Arc::clone(loaded),
            None => {
                let loaded = LoadedModule::load(&self.toolchain, compiled.clone())?;
                self.modules.insert(compiled.key.clone(), Arc::clone(&loaded));
                loaded
            }
        };

        let injected = self.namespace.merge(&module);
        tracing::info!(
            "module {} {} {} symbols",
            compiled.name,
            if cached { "reused," } else { "compiled," },
            injected.len()
        );

        Ok(EvalOutcome {
            module: compiled.name,
            key: compiled.key,
            cached,
            injected,
            compile_time_ms: compiled.compile_time_ms,
        })
    }

    /// Compile without loading (the `compile` subcommand).
    pub fn compile_only(&self, cell: &FortranCell, force: bool) -> Result<CompilationResult> {
        let args = self.defaults.merged_with(&cell.args);
        self.compiler.compile(cell, &args, force)
    }

    /// The accumulated namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The session's cache directory.
    pub fn cache(&self) -> &CacheDir {
        &self.cache
    }

    /// The discovered toolchain.
    pub fn toolchain(&self) -> &ToolchainManager {
        &self.toolchain
    }

    /// A loaded module by cache key, if this session loaded it.
    pub fn module(&self, key: &str) -> Option<&Arc<LoadedModule>> {
        self.modules.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::FortranVendor;
    use tempfile::TempDir;

    #[test]
    fn test_usage_error_before_any_io() {
        let temp = TempDir::new().unwrap();
        let cache = CacheDir::at(temp.path().join("cache")).unwrap();
        let mut session = Session::new(cache);

        let err = session.eval("!%%fortran --bogus\nend\n").unwrap_err();
        assert!(matches!(err, Error::Usage(_)));

        // Nothing was written and nothing was injected.
        assert!(session.cache().metadata_files().unwrap().is_empty());
        assert!(session.namespace().is_empty());
    }

    #[test]
    fn test_missing_vendor_leaves_namespace_untouched() {
        let temp = TempDir::new().unwrap();
        let cache = CacheDir::at(temp.path().join("cache")).unwrap();
        let toolchain = ToolchainManager::new();
        let mut session = Session::with_toolchain(cache, toolchain);

        session.set_defaults(CellArgs {
            fcompiler: Some(FortranVendor::Nvfortran),
            ..Default::default()
        });

        // Unless nvfortran is installed, this fails at toolchain resolution.
        if session.eval("end\n").is_err() {
            assert!(session.namespace().is_empty());
        }
    }
}
