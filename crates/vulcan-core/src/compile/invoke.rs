//! External compiler invocation.
//!
//! Runs the compile-and-link pipeline for one cell: fingerprint, cache
//! probe, source write, object compile, shared-object link, metadata save.
//! Both toolchain stages run synchronously with captured output; a non-zero
//! exit aborts the invocation, removes any partial artifact, and surfaces
//! the captured output verbatim. There are no retries.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use fs2::FileExt;

use crate::directive::{CellArgs, FortranCell};
use crate::error::{Error, Result};
use crate::paths::CacheDir;

use super::fingerprint;
use super::link::LinkRegistry;
use super::metadata::{ArtifactMetadata, now_unix};
use super::toolchain::{ResolvedCompiler, ToolchainManager};
use super::types::{CompilationResult, CompiledModule, CompilerConfig};

/// Compiles Fortran cells to shared libraries in the cache.
pub struct ModuleCompiler {
    cache: CacheDir,
    toolchain: ToolchainManager,
    links: LinkRegistry,
}

impl ModuleCompiler {
    /// Create a compiler over a cache directory and toolchain.
    pub fn new(cache: CacheDir, toolchain: ToolchainManager) -> Self {
        Self {
            cache,
            toolchain,
            links: LinkRegistry::new(),
        }
    }

    /// Replace the link registry (tests inject a pkg-config-free one).
    pub fn with_links(mut self, links: LinkRegistry) -> Self {
        self.links = links;
        self
    }

    /// Compile a cell under merged arguments, reusing a valid cached
    /// artifact unless `force` is set.
    pub fn compile(
        &self,
        cell: &FortranCell,
        args: &CellArgs,
        force: bool,
    ) -> Result<CompilationResult> {
        let config = CompilerConfig::from_args(args);
        let fortran = self.toolchain.fortran(config.fortran)?;
        let cc = config.cc.map(|v| self.toolchain.cc(v)).transpose()?;

        let compile_flags = config.compile_flags(cell.form);
        let fortran_id = compiler_id(fortran);
        let cc_id = cc.map(compiler_id);

        let key = fingerprint::cache_key(
            &cell.source,
            &fortran_id,
            cc_id.as_deref(),
            &compile_flags,
            &config.link,
        );
        let module = fingerprint::module_name(&key);

        // Serialize compile-or-reuse for this key across processes; the
        // cache directory is shared mutable state.
        let lock = fs::File::create(self.cache.lock_path(&module))?;
        lock.lock_exclusive()?;
        let result = self.compile_locked(cell, &config, fortran, cc, &compile_flags, &key, &module, force);
        let _ = fs2::FileExt::unlock(&lock);
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn compile_locked(
        &self,
        cell: &FortranCell,
        config: &CompilerConfig,
        fortran: &ResolvedCompiler,
        cc: Option<&ResolvedCompiler>,
        compile_flags: &[String],
        key: &str,
        module: &str,
        force: bool,
    ) -> Result<CompilationResult> {
        if !force
            && let Some(cached) = self.check_cache(module, key, fortran)
        {
            tracing::debug!("cache hit for {module}");
            return Ok(CompilationResult::Cached(cached));
        }

        let start = Instant::now();

        let source_path = self.cache.source_path(module, cell.form);
        let object_path = self.cache.object_path(module);
        let artifact_path = self.cache.artifact_path(module);
        fs::write(&source_path, &cell.source)?;

        // Stage 1: compile to a position-independent object.
        let mut compile = Command::new(&fortran.path);
        compile.arg("-c").arg("-fPIC");
        compile.args(compile_flags);
        compile.arg("-o").arg(&object_path).arg(&source_path);
        compile.current_dir(self.cache.root());

        if let Some(output) = self.run_stage(compile, module, &[&object_path, &artifact_path])? {
            return Ok(CompilationResult::Failed {
                module: module.to_string(),
                output,
            });
        }

        // Stage 2: link the shared object. The driver is the Fortran
        // compiler unless a C compiler was selected, which must then add
        // the vendor's Fortran runtime itself.
        let link_resources = self.links.resolve_all(&config.link);
        let mut link_args: Vec<String> = link_resources
            .iter()
            .flat_map(|r| r.args.iter().cloned())
            .collect();

        let driver = cc.unwrap_or(fortran);
        let mut link = Command::new(&driver.path);
        link.arg("-shared").arg("-o").arg(&artifact_path).arg(&object_path);
        link.args(&link_args);
        if cc.is_some()
            && let Some(vendor) = config.fortran.or_else(|| {
                // Default vendor resolution already picked `fortran`; recover
                // its enum for the runtime-library table.
                super::toolchain::FortranVendor::ALL
                    .into_iter()
                    .find(|v| v.as_str() == fortran.vendor)
            })
        {
            for lib in vendor.runtime_libs() {
                let arg = format!("-l{lib}");
                link.arg(&arg);
                link_args.push(arg);
            }
        }
        link.current_dir(self.cache.root());

        if let Some(output) = self.run_stage(link, module, &[&object_path, &artifact_path])? {
            return Ok(CompilationResult::Failed {
                module: module.to_string(),
                output,
            });
        }

        let _ = fs::remove_file(&object_path);
        let compile_time_ms = start.elapsed().as_millis() as u64;

        let metadata = ArtifactMetadata {
            key: key.to_string(),
            module: module.to_string(),
            fortran_compiler: fortran.vendor.clone(),
            compiler_version: fortran.version.clone(),
            cc: cc.map(|c| c.vendor.clone()),
            flags: compile_flags.to_vec(),
            link_args,
            source_file: file_name(&source_path),
            artifact_file: file_name(&artifact_path),
            build_time_ms: compile_time_ms,
            created_at: now_unix(),
        };
        // Metadata gates future cache hits; a failed save only costs a
        // rebuild next time.
        if let Err(e) = metadata.write(&self.cache.metadata_path(module)) {
            tracing::warn!("failed to save artifact metadata: {e}");
        }

        tracing::info!("compiled {module} in {compile_time_ms}ms");

        Ok(CompilationResult::Success(CompiledModule {
            name: module.to_string(),
            key: key.to_string(),
            source_path,
            artifact_path,
            compile_time_ms,
        }))
    }

    /// Run one toolchain stage. Returns `Ok(None)` on success, the captured
    /// output on a non-zero exit (after removing partial outputs), and an
    /// error if the tool could not be spawned at all.
    fn run_stage(
        &self,
        mut cmd: Command,
        module: &str,
        partials: &[&Path],
    ) -> Result<Option<String>> {
        tracing::debug!("running {:?}", cmd);
        let output = cmd.output().map_err(|e| {
            Error::Toolchain(format!(
                "failed to run {}: {e}",
                cmd.get_program().to_string_lossy()
            ))
        })?;

        if output.status.success() {
            return Ok(None);
        }

        for path in partials {
            let _ = fs::remove_file(path);
        }
        let _ = fs::remove_file(self.cache.metadata_path(module));

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(Some(captured))
    }

    /// Probe the cache for a valid artifact under this key.
    ///
    /// Valid means: the artifact file exists, its metadata parses, the
    /// recorded key matches, and the recorded compiler version equals the
    /// current one. Anything less is rebuilt.
    fn check_cache(
        &self,
        module: &str,
        key: &str,
        fortran: &ResolvedCompiler,
    ) -> Option<CompiledModule> {
        let artifact_path = self.cache.artifact_path(module);
        if !artifact_path.exists() {
            return None;
        }

        let metadata = match ArtifactMetadata::read(&self.cache.metadata_path(module)) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("ignoring cached artifact {module}: {e}");
                return None;
            }
        };

        if metadata.key != key || !metadata.matches_toolchain(&fortran.version) {
            return None;
        }

        Some(CompiledModule {
            name: module.to_string(),
            key: key.to_string(),
            source_path: self.cache.root().join(&metadata.source_file),
            artifact_path,
            compile_time_ms: 0,
        })
    }

    /// The cache this compiler writes into.
    pub fn cache(&self) -> &CacheDir {
        &self.cache
    }
}

/// Identity string a compiler contributes to the fingerprint.
fn compiler_id(c: &ResolvedCompiler) -> String {
    format!("{} {}", c.vendor, c.version)
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().into_owned()
}
