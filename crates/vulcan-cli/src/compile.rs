//! Compile command implementation for the vulcan CLI.
//!
//! Produces (or reuses) a cached artifact without loading it.

use std::path::Path;

use vulcan_core::{CacheDir, CellArgs, CompilationResult, Error, FortranCell, Session};

use crate::colors;

/// Compile one cell into the cache.
pub fn execute(source: &str, args: CellArgs, force: bool) -> anyhow::Result<()> {
    let path = Path::new(source);
    if !path.exists() {
        anyhow::bail!("Source not found: {source}");
    }

    let cache = CacheDir::from_env()?;
    let mut session = Session::new(cache);
    session.set_defaults(args);

    let cell = FortranCell::from_file(path)?;
    match session.compile_only(&cell, force)? {
        CompilationResult::Success(module) => {
            println!(
                "{}Compiled{} {} in {}ms",
                colors::GREEN,
                colors::RESET,
                module.name,
                module.compile_time_ms
            );
            println!("  {}", module.artifact_path.display());
        }
        CompilationResult::Cached(module) => {
            println!(
                "{}Reused{} cached artifact {}",
                colors::YELLOW,
                colors::RESET,
                module.name
            );
            println!("  {}", module.artifact_path.display());
        }
        CompilationResult::Failed { module, output } => {
            return Err(Error::Compile { module, output }.into());
        }
    }

    Ok(())
}
