//! Cache commands: catalog and clean.
//!
//! There is no index file; the directory listing is the catalog.

use vulcan_core::{ArtifactMetadata, CacheDir};

use crate::colors;

/// List cached artifacts from the directory listing.
pub fn list() -> anyhow::Result<()> {
    let cache = CacheDir::from_env()?;
    let files = cache.metadata_files()?;

    if files.is_empty() {
        println!("Cache is empty: {}", cache.root().display());
        return Ok(());
    }

    println!(
        "\n{}Cached artifacts{} in {}:",
        colors::BOLD,
        colors::RESET,
        cache.root().display()
    );
    for file in files {
        match ArtifactMetadata::read(&file) {
            Ok(meta) => println!(
                "  {}{}{}  {} {}  {}built in {}ms{}",
                colors::CYAN,
                meta.module,
                colors::RESET,
                meta.fortran_compiler,
                meta.compiler_version,
                colors::DIM,
                meta.build_time_ms,
                colors::RESET
            ),
            Err(e) => println!(
                "  {}{}{}  {}unreadable metadata: {e}{}",
                colors::RED,
                file.display(),
                colors::RESET,
                colors::DIM,
                colors::RESET
            ),
        }
    }

    Ok(())
}

/// Remove every cached source and artifact.
pub fn clean() -> anyhow::Result<()> {
    let cache = CacheDir::from_env()?;
    let root = cache.root().display().to_string();
    cache.clean()?;
    println!("{}Cleaned{} {root}", colors::GREEN, colors::RESET);
    Ok(())
}
