//! Cache directory management.
//!
//! All vulcan state lives in a single flat cache directory, one triple of
//! files per cache key:
//!
//! ```text
//! $VULCAN_CACHE_DIR/          (default: <platform cache dir>/vulcan)
//! ├── vulcan_<digest>.f90     # generated source
//! ├── libvulcan_<digest>.so   # compiled artifact (platform naming)
//! ├── vulcan_<digest>.json    # artifact metadata
//! └── vulcan_<digest>.lock    # advisory lock
//! ```
//!
//! There is no index file; the directory listing is the only catalog.

use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::types::{SourceForm, dylib_extension, dylib_prefix};
use crate::error::Result;

/// Environment variable overriding the cache location.
pub const CACHE_DIR_ENV: &str = "VULCAN_CACHE_DIR";

/// The fixed on-disk cache for generated sources and compiled artifacts.
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    /// Resolve the cache directory from the environment.
    ///
    /// Order: `$VULCAN_CACHE_DIR`, the platform cache directory
    /// (`~/.cache/vulcan` on Linux), then `./.vulcan` as a last resort.
    /// Creates the directory if it does not exist.
    pub fn from_env() -> Result<Self> {
        let root = match std::env::var_os(CACHE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .map(|d| d.join("vulcan"))
                .unwrap_or_else(|| PathBuf::from(".vulcan")),
        };
        Self::at(root)
    }

    /// Use an explicit cache directory, creating it if needed.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the generated source file for a module.
    pub fn source_path(&self, module: &str, form: SourceForm) -> PathBuf {
        self.root.join(format!("{}.{}", module, form.extension()))
    }

    /// Path of the compiled artifact for a module.
    pub fn artifact_path(&self, module: &str) -> PathBuf {
        self.root
            .join(format!("{}{}.{}", dylib_prefix(), module, dylib_extension()))
    }

    /// Path of the object file produced by the compile stage.
    pub fn object_path(&self, module: &str) -> PathBuf {
        self.root.join(format!("{module}.o"))
    }

    /// Path of the metadata file for a module.
    pub fn metadata_path(&self, module: &str) -> PathBuf {
        self.root.join(format!("{module}.json"))
    }

    /// Path of the advisory lock file for a module.
    pub fn lock_path(&self, module: &str) -> PathBuf {
        self.root.join(format!("{module}.lock"))
    }

    /// Enumerate the metadata files of all cached artifacts.
    ///
    /// The directory listing is the catalog; entries are sorted by file name
    /// so the listing is stable.
    pub fn metadata_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Remove every cached file and recreate the empty directory.
    pub fn clean(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_at_creates_directory() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().join("cache");

        let dirs = CacheDir::at(&root).expect("Failed to create cache dir");
        assert!(dirs.root().exists());
        assert_eq!(dirs.root(), root);
    }

    #[test]
    fn test_per_module_paths() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = CacheDir::at(temp.path()).unwrap();

        let src = dirs.source_path("vulcan_ab12", SourceForm::Free);
        assert!(src.ends_with("vulcan_ab12.f90"));

        let fixed = dirs.source_path("vulcan_ab12", SourceForm::Fixed);
        assert!(fixed.ends_with("vulcan_ab12.f"));

        let meta = dirs.metadata_path("vulcan_ab12");
        assert!(meta.ends_with("vulcan_ab12.json"));

        let artifact = dirs.artifact_path("vulcan_ab12");
        let name = artifact.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.contains("vulcan_ab12"));
        assert!(name.ends_with(dylib_extension()));
    }

    #[test]
    fn test_clean_recreates_empty() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = CacheDir::at(temp.path().join("c")).unwrap();

        let file = dirs.metadata_path("vulcan_ab12");
        fs::write(&file, "{}").unwrap();
        assert!(file.exists());

        dirs.clean().expect("Failed to clean");
        assert!(!file.exists());
        assert!(dirs.root().exists());
        assert!(dirs.metadata_files().unwrap().is_empty());
    }

    #[test]
    fn test_metadata_files_catalog() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = CacheDir::at(temp.path()).unwrap();

        fs::write(dirs.metadata_path("vulcan_bb"), "{}").unwrap();
        fs::write(dirs.metadata_path("vulcan_aa"), "{}").unwrap();
        // Non-metadata files are not part of the catalog.
        fs::write(dirs.root().join("vulcan_aa.f90"), "").unwrap();

        let files = dirs.metadata_files().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("vulcan_aa.json"));
        assert!(files[1].ends_with("vulcan_bb.json"));
    }
}
