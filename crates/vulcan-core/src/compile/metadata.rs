//! Per-artifact metadata.
//!
//! Every artifact in the cache is accompanied by a JSON metadata file
//! recording the toolchain that produced it. A cache hit requires the
//! metadata to parse and its recorded compiler version to match the current
//! one; an artifact without valid metadata is never importable. The file is
//! written only after a successful build, so a failed compile leaves
//! nothing a later run could mistake for a good artifact.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata stored next to each compiled artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Full content-address key.
    pub key: String,

    /// Module name derived from the key.
    pub module: String,

    /// Fortran compiler vendor label.
    pub fortran_compiler: String,

    /// Fortran compiler version banner at build time.
    pub compiler_version: String,

    /// C link driver vendor, if one was used.
    pub cc: Option<String>,

    /// Effective compile-stage flags.
    pub flags: Vec<String>,

    /// Resolved link-stage arguments.
    pub link_args: Vec<String>,

    /// File name of the generated source within the cache directory.
    pub source_file: String,

    /// File name of the artifact within the cache directory.
    pub artifact_file: String,

    /// Build duration in milliseconds.
    pub build_time_ms: u64,

    /// Unix timestamp of creation.
    pub created_at: u64,
}

impl ArtifactMetadata {
    /// Read and parse a metadata file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the metadata file (pretty-printed; these files are the user's
    /// only catalog and get read by humans).
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Whether this artifact was produced by the given compiler version.
    pub fn matches_toolchain(&self, version: &str) -> bool {
        self.compiler_version == version
    }
}

/// Current unix time in seconds.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ArtifactMetadata {
        ArtifactMetadata {
            key: "deadbeef".repeat(8),
            module: "vulcan_deadbeef".to_string(),
            fortran_compiler: "gfortran".to_string(),
            compiler_version: "GNU Fortran 13.2.0".to_string(),
            cc: None,
            flags: vec!["-O2".to_string(), "-fPIC".to_string()],
            link_args: vec!["-llapack".to_string()],
            source_file: "vulcan_deadbeef.f90".to_string(),
            artifact_file: "libvulcan_deadbeef.so".to_string(),
            build_time_ms: 412,
            created_at: now_unix(),
        }
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vulcan_deadbeef.json");

        let meta = sample();
        meta.write(&path).unwrap();

        let back = ArtifactMetadata::read(&path).unwrap();
        assert_eq!(back.key, meta.key);
        assert_eq!(back.flags, meta.flags);
        assert_eq!(back.build_time_ms, 412);
    }

    #[test]
    fn test_toolchain_match() {
        let meta = sample();
        assert!(meta.matches_toolchain("GNU Fortran 13.2.0"));
        assert!(!meta.matches_toolchain("GNU Fortran 14.1.0"));
    }

    #[test]
    fn test_corrupt_metadata_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vulcan_deadbeef.json");
        fs::write(&path, "{not json").unwrap();

        assert!(ArtifactMetadata::read(&path).is_err());
    }
}
