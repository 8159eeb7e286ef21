//! Error types for vulcan-core.

use thiserror::Error;

/// Result type for vulcan-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vulcan-core.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid directive or command arguments. Raised before any file I/O.
    #[error("usage error: {0}")]
    Usage(String),

    /// A required external tool is missing or unusable.
    #[error("toolchain error: {0}")]
    Toolchain(String),

    /// The external compiler exited non-zero. Carries the captured output.
    #[error("compilation failed for module {module}:\n{output}")]
    Compile { module: String, output: String },

    /// Failed to load a compiled artifact.
    #[error("failed to load library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// Failed to enumerate exported symbols from an artifact.
    #[error("symbol enumeration failed: {0}")]
    Symbols(String),

    /// Artifact metadata could not be read or written.
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Format the error with a recovery hint where one exists.
    pub fn with_hint(&self) -> String {
        match self {
            Self::Toolchain(_) => format!(
                "{self}\n\nhint: run `vulcan compilers` to see which compilers were found on PATH"
            ),
            Self::Compile { .. } => format!(
                "{self}\n\nhint: the output above is the compiler's own diagnostic; \
                 pass --debug or adjust --opt/--arch flags in the cell directive"
            ),
            Self::Usage(_) => format!(
                "{self}\n\nhint: see `vulcan run --help` for the recognized cell options"
            ),
            _ => self.to_string(),
        }
    }
}
