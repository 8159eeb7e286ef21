//! Common types for the compilation pipeline.

use std::path::{Path, PathBuf};

use crate::directive::CellArgs;

use super::toolchain::{CVendor, FortranVendor};

/// Fortran source form. Decides the file extension the source is written
/// under and which per-form flag set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceForm {
    /// Free-form source (`.f90`), takes `--f90flags`.
    Free,
    /// Fixed-form source (`.f`), takes `--f77flags`.
    Fixed,
}

impl SourceForm {
    /// Infer the form from a file extension. Anything that is not a known
    /// fixed-form suffix is treated as free form.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("f") | Some("for") | Some("f77") => Self::Fixed,
            _ => Self::Free,
        }
    }

    /// File extension sources of this form are written under.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Free => "f90",
            Self::Fixed => "f",
        }
    }
}

/// Resolved compiler settings for one invocation.
///
/// Derived from the merged cell/CLI arguments; everything here is already
/// validated except for the vendor's presence on this machine, which the
/// toolchain resolves at invocation time.
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    /// Fortran vendor choice; `None` means the first vendor found on PATH.
    pub fortran: Option<FortranVendor>,

    /// C compiler used as the link driver, if any.
    pub cc: Option<CVendor>,

    /// Flags applied to fixed-form sources.
    pub f77_flags: Vec<String>,

    /// Flags applied to free-form sources.
    pub f90_flags: Vec<String>,

    /// Optimization flags.
    pub opt_flags: Vec<String>,

    /// Architecture-specific flags.
    pub arch_flags: Vec<String>,

    /// Emit debug info.
    pub debug_info: bool,

    /// Link resource names to resolve and pass to the link stage.
    pub link: Vec<String>,
}

impl CompilerConfig {
    /// Build a config from merged cell arguments.
    pub fn from_args(args: &CellArgs) -> Self {
        let opt_flags = if args.noopt {
            vec!["-O0".to_string()]
        } else {
            split_flags(args.opt.as_deref().unwrap_or("-O2"))
        };

        let arch_flags = if args.noarch {
            Vec::new()
        } else {
            args.arch.as_deref().map(split_flags).unwrap_or_default()
        };

        Self {
            fortran: args.fcompiler,
            cc: args.compiler,
            f77_flags: args.f77flags.as_deref().map(split_flags).unwrap_or_default(),
            f90_flags: args.f90flags.as_deref().map(split_flags).unwrap_or_default(),
            opt_flags,
            arch_flags,
            debug_info: args.debug,
            link: args.link.clone(),
        }
    }

    /// The flag set for the compile stage of a source of the given form.
    pub fn compile_flags(&self, form: SourceForm) -> Vec<String> {
        let mut flags = Vec::new();
        flags.extend(self.opt_flags.iter().cloned());
        flags.extend(self.arch_flags.iter().cloned());
        if self.debug_info {
            flags.push("-g".to_string());
        }
        match form {
            SourceForm::Free => flags.extend(self.f90_flags.iter().cloned()),
            SourceForm::Fixed => flags.extend(self.f77_flags.iter().cloned()),
        }
        flags
    }
}

/// Split a flag string from a directive value into individual arguments.
fn split_flags(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

/// A successfully produced (or reused) artifact.
#[derive(Debug, Clone)]
pub struct CompiledModule {
    /// Module name, `vulcan_` + key prefix.
    pub name: String,

    /// Full content-address key (BLAKE3 hex).
    pub key: String,

    /// Path of the generated source file.
    pub source_path: PathBuf,

    /// Path of the compiled shared library.
    pub artifact_path: PathBuf,

    /// Compilation time in milliseconds (0 for cache hits).
    pub compile_time_ms: u64,
}

/// Result of a compilation operation.
#[derive(Debug)]
pub enum CompilationResult {
    /// The toolchain produced a fresh artifact.
    Success(CompiledModule),

    /// A valid cached artifact was reused; no compiler ran.
    Cached(CompiledModule),

    /// The toolchain exited non-zero. Carries its captured output verbatim.
    Failed { module: String, output: String },
}

impl CompilationResult {
    /// Returns true if an artifact is available (fresh or cached).
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Cached(_))
    }

    /// The compiled module, if one is available.
    pub fn module(&self) -> Option<&CompiledModule> {
        match self {
            Self::Success(m) | Self::Cached(m) => Some(m),
            Self::Failed { .. } => None,
        }
    }
}

/// Platform-specific dynamic library extension.
pub fn dylib_extension() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "dll"
    }
    #[cfg(target_os = "macos")]
    {
        "dylib"
    }
    #[cfg(target_os = "linux")]
    {
        "so"
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        "so" // Default to .so for unknown platforms
    }
}

/// Platform-specific dynamic library prefix.
pub fn dylib_prefix() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        ""
    }
    #[cfg(not(target_os = "windows"))]
    {
        "lib"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::from_args(&CellArgs::default());
        assert_eq!(config.opt_flags, vec!["-O2"]);
        assert!(!config.debug_info);
        assert!(config.fortran.is_none());
    }

    #[test]
    fn test_noopt_wins_over_opt() {
        let args = CellArgs {
            opt: Some("-O3".to_string()),
            noopt: true,
            ..Default::default()
        };
        let config = CompilerConfig::from_args(&args);
        assert_eq!(config.opt_flags, vec!["-O0"]);
    }

    #[test]
    fn test_form_flag_selection() {
        let args = CellArgs {
            f90flags: Some("-fopenmp -ffast-math".to_string()),
            f77flags: Some("-std=legacy".to_string()),
            debug: true,
            ..Default::default()
        };
        let config = CompilerConfig::from_args(&args);

        let free = config.compile_flags(SourceForm::Free);
        assert!(free.contains(&"-fopenmp".to_string()));
        assert!(free.contains(&"-ffast-math".to_string()));
        assert!(free.contains(&"-g".to_string()));
        assert!(!free.contains(&"-std=legacy".to_string()));

        let fixed = config.compile_flags(SourceForm::Fixed);
        assert!(fixed.contains(&"-std=legacy".to_string()));
        assert!(!fixed.contains(&"-fopenmp".to_string()));
    }

    #[test]
    fn test_form_from_path() {
        assert_eq!(SourceForm::from_path(Path::new("a.f90")), SourceForm::Free);
        assert_eq!(SourceForm::from_path(Path::new("a.f03")), SourceForm::Free);
        assert_eq!(SourceForm::from_path(Path::new("a.f")), SourceForm::Fixed);
        assert_eq!(SourceForm::from_path(Path::new("a.for")), SourceForm::Fixed);
    }

    #[test]
    fn test_dylib_extension() {
        let ext = dylib_extension();
        #[cfg(target_os = "linux")]
        assert_eq!(ext, "so");
        #[cfg(target_os = "macos")]
        assert_eq!(ext, "dylib");
        #[cfg(target_os = "windows")]
        assert_eq!(ext, "dll");
    }
}
