//! Core engine for the vulcan Fortran compile-and-load tool.
//!
//! This crate provides:
//! - Cell directive parsing (the `%%fortran` flag line)
//! - Content-addressed artifact cache with per-artifact metadata
//! - Fortran toolchain discovery and invocation
//! - Dynamic loading and exported-symbol enumeration
//! - Session namespace with explicit symbol-handle injection

pub mod compile;
pub mod directive;
pub mod error;
pub mod load;
pub mod paths;
pub mod session;

pub use compile::{
    ArtifactMetadata, CVendor, CompilationResult, CompiledModule, CompilerConfig, FortranVendor,
    LinkOrigin, LinkRegistry, LinkResource, ModuleCompiler, SourceForm, ToolchainManager,
};
pub use directive::{CellArgs, FortranCell};
pub use error::{Error, Result};
pub use load::{ExportedSymbol, LoadedModule, Namespace, SymbolHandle, SymbolKind};
pub use paths::CacheDir;
pub use session::{EvalOutcome, Session};
