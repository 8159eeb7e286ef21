//! Compilation pipeline for vulcan cells.
//!
//! ```text
//! FortranCell
//!     │
//!     ├── fingerprint  → content-address key / module name
//!     │
//!     └── ModuleCompiler
//!             ├── cache probe (metadata-validated)
//!             ├── <fc> -c -fPIC ...      (object)
//!             └── <driver> -shared ...   (artifact + metadata)
//! ```
//!
//! # Module Structure
//!
//! - `types` - config, compiled-module and result types
//! - `toolchain` - compiler discovery by vendor
//! - `fingerprint` - content-addressed cache keys
//! - `link` - `--link` resource resolution
//! - `metadata` - per-artifact metadata files
//! - `invoke` - the external compiler invocation itself

pub mod fingerprint;
mod invoke;
mod link;
mod metadata;
pub mod toolchain;
pub mod types;

pub use invoke::ModuleCompiler;
pub use link::{LinkOrigin, LinkRegistry, LinkResource};
pub use metadata::ArtifactMetadata;
pub use toolchain::{CVendor, FortranVendor, ResolvedCompiler, ToolchainManager};
pub use types::{CompilationResult, CompiledModule, CompilerConfig, SourceForm};
