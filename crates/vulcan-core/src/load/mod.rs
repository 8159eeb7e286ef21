//! Dynamic loading and the session namespace.
//!
//! ```text
//! CompiledModule
//!     │
//!     └── LoadedModule (artifact mapped via libloading, exports via nm)
//!             │
//!             └── Namespace::merge → explicit name → SymbolHandle map
//! ```
//!
//! # Module Structure
//!
//! - `symbols` - exported-symbol enumeration and Fortran demangling
//! - `module` - the loaded-artifact wrapper
//! - `namespace` - name → handle map with silent-overwrite merge

mod module;
mod namespace;
mod symbols;

pub use module::LoadedModule;
pub use namespace::{Namespace, SymbolHandle};
pub use symbols::{ExportedSymbol, SymbolKind, exported_symbols};
