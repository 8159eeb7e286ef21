//! Exported-symbol enumeration.
//!
//! The public surface of a compiled artifact is read from its dynamic
//! symbol table via the toolchain's own `nm` (`-D --defined-only` in POSIX
//! format), keeping defined global symbols and dropping the handful the
//! linker itself defines. Fortran name mangling is undone for display:
//! a trailing underscore is stripped, and gfortran module procedures
//! (`__mod_MOD_proc`) become `mod.proc`. The mangled spelling is retained
//! on each symbol for FFI lookup.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Symbols the linker defines in every shared object; never user surface.
const LINKER_SYMBOLS: [&str; 5] = ["_init", "_fini", "_edata", "_end", "__bss_start"];

/// Broad classification of an exported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Text-section symbol: subroutine or function.
    Function,
    /// Data-section symbol: module variable or COMMON block.
    Data,
}

/// One entry of an artifact's public surface.
#[derive(Debug, Clone)]
pub struct ExportedSymbol {
    /// Demangled public name (namespace key).
    pub name: String,

    /// Symbol name as it appears in the dynamic table (FFI lookup key).
    pub mangled: String,

    /// Function or data.
    pub kind: SymbolKind,

    /// Symbol value as reported by nm.
    pub address: u64,
}

/// Enumerate the public symbols of a compiled artifact.
pub fn exported_symbols(nm: &Path, artifact: &Path) -> Result<Vec<ExportedSymbol>> {
    let output = Command::new(nm)
        .arg("-D")
        .arg("--defined-only")
        .arg("--format=posix")
        .arg(artifact)
        .output()
        .map_err(|e| Error::Symbols(format!("failed to run {}: {e}", nm.display())))?;

    if !output.status.success() {
        return Err(Error::Symbols(format!(
            "nm failed on {}: {}",
            artifact.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(parse_nm_output(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse POSIX-format nm output into the public symbol list.
fn parse_nm_output(text: &str) -> Vec<ExportedSymbol> {
    let mut symbols = Vec::new();

    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let (Some(mangled), Some(kind_field)) = (fields.next(), fields.next()) else {
            continue;
        };
        let Some(kind_char) = kind_field.chars().next() else {
            continue;
        };

        // Uppercase means global; only T (text), and D/B/R (data) are the
        // artifact's own surface. Weak and undefined entries are not.
        let kind = match kind_char {
            'T' => SymbolKind::Function,
            'D' | 'B' | 'R' => SymbolKind::Data,
            _ => continue,
        };

        if LINKER_SYMBOLS.contains(&mangled) {
            continue;
        }

        let address = fields
            .next()
            .and_then(|v| u64::from_str_radix(v, 16).ok())
            .unwrap_or(0);

        symbols.push(ExportedSymbol {
            name: public_name(mangled),
            mangled: mangled.to_string(),
            kind,
            address,
        });
    }

    symbols.sort_by(|a, b| a.name.cmp(&b.name));
    symbols
}

/// Undo Fortran name mangling for display.
fn public_name(mangled: &str) -> String {
    if let Some(rest) = mangled.strip_prefix("__")
        && let Some((module, proc)) = rest.split_once("_MOD_")
    {
        return format!("{module}.{proc}");
    }
    mangled.strip_suffix('_').unwrap_or(mangled).to_string()
}
