//! Toolchain discovery for vulcan compilation.
//!
//! Probes the PATH for Fortran and C compilers by vendor and captures their
//! version banners. Nothing here runs a compilation; selection of a vendor
//! that is not installed surfaces as a toolchain error at invocation time.

use std::path::{Path, PathBuf};
use std::process::Command;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Fortran compiler vendors vulcan knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum FortranVendor {
    Gfortran,
    Flang,
    Ifx,
    Ifort,
    Nvfortran,
}

impl FortranVendor {
    /// All vendors, in discovery priority order.
    pub const ALL: [FortranVendor; 5] = [
        Self::Gfortran,
        Self::Flang,
        Self::Ifx,
        Self::Ifort,
        Self::Nvfortran,
    ];

    /// Executable names probed for this vendor, most preferred first.
    pub fn executables(&self) -> &'static [&'static str] {
        match self {
            Self::Gfortran => &["gfortran"],
            Self::Flang => &["flang-new", "flang"],
            Self::Ifx => &["ifx"],
            Self::Ifort => &["ifort"],
            Self::Nvfortran => &["nvfortran"],
        }
    }

    /// Runtime libraries a C link driver must add for objects produced by
    /// this vendor.
    pub fn runtime_libs(&self) -> &'static [&'static str] {
        match self {
            Self::Gfortran => &["gfortran"],
            Self::Flang => &["flang_rt.runtime"],
            Self::Ifx | Self::Ifort => &["ifcore"],
            Self::Nvfortran => &["nvf"],
        }
    }

    /// Vendor label used in listings and metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gfortran => "gfortran",
            Self::Flang => "flang",
            Self::Ifx => "ifx",
            Self::Ifort => "ifort",
            Self::Nvfortran => "nvfortran",
        }
    }
}

impl std::fmt::Display for FortranVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C compiler vendors usable as the link driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum CVendor {
    Gcc,
    Clang,
    Icx,
}

impl CVendor {
    /// All vendors, in discovery priority order.
    pub const ALL: [CVendor; 3] = [Self::Gcc, Self::Clang, Self::Icx];

    /// Executable names probed for this vendor.
    pub fn executables(&self) -> &'static [&'static str] {
        match self {
            Self::Gcc => &["gcc", "cc"],
            Self::Clang => &["clang"],
            Self::Icx => &["icx"],
        }
    }

    /// Vendor label used in listings and metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::Icx => "icx",
        }
    }
}

impl std::fmt::Display for CVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiler found on this machine.
#[derive(Debug, Clone)]
pub struct ResolvedCompiler {
    /// Vendor label (e.g. "gfortran").
    pub vendor: String,

    /// Absolute path of the executable.
    pub path: PathBuf,

    /// First line of `--version` output, or "unknown".
    pub version: String,
}

/// Discovers and hands out the external tools vulcan shells out to.
#[derive(Debug, Clone)]
pub struct ToolchainManager {
    fortran: FxHashMap<FortranVendor, ResolvedCompiler>,
    cc: FxHashMap<CVendor, ResolvedCompiler>,
    nm: Option<PathBuf>,
}

impl ToolchainManager {
    /// Probe the PATH for every known vendor.
    pub fn new() -> Self {
        let mut fortran = FxHashMap::default();
        for vendor in FortranVendor::ALL {
            if let Some(resolved) = find_compiler(vendor.as_str(), vendor.executables()) {
                tracing::debug!("found {}: {}", vendor, resolved.path.display());
                fortran.insert(vendor, resolved);
            }
        }

        let mut cc = FxHashMap::default();
        for vendor in CVendor::ALL {
            if let Some(resolved) = find_compiler(vendor.as_str(), vendor.executables()) {
                cc.insert(vendor, resolved);
            }
        }

        let nm = ["nm", "llvm-nm"]
            .iter()
            .find_map(|name| which::which(name).ok());

        Self { fortran, cc, nm }
    }

    /// Register an explicit Fortran compiler path, bypassing PATH discovery.
    pub fn with_fortran(mut self, vendor: FortranVendor, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let version = version_banner(&path);
        self.fortran.insert(
            vendor,
            ResolvedCompiler {
                vendor: vendor.as_str().to_string(),
                path,
                version,
            },
        );
        self
    }

    /// Register an explicit `nm` path.
    pub fn with_nm(mut self, path: impl Into<PathBuf>) -> Self {
        self.nm = Some(path.into());
        self
    }

    /// Resolve the Fortran compiler for a vendor choice.
    ///
    /// With no choice, the first vendor found in priority order is used.
    pub fn fortran(&self, choice: Option<FortranVendor>) -> Result<&ResolvedCompiler> {
        match choice {
            Some(vendor) => self.fortran.get(&vendor).ok_or_else(|| {
                Error::Toolchain(format!(
                    "Fortran compiler '{}' not found in PATH (looked for {})",
                    vendor,
                    vendor.executables().join(", ")
                ))
            }),
            None => FortranVendor::ALL
                .iter()
                .find_map(|v| self.fortran.get(v))
                .ok_or_else(|| {
                    Error::Toolchain("no Fortran compiler found in PATH".to_string())
                }),
        }
    }

    /// Resolve a C compiler vendor.
    pub fn cc(&self, vendor: CVendor) -> Result<&ResolvedCompiler> {
        self.cc.get(&vendor).ok_or_else(|| {
            Error::Toolchain(format!(
                "C compiler '{}' not found in PATH (looked for {})",
                vendor,
                vendor.executables().join(", ")
            ))
        })
    }

    /// Every known Fortran vendor with its discovery result.
    pub fn fortran_compilers(&self) -> Vec<(FortranVendor, Option<&ResolvedCompiler>)> {
        FortranVendor::ALL
            .iter()
            .map(|&v| (v, self.fortran.get(&v)))
            .collect()
    }

    /// Every known C vendor with its discovery result.
    pub fn c_compilers(&self) -> Vec<(CVendor, Option<&ResolvedCompiler>)> {
        CVendor::ALL.iter().map(|&v| (v, self.cc.get(&v))).collect()
    }

    /// The symbol lister used to enumerate artifact exports.
    pub fn nm_path(&self) -> Result<&Path> {
        self.nm.as_deref().ok_or_else(|| {
            Error::Toolchain("nm not found in PATH (needed to enumerate symbols)".to_string())
        })
    }
}

impl Default for ToolchainManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Probe one vendor's executable names on the PATH.
fn find_compiler(vendor: &str, names: &[&str]) -> Option<ResolvedCompiler> {
    for name in names {
        if let Ok(path) = which::which(name) {
            let version = version_banner(&path);
            return Some(ResolvedCompiler {
                vendor: vendor.to_string(),
                path,
                version,
            });
        }
    }
    None
}

/// First line of `--version` output. Best-effort; discovery must not fail
/// because a compiler prints its banner oddly.
fn version_banner(path: &Path) -> String {
    let output = Command::new(path).arg("--version").output();
    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .lines()
            .next()
            .unwrap_or("unknown")
            .trim()
            .to_string(),
        _ => "unknown".to_string(),
    }
}
