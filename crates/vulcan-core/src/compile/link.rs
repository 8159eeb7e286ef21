//! Link-resource resolution.
//!
//! A `--link <resource>` option names a library bundle by purpose rather
//! than by linker flag. Resolution asks `pkg-config` when it is installed
//! and falls back to the conventional `-l<name>` otherwise; unknown names
//! fall through to `-l<name>` verbatim, so the flag never silently drops an
//! argument.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Resources with a known description or a non-obvious fallback spelling.
const KNOWN_RESOURCES: &[(&str, &str, &[&str])] = &[
    ("lapack", "LAPACK linear algebra routines", &["-llapack"]),
    ("blas", "Reference BLAS", &["-lblas"]),
    ("openblas", "OpenBLAS optimized BLAS/LAPACK", &["-lopenblas"]),
    ("fftw3", "FFTW fast Fourier transforms", &["-lfftw3"]),
    ("openmp", "OpenMP runtime", &["-fopenmp"]),
    ("m", "C math library", &["-lm"]),
];

/// Where a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrigin {
    /// Arguments reported by `pkg-config --libs`.
    PkgConfig,
    /// Conventional `-l` fallback.
    Fallback,
}

/// A resolved link resource.
#[derive(Debug, Clone)]
pub struct LinkResource {
    /// Resource name as requested.
    pub name: String,

    /// Linker arguments to append to the link stage.
    pub args: Vec<String>,

    /// How the arguments were obtained.
    pub origin: LinkOrigin,
}

/// Resolves `--link` resource names to linker arguments.
#[derive(Debug, Clone)]
pub struct LinkRegistry {
    pkg_config: Option<PathBuf>,
}

impl LinkRegistry {
    /// Probe for `pkg-config` once; resolution is per-resource after that.
    pub fn new() -> Self {
        Self {
            pkg_config: which::which("pkg-config").ok(),
        }
    }

    /// Registry that never consults `pkg-config` (tests use this to get
    /// machine-independent resolutions).
    pub fn without_pkg_config() -> Self {
        Self { pkg_config: None }
    }

    /// Resolve one resource name to linker arguments.
    pub fn resolve(&self, name: &str) -> LinkResource {
        if let Some(pc) = &self.pkg_config
            && let Some(args) = pkg_config_libs(pc, name)
        {
            return LinkResource {
                name: name.to_string(),
                args,
                origin: LinkOrigin::PkgConfig,
            };
        }

        let args = KNOWN_RESOURCES
            .iter()
            .find(|(known, _, _)| *known == name)
            .map(|(_, _, fallback)| fallback.iter().map(|s| s.to_string()).collect())
            .unwrap_or_else(|| vec![format!("-l{name}")]);

        LinkResource {
            name: name.to_string(),
            args,
            origin: LinkOrigin::Fallback,
        }
    }

    /// Resolve a list of resources, flattening the linker arguments.
    pub fn resolve_all(&self, names: &[String]) -> Vec<LinkResource> {
        names.iter().map(|n| self.resolve(n)).collect()
    }

    /// Known resources with their descriptions and current resolutions,
    /// for the `links` introspection listing.
    pub fn known(&self) -> Vec<(&'static str, &'static str, LinkResource)> {
        KNOWN_RESOURCES
            .iter()
            .map(|(name, desc, _)| (*name, *desc, self.resolve(name)))
            .collect()
    }

    /// Whether `pkg-config` was found.
    pub fn has_pkg_config(&self) -> bool {
        self.pkg_config.is_some()
    }
}

impl Default for LinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `pkg-config --libs <name>`, if the resource is known to pkg-config.
fn pkg_config_libs(pkg_config: &Path, name: &str) -> Option<Vec<String>> {
    let output = Command::new(pkg_config)
        .args(["--libs", name])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let args: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if args.is_empty() { None } else { Some(args) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_fallbacks() {
        let registry = LinkRegistry::without_pkg_config();

        let lapack = registry.resolve("lapack");
        assert_eq!(lapack.args, vec!["-llapack"]);
        assert_eq!(lapack.origin, LinkOrigin::Fallback);

        let openmp = registry.resolve("openmp");
        assert_eq!(openmp.args, vec!["-fopenmp"]);
    }

    #[test]
    fn test_unknown_resource_passes_through() {
        let registry = LinkRegistry::without_pkg_config();
        let custom = registry.resolve("mysolver");
        assert_eq!(custom.args, vec!["-lmysolver"]);
    }

    #[test]
    fn test_resolve_all_preserves_request_order() {
        let registry = LinkRegistry::without_pkg_config();
        let resolved =
            registry.resolve_all(&["lapack".to_string(), "m".to_string()]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "lapack");
        assert_eq!(resolved[1].name, "m");
    }

    #[test]
    fn test_known_listing_is_complete() {
        let registry = LinkRegistry::without_pkg_config();
        let known = registry.known();
        assert_eq!(known.len(), KNOWN_RESOURCES.len());
        assert!(known.iter().any(|(name, _, _)| *name == "lapack"));
    }
}
