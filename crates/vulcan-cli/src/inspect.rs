//! Introspection commands: what compilers and link resources exist here.
//!
//! These never compile anything and never touch the cache.

use vulcan_core::{LinkOrigin, LinkRegistry, ToolchainManager};

use crate::colors;

/// List the Fortran and C compilers found on this machine.
pub fn compilers() -> anyhow::Result<()> {
    let toolchain = ToolchainManager::new();

    println!("\n{}Fortran compilers:{}", colors::BOLD, colors::RESET);
    for (vendor, resolved) in toolchain.fortran_compilers() {
        match resolved {
            Some(c) => println!(
                "  {}{:<12}{} {}  {}{}{}",
                colors::GREEN,
                vendor,
                colors::RESET,
                c.path.display(),
                colors::DIM,
                c.version,
                colors::RESET
            ),
            None => println!(
                "  {}{:<12}{} not found",
                colors::DIM,
                vendor,
                colors::RESET
            ),
        }
    }

    println!("\n{}C compilers:{}", colors::BOLD, colors::RESET);
    for (vendor, resolved) in toolchain.c_compilers() {
        match resolved {
            Some(c) => println!(
                "  {}{:<12}{} {}  {}{}{}",
                colors::GREEN,
                vendor,
                colors::RESET,
                c.path.display(),
                colors::DIM,
                c.version,
                colors::RESET
            ),
            None => println!(
                "  {}{:<12}{} not found",
                colors::DIM,
                vendor,
                colors::RESET
            ),
        }
    }

    Ok(())
}

/// List known link resources, or resolve a single one.
pub fn links(resource: Option<&str>) -> anyhow::Result<()> {
    let registry = LinkRegistry::new();

    match resource {
        Some(name) => {
            let resolved = registry.resolve(name);
            println!(
                "{}{}{} -> {}",
                colors::BOLD,
                resolved.name,
                colors::RESET,
                resolved.args.join(" ")
            );
            println!(
                "  {}via {}{}",
                colors::DIM,
                match resolved.origin {
                    LinkOrigin::PkgConfig => "pkg-config",
                    LinkOrigin::Fallback => "fallback naming",
                },
                colors::RESET
            );
        }
        None => {
            println!("\n{}Link resources:{}", colors::BOLD, colors::RESET);
            for (name, description, resolved) in registry.known() {
                println!(
                    "  {}{:<12}{} {:<40} {}{}{}",
                    colors::CYAN,
                    name,
                    colors::RESET,
                    description,
                    colors::DIM,
                    resolved.args.join(" "),
                    colors::RESET
                );
            }
            if !registry.has_pkg_config() {
                println!(
                    "\n{}pkg-config not found; showing fallback spellings{}",
                    colors::YELLOW,
                    colors::RESET
                );
            }
        }
    }

    Ok(())
}
