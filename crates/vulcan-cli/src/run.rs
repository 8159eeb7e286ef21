//! Run command implementation for the vulcan CLI.
//!
//! Compiles a cell (cache-aware), loads the artifact, and prints the
//! injected name → symbol table.

use std::path::Path;
use std::time::Instant;

use vulcan_core::{CacheDir, CellArgs, EvalOutcome, Session, SymbolKind};

use crate::colors;

/// Execute a cell once in a fresh session.
pub fn execute(source: &str, args: CellArgs) -> anyhow::Result<()> {
    let path = Path::new(source);
    if !path.exists() {
        anyhow::bail!("Source not found: {source}");
    }

    let start = Instant::now();

    let cache = CacheDir::from_env()?;
    let mut session = Session::new(cache);
    session.set_defaults(args);

    print_header(source);
    let outcome = session.eval_file(path)?;
    print_outcome(&session, &outcome);

    println!(
        "\n{}Done{} in {:.2}s",
        colors::GREEN,
        colors::RESET,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Print the run header.
pub fn print_header(source: &str) {
    println!(
        "\n{}Vulcan{} - {}{}{}",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        source,
        colors::RESET
    );
    println!("{}", "─".repeat(50));
}

/// Print what an eval did: build status plus the injected symbol table.
pub fn print_outcome(session: &Session, outcome: &EvalOutcome) {
    if outcome.cached {
        println!(
            "{}Reused{} cached artifact {}",
            colors::YELLOW,
            colors::RESET,
            outcome.module
        );
    } else {
        println!(
            "{}Compiled{} {} in {}ms",
            colors::GREEN,
            colors::RESET,
            outcome.module,
            outcome.compile_time_ms
        );
    }

    println!("\n{}Symbols:{}", colors::BOLD, colors::RESET);
    for name in &outcome.injected {
        let Some(handle) = session.namespace().get(name) else {
            continue;
        };
        let (kind, color) = match handle.kind() {
            SymbolKind::Function => ("function", colors::CYAN),
            SymbolKind::Data => ("data", colors::BLUE),
        };
        println!(
            "  {}{:<28}{} {}{:<10}{} {}{}{}",
            colors::BOLD,
            name,
            colors::RESET,
            color,
            kind,
            colors::RESET,
            colors::DIM,
            handle.mangled(),
            colors::RESET
        );
    }

    println!(
        "\nInjected {} symbol{} from {}",
        outcome.injected.len(),
        if outcome.injected.len() == 1 { "" } else { "s" },
        outcome.module
    );
}
