//! Vulcan CLI - compile Fortran cells on the fly and load their symbols.

mod cache;
mod colors;
mod compile;
mod inspect;
mod run;
mod watch;

use clap::{Parser, Subcommand};
use vulcan_core::CellArgs;

#[derive(Parser)]
#[command(name = "vulcan")]
#[command(about = "Compile Fortran cells on the fly and load their symbols")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Fortran cell (cache-aware), load it, and print its symbols
    Run {
        /// Path to the Fortran source (.f90, .f, ...)
        source: String,

        #[command(flatten)]
        args: CellArgs,
    },

    /// Compile a cell into the cache without loading it
    Compile {
        /// Path to the Fortran source
        source: String,

        #[command(flatten)]
        args: CellArgs,

        /// Recompile even if a valid cached artifact exists
        #[arg(long)]
        force: bool,
    },

    /// List the Fortran and C compilers found on this machine
    Compilers,

    /// List link resources, or show what one resolves to
    Links {
        /// Resource name (e.g. lapack); omit to list all known resources
        resource: Option<String>,
    },

    /// List cached artifacts
    List,

    /// Remove every cached source and artifact
    Clean,

    /// Watch a source file and recompile-and-reload on change
    Watch {
        /// Path to the Fortran source
        source: String,

        #[command(flatten)]
        args: CellArgs,

        /// Clear screen before each run
        #[arg(long, default_value = "true")]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Helper to format vulcan-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<vulcan_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Run { source, args } => run::execute(&source, args).map_err(format_error)?,

        Commands::Compile {
            source,
            args,
            force,
        } => compile::execute(&source, args, force).map_err(format_error)?,

        Commands::Compilers => inspect::compilers().map_err(format_error)?,

        Commands::Links { resource } => {
            inspect::links(resource.as_deref()).map_err(format_error)?;
        }

        Commands::List => cache::list().map_err(format_error)?,

        Commands::Clean => cache::clean().map_err(format_error)?,

        Commands::Watch {
            source,
            args,
            clear,
        } => watch::execute(&source, args, clear).await.map_err(format_error)?,
    }

    Ok(())
}
