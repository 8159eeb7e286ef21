//! Watch command implementation for the vulcan CLI.
//!
//! Watches a Fortran source file and recompiles-and-reloads it on change.
//! The session persists across runs, so unchanged cells are cache hits and
//! the namespace accumulates rebinds the way an interactive session would.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify_debouncer_mini::{DebounceEventResult, new_debouncer, notify::RecursiveMode};
use tokio::sync::mpsc;

use vulcan_core::{CacheDir, CellArgs, Session};

use crate::colors;
use crate::run::{print_header, print_outcome};

/// Source extensions that trigger a re-run.
const FORTRAN_EXTENSIONS: [&str; 7] = ["f90", "f95", "f03", "f08", "f", "for", "f77"];

/// File change event.
#[derive(Debug, Clone)]
enum FileEvent {
    /// File was modified (or recreated).
    Modified(PathBuf),
    /// File was removed.
    Removed(PathBuf),
}

/// File watcher handle.
struct FileWatcher {
    /// Debouncer handle (kept alive to maintain watcher).
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    /// Receiver for file events.
    rx: mpsc::UnboundedReceiver<FileEvent>,
}

impl FileWatcher {
    /// Watch the directory containing `path`, reporting events for the
    /// target file only.
    fn new(path: &Path) -> anyhow::Result<Self> {
        let target = Arc::new(path.to_path_buf());
        let watch_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let (tx, rx) = mpsc::unbounded_channel();
        let filter_target = Arc::clone(&target);

        let mut debouncer = new_debouncer(
            Duration::from_millis(200),
            move |result: DebounceEventResult| {
                if let Ok(events) = result {
                    for event in events {
                        let event_path = &event.path;

                        // Filter to Fortran sources.
                        let is_fortran = event_path
                            .extension()
                            .and_then(|e| e.to_str())
                            .is_some_and(|e| FORTRAN_EXTENSIONS.contains(&e));
                        if !is_fortran || event_path != filter_target.as_ref() {
                            continue;
                        }

                        let file_event = if event_path.exists() {
                            FileEvent::Modified(event_path.clone())
                        } else {
                            FileEvent::Removed(event_path.clone())
                        };

                        let _ = tx.send(file_event);
                    }
                }
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to create file watcher: {e}"))?;

        debouncer
            .watcher()
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow::anyhow!("Failed to watch {}: {e}", watch_dir.display()))?;

        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Receive the next file event.
    async fn recv(&mut self) -> Option<FileEvent> {
        self.rx.recv().await
    }
}

/// Execute the watch command.
pub async fn execute(source: &str, args: CellArgs, clear_screen: bool) -> anyhow::Result<()> {
    let path = Path::new(source);
    if !path.exists() {
        anyhow::bail!("Source not found: {source}");
    }
    let abs_path = path.canonicalize()?;

    let cache = CacheDir::from_env()?;
    let mut session = Session::new(cache);
    session.set_defaults(args);

    println!(
        "{}Watching for changes... (Ctrl+C to stop){}",
        colors::DIM,
        colors::RESET
    );

    // Initial run
    if clear_screen {
        clear_terminal();
    }
    run_once(&mut session, source, &abs_path);

    let mut watcher = FileWatcher::new(&abs_path)?;

    // Watch loop
    loop {
        tokio::select! {
            event = watcher.recv() => match event {
                Some(FileEvent::Modified(_)) => {
                    if clear_screen {
                        clear_terminal();
                    } else {
                        println!(
                            "\n{}File changed, re-running...{}",
                            colors::YELLOW,
                            colors::RESET
                        );
                    }
                    run_once(&mut session, source, &abs_path);
                }
                Some(FileEvent::Removed(path)) => {
                    eprintln!(
                        "\n{}Warning:{} source file removed: {}",
                        colors::YELLOW,
                        colors::RESET,
                        path.display()
                    );
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}Stopped{}", colors::DIM, colors::RESET);
                break;
            }
        }
    }

    Ok(())
}

/// Clear the terminal screen.
fn clear_terminal() {
    print!("\x1B[2J\x1B[1;1H");
    colors::flush_stdout();
}

/// Evaluate the file once, reporting errors without leaving the loop.
fn run_once(session: &mut Session, source: &str, abs_path: &Path) {
    print_header(source);

    match session.eval_file(abs_path) {
        Ok(outcome) => print_outcome(session, &outcome),
        Err(e) => eprintln!("{}Error:{} {}", colors::RED, colors::RESET, e.with_hint()),
    }

    println!(
        "\n{}Watching for changes... (Ctrl+C to stop){}",
        colors::DIM,
        colors::RESET
    );
}
