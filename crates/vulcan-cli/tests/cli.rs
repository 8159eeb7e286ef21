//! End-to-end tests for the vulcan CLI.
//!
//! Introspection and error-path tests run everywhere; the compile tests
//! skip themselves when gfortran is not installed.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin for tests

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// A scratch cache directory plus a source file to compile.
struct TestCell {
    temp_dir: TempDir,
    source_path: PathBuf,
}

impl TestCell {
    fn new(filename: &str, source: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source_path = temp_dir.path().join(filename);
        fs::write(&source_path, source).expect("Failed to write source");

        Self {
            temp_dir,
            source_path,
        }
    }

    fn cache_dir(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    fn vulcan(&self) -> Command {
        let mut cmd = Command::cargo_bin("vulcan").expect("Failed to find vulcan binary");
        cmd.env("VULCAN_CACHE_DIR", self.cache_dir());
        cmd
    }
}

fn gfortran_available() -> bool {
    std::process::Command::new("gfortran")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

const ADD_ONE: &str = "\
subroutine f1(x, y)
  real, intent(in) :: x
  real, intent(out) :: y
  y = x + 1.0
end subroutine f1
";

// =============================================================================
// Introspection
// =============================================================================

#[test]
fn test_compilers_lists_every_vendor() {
    let cell = TestCell::new("unused.f90", "");
    cell.vulcan()
        .arg("compilers")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fortran compilers:"))
        .stdout(predicate::str::contains("gfortran"))
        .stdout(predicate::str::contains("C compilers:"));
}

#[test]
fn test_links_lists_known_resources() {
    let cell = TestCell::new("unused.f90", "");
    cell.vulcan()
        .arg("links")
        .assert()
        .success()
        .stdout(predicate::str::contains("lapack"))
        .stdout(predicate::str::contains("openblas"));
}

#[test]
fn test_links_resolves_unknown_resource_verbatim() {
    let cell = TestCell::new("unused.f90", "");
    cell.vulcan()
        .args(["links", "mysolver"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-lmysolver"));
}

#[test]
fn test_introspection_writes_nothing_to_the_cache() {
    let cell = TestCell::new("unused.f90", "");

    cell.vulcan().arg("compilers").assert().success();
    cell.vulcan().arg("links").assert().success();

    // The cache directory was never even created.
    assert!(!cell.cache_dir().exists());
}

// =============================================================================
// Error paths
// =============================================================================

#[test]
fn test_run_missing_source_fails() {
    let cell = TestCell::new("unused.f90", "");
    cell.vulcan()
        .args(["run", "no_such_file.f90"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source not found"));
}

#[test]
fn test_unknown_flag_is_rejected_before_io() {
    let cell = TestCell::new("cell.f90", ADD_ONE);
    cell.vulcan()
        .args(["run", cell.source_path.to_str().unwrap(), "--frobnicate"])
        .assert()
        .failure();

    assert!(!cell.cache_dir().exists());
}

#[test]
fn test_bad_directive_is_rejected_before_io() {
    let cell = TestCell::new("cell.f90", "!%%fortran --bogus\nend\n");
    cell.vulcan()
        .args(["run", cell.source_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage error"));

    // The cache dir exists (the session opened it) but holds no artifacts.
    let entries: Vec<_> = fs::read_dir(cell.cache_dir())
        .map(|it| it.flatten().collect())
        .unwrap_or_default();
    assert!(entries.is_empty());
}

// =============================================================================
// Cache commands
// =============================================================================

#[test]
fn test_list_reports_empty_cache() {
    let cell = TestCell::new("unused.f90", "");
    cell.vulcan()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty"));
}

#[test]
fn test_clean_empties_the_cache() {
    let cell = TestCell::new("unused.f90", "");
    fs::create_dir_all(cell.cache_dir()).unwrap();
    fs::write(cell.cache_dir().join("leftover.json"), "{}").unwrap();

    cell.vulcan()
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned"));

    let entries: Vec<_> = fs::read_dir(cell.cache_dir()).unwrap().flatten().collect();
    assert!(entries.is_empty());
}

// =============================================================================
// Compile paths (need a real toolchain)
// =============================================================================

#[test]
fn test_run_injects_and_reports_symbols() {
    if !gfortran_available() {
        eprintln!("skipping: gfortran not found in PATH");
        return;
    }

    let cell = TestCell::new("cell.f90", ADD_ONE);
    cell.vulcan()
        .args(["run", cell.source_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled"))
        .stdout(predicate::str::contains("f1"))
        .stdout(predicate::str::contains("Injected 1 symbol"));
}

#[test]
fn test_second_run_reuses_cache() {
    if !gfortran_available() {
        eprintln!("skipping: gfortran not found in PATH");
        return;
    }

    let cell = TestCell::new("cell.f90", ADD_ONE);
    let source = cell.source_path.to_str().unwrap().to_string();

    cell.vulcan().args(["run", &source]).assert().success();
    cell.vulcan()
        .args(["run", &source])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reused"));
}

#[test]
fn test_compile_then_list_catalogs_the_artifact() {
    if !gfortran_available() {
        eprintln!("skipping: gfortran not found in PATH");
        return;
    }

    let cell = TestCell::new("cell.f90", ADD_ONE);
    cell.vulcan()
        .args(["compile", cell.source_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled"));

    cell.vulcan()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("vulcan_"))
        .stdout(predicate::str::contains("gfortran"));
}

#[test]
fn test_failed_compile_reports_compiler_output() {
    if !gfortran_available() {
        eprintln!("skipping: gfortran not found in PATH");
        return;
    }

    let cell = TestCell::new("broken.f90", "subroutine broken(\nend subroutine\n");
    cell.vulcan()
        .args(["run", cell.source_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("compilation failed"));
}
