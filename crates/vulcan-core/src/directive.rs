//! Cell directive parsing.
//!
//! A cell is Fortran source optionally preceded by a directive line carrying
//! command-line-style options:
//!
//! ```text
//! !%%fortran --fcompiler=gfortran --opt=-O3 --link lapack
//! subroutine f1(x, y)
//!   ...
//! ```
//!
//! The bare `%%fortran` spelling is also accepted so a notebook cell can be
//! pasted verbatim; the line is stripped either way since it is not valid
//! Fortran. Option errors are reported before any file I/O happens.

use std::path::Path;

use clap::Parser;

use crate::compile::toolchain::{CVendor, FortranVendor};
use crate::compile::types::SourceForm;
use crate::error::{Error, Result};

/// Prefixes that introduce a directive line.
const DIRECTIVE_PREFIXES: [&str; 2] = ["!%%fortran", "%%fortran"];

/// Options recognized in a cell directive (and on the CLI).
#[derive(Debug, Clone, Default, PartialEq, clap::Args)]
pub struct CellArgs {
    /// Fortran compiler vendor. See `vulcan compilers` for what is installed.
    #[arg(long, value_enum)]
    pub fcompiler: Option<FortranVendor>,

    /// C compiler used as the link driver instead of the Fortran compiler.
    #[arg(long, value_enum)]
    pub compiler: Option<CVendor>,

    /// Extra flags for fixed-form (F77) sources.
    #[arg(long)]
    pub f77flags: Option<String>,

    /// Extra flags for free-form (F90) sources.
    #[arg(long)]
    pub f90flags: Option<String>,

    /// Optimization flags (default -O2).
    #[arg(long)]
    pub opt: Option<String>,

    /// Architecture-specific optimization flags.
    #[arg(long)]
    pub arch: Option<String>,

    /// Compile without optimization.
    #[arg(long)]
    pub noopt: bool,

    /// Compile without architecture-specific optimization.
    #[arg(long)]
    pub noarch: bool,

    /// Compile with debugging information.
    #[arg(long)]
    pub debug: bool,

    /// Link against a named resource (repeatable). See `vulcan links`.
    #[arg(long)]
    pub link: Vec<String>,
}

impl CellArgs {
    /// Parse a directive argument string (everything after `%%fortran`).
    pub fn parse_line(line: &str) -> Result<Self> {
        let tokens = split_tokens(line)?;
        Self::parse_tokens(&tokens)
    }

    fn parse_tokens(tokens: &[String]) -> Result<Self> {
        let argv = std::iter::once("%%fortran").chain(tokens.iter().map(String::as_str));
        let parsed = DirectiveLine::try_parse_from(argv)
            .map_err(|e| Error::Usage(e.to_string()))?;
        Ok(parsed.args)
    }

    /// Overlay cell-local options on top of these.
    ///
    /// Scalars from the overlay win, boolean flags combine, and `--link`
    /// lists concatenate.
    pub fn merged_with(&self, overlay: &CellArgs) -> CellArgs {
        let mut out = CellArgs {
            fcompiler: overlay.fcompiler.or(self.fcompiler),
            compiler: overlay.compiler.or(self.compiler),
            f77flags: overlay.f77flags.clone().or_else(|| self.f77flags.clone()),
            f90flags: overlay.f90flags.clone().or_else(|| self.f90flags.clone()),
            opt: overlay.opt.clone().or_else(|| self.opt.clone()),
            arch: overlay.arch.clone().or_else(|| self.arch.clone()),
            noopt: self.noopt || overlay.noopt,
            noarch: self.noarch || overlay.noarch,
            debug: self.debug || overlay.debug,
            link: self.link.clone(),
        };
        out.link.extend(overlay.link.iter().cloned());
        out
    }
}

/// Wrapper so `CellArgs` can be parsed standalone from a directive line.
#[derive(Parser)]
#[command(name = "%%fortran", disable_help_flag = true, disable_version_flag = true)]
struct DirectiveLine {
    #[command(flatten)]
    args: CellArgs,
}

/// A parsed cell: directive options plus the Fortran source body.
#[derive(Debug, Clone)]
pub struct FortranCell {
    /// Options from the directive line (only; not yet merged with defaults).
    pub args: CellArgs,

    /// Source text, normalized to end with a newline.
    pub source: String,

    /// Fixed or free source form.
    pub form: SourceForm,
}

impl FortranCell {
    /// Parse cell text: strip the directive line if present, normalize the
    /// trailing newline.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_form(text, SourceForm::Free)
    }

    /// Parse a cell read from a file, inferring the source form from the
    /// file extension (`.f`, `.for`, `.f77` are fixed form).
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_with_form(&text, SourceForm::from_path(path))
    }

    fn parse_with_form(text: &str, form: SourceForm) -> Result<Self> {
        let (args, body) = match directive_split(text) {
            Some((line, body)) => (CellArgs::parse_line(line)?, body),
            None => (CellArgs::default(), text),
        };

        let mut source = body.trim_start_matches('\n').to_string();
        if !source.ends_with('\n') {
            source.push('\n');
        }

        Ok(Self { args, source, form })
    }
}

/// Split off the directive line, if the first non-blank line is one.
///
/// Returns the directive's argument string and the remaining source body.
fn directive_split(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start_matches(['\n', '\r']);
    let line_end = trimmed.find('\n').unwrap_or(trimmed.len());
    let (first, rest) = trimmed.split_at(line_end);
    let first = first.trim();

    for prefix in DIRECTIVE_PREFIXES {
        if let Some(flags) = first.strip_prefix(prefix) {
            // Require end-of-line or whitespace after the prefix, so a
            // comment like `!%%fortranish` is left alone.
            if flags.is_empty() || flags.starts_with(char::is_whitespace) {
                return Some((flags, rest));
            }
        }
    }
    None
}

/// Tokenize a directive argument string shell-style.
///
/// Double and single quotes group words, so `--f90flags="-fopenmp -O2"`
/// survives as a single option value. No escape processing beyond that.
pub fn split_tokens(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                } else {
                    current.push(ch);
                }
            }
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(Error::Usage(format!("unterminated quote in directive: {line}")));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tokens_plain() {
        let tokens = split_tokens("--debug --opt=-O3").unwrap();
        assert_eq!(tokens, vec!["--debug", "--opt=-O3"]);
    }

    #[test]
    fn test_split_tokens_quoted() {
        let tokens = split_tokens(r#"--f90flags="-fopenmp -O2" --link lapack"#).unwrap();
        assert_eq!(tokens, vec!["--f90flags=-fopenmp -O2", "--link", "lapack"]);
    }

    #[test]
    fn test_split_tokens_unterminated_quote() {
        let err = split_tokens(r#"--f90flags="-fopenmp"#).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[test]
    fn test_parse_line_options() {
        let args = CellArgs::parse_line("--fcompiler=gfortran --debug --link lapack --link blas")
            .unwrap();
        assert_eq!(args.fcompiler, Some(FortranVendor::Gfortran));
        assert!(args.debug);
        assert_eq!(args.link, vec!["lapack", "blas"]);
    }

    #[test]
    fn test_parse_line_rejects_unknown_flag() {
        let err = CellArgs::parse_line("--frobnicate").unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[test]
    fn test_parse_line_rejects_bad_vendor() {
        let err = CellArgs::parse_line("--fcompiler=gnu123").unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[test]
    fn test_cell_without_directive() {
        let cell = FortranCell::parse("subroutine f1()\nend subroutine\n").unwrap();
        assert_eq!(cell.args, CellArgs::default());
        assert!(cell.source.starts_with("subroutine f1()"));
    }

    #[test]
    fn test_cell_with_comment_directive() {
        let cell = FortranCell::parse("!%%fortran --debug\nsubroutine f1()\nend\n").unwrap();
        assert!(cell.args.debug);
        assert!(!cell.source.contains("%%fortran"));
        assert!(cell.source.starts_with("subroutine f1()"));
    }

    #[test]
    fn test_cell_with_pasted_magic_line() {
        let cell = FortranCell::parse("%%fortran --opt=-O1\nsubroutine f1()\nend\n").unwrap();
        assert_eq!(cell.args.opt.as_deref(), Some("-O1"));
        assert!(!cell.source.contains("%%fortran"));
    }

    #[test]
    fn test_directive_lookalike_is_source() {
        let cell = FortranCell::parse("!%%fortranish comment\nend\n").unwrap();
        assert_eq!(cell.args, CellArgs::default());
        assert!(cell.source.contains("fortranish"));
    }

    #[test]
    fn test_trailing_newline_normalized() {
        let cell = FortranCell::parse("end").unwrap();
        assert_eq!(cell.source, "end\n");

        let cell2 = FortranCell::parse("end\n").unwrap();
        assert_eq!(cell.source, cell2.source);
    }

    #[test]
    fn test_merge_precedence() {
        let cli = CellArgs {
            fcompiler: Some(FortranVendor::Gfortran),
            opt: Some("-O2".to_string()),
            link: vec!["blas".to_string()],
            ..Default::default()
        };
        let cell = CellArgs {
            opt: Some("-O3".to_string()),
            debug: true,
            link: vec!["lapack".to_string()],
            ..Default::default()
        };

        let merged = cli.merged_with(&cell);
        // Cell-local scalar wins, CLI value survives where the cell is silent.
        assert_eq!(merged.opt.as_deref(), Some("-O3"));
        assert_eq!(merged.fcompiler, Some(FortranVendor::Gfortran));
        assert!(merged.debug);
        assert_eq!(merged.link, vec!["blas", "lapack"]);
    }
}
