//! CLI flag surface for the `pfbwt-cli` binary.
//!
//! Thin by design (spec's Non-goal on "command-line parsing, help text,
//! and orchestration wrappers"): this struct only names and validates the
//! flags; the actual pipeline lives in `src/bin/pfbwt-cli.rs`.
use std::path::PathBuf;

use clap::Parser;

use crate::error::{PfbwtError, Result};

/// Builds the BWT, suffix array, and marker array of a FASTA collection
/// via prefix-free parsing.
#[derive(Parser, Debug, Clone)]
#[command(name = "pfbwt-cli", version, about)]
pub struct Config {
    /// Input FASTA path, or `-` to read from stdin (requires `-o`).
    pub input: PathBuf,

    /// Output prefix; artifacts are written as `<prefix>.dict`,
    /// `<prefix>.bwt`, etc. Required when reading from stdin.
    #[arg(short = 'o', long = "output")]
    pub output_prefix: Option<PathBuf>,

    /// Trigger window width.
    #[arg(short = 'w', long = "window", default_value_t = 10)]
    pub w: usize,

    /// Trigger modulus.
    #[arg(short = 'p', long = "modulus", default_value_t = 100)]
    pub p: usize,

    /// Also emit the full suffix array (`.sa`).
    #[arg(long = "sa")]
    pub full_sa: bool,

    /// Emit only a run-length-sampled suffix array (`.ssa`/`.esa`)
    /// instead of the full array.
    #[arg(long = "rlsa")]
    pub rlsa: bool,

    /// Record the sequence-name-to-start-offset document array (`.docs`).
    #[arg(short = 'd', long = "docs")]
    pub docs: bool,

    /// Replace non-ACGT bytes with `A` before hashing.
    #[arg(long = "non-acgt-to-a")]
    pub non_acgt_to_a: bool,

    /// Skip non-ACGT bytes entirely, recording skipped runs in `.ntab`.
    /// Mutually exclusive with `--non-acgt-to-a`.
    #[arg(long = "trim-non-acgt")]
    pub trim_non_acgt: bool,

    /// Back all large arrays with memory-mapped files instead of heap
    /// allocations.
    #[arg(short = 'M', long = "external-memory")]
    pub external_memory: bool,

    /// Stop after writing the parser's artifacts (dict/occ/parse/last/sai).
    #[arg(long = "parse-only")]
    pub parse_only: bool,

    /// Skip the parse stage; assume `<prefix>`'s parser artifacts already
    /// exist on disk and build only the BWT/SA/marker array from them.
    #[arg(long = "pfbwt-only")]
    pub pfbwt_only: bool,

    /// Write one specific output extension to stdout instead of a file
    /// (e.g. `bwt`).
    #[arg(long = "stdout")]
    pub stdout_ext: Option<String>,

    /// Increase log verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.trim_non_acgt && self.non_acgt_to_a {
            return Err(PfbwtError::ConflictingNonAcgtModes);
        }
        if self.input.as_os_str() == "-" && self.output_prefix.is_none() {
            return Err(PfbwtError::MissingOutputPrefix);
        }
        if self.w < 4 || self.w > 31 {
            return Err(PfbwtError::InvalidWindowSize(self.w));
        }
        if self.p < 4 {
            return Err(PfbwtError::InvalidModulus(self.p));
        }
        Ok(())
    }

    /// Resolves the effective output prefix: the explicit `-o` value, or
    /// the input path with its extension stripped.
    pub fn resolve_output_prefix(&self) -> PathBuf {
        match &self.output_prefix {
            Some(p) => p.clone(),
            None => self.input.with_extension(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            input: PathBuf::from("in.fa"),
            output_prefix: None,
            w: 10,
            p: 100,
            full_sa: false,
            rlsa: false,
            docs: false,
            non_acgt_to_a: false,
            trim_non_acgt: false,
            external_memory: false,
            parse_only: false,
            pfbwt_only: false,
            stdout_ext: None,
            verbosity: 0,
        }
    }

    #[test]
    fn rejects_conflicting_non_acgt_flags() {
        let mut c = base();
        c.trim_non_acgt = true;
        c.non_acgt_to_a = true;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_stdin_without_output_prefix() {
        let mut c = base();
        c.input = PathBuf::from("-");
        assert!(c.validate().is_err());
    }

    #[test]
    fn accepts_stdin_with_output_prefix() {
        let mut c = base();
        c.input = PathBuf::from("-");
        c.output_prefix = Some(PathBuf::from("out"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_window() {
        let mut c = base();
        c.w = 32;
        assert!(c.validate().is_err());
    }
}
