//! # Check-Pattern Subcommand
//!
//! Runs a regular expression through catalogue admission control and,
//! optionally, tests sample values against it with full-string matching.
//!
//! ```bash
//! meterbook check-pattern '[A-F0-9]{16}' 0011223344AABBCC 00112233
//! ```

use std::io::Write;

use anyhow::Result;
use clap::Args;

use meterbook_catalogue::{GuardedPattern, PatternCache};

/// Arguments for the check-pattern subcommand.
#[derive(Args, Debug)]
pub struct CheckPatternArgs {
    /// The regular expression to check.
    pub pattern: String,

    /// Values to match against the pattern.
    pub values: Vec<String>,
}

/// Execute the check-pattern subcommand. Exit status is `1` when the
/// pattern is rejected or any value fails to match.
pub fn run_check_pattern(args: &CheckPatternArgs, out: &mut dyn Write) -> Result<u8> {
    let pattern = match GuardedPattern::new(args.pattern.as_str()) {
        Ok(pattern) => pattern,
        Err(e) => {
            writeln!(out, "rejected: {e}")?;
            return Ok(1);
        }
    };
    writeln!(out, "admitted: {pattern}")?;

    let cache = PatternCache::new();
    let regex = cache.get_or_compile(&pattern)?;
    let mut failed = 0;
    for value in &args.values {
        if regex.is_match(value) {
            writeln!(out, "  match     {value}")?;
        } else {
            writeln!(out, "  no match  {value}")?;
            failed += 1;
        }
    }
    Ok(u8::from(failed > 0))
}
