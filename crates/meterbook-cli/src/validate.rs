//! # Validate Subcommand
//!
//! Validates one or more meter JSON documents against a catalogue file.
//!
//! ```bash
//! meterbook validate meters/gw-01.json --catalogue catalogue.yaml
//! meterbook validate meters/*.json --format json
//! ```
//!
//! Exit status: `0` when every meter is valid, `1` when any meter has
//! violations. Unreadable inputs and schema/meter type disagreements are
//! operational errors.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use meterbook_catalogue::{CatalogueDocument, InMemoryCatalogue};
use meterbook_core::{Errors, FieldError, Meter};
use meterbook_validate::MeterValidator;

use crate::config::MeterbookConfig;

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Meter JSON documents to validate.
    #[arg(required = true)]
    pub meters: Vec<PathBuf>,

    /// Catalogue file (YAML or JSON). Defaults to the configured catalogue.
    #[arg(long)]
    pub catalogue: Option<PathBuf>,

    /// Top-level error context. Defaults to the configured root context.
    #[arg(long)]
    pub root_context: Option<String>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Outcome of validating one meter file.
#[derive(Debug, Serialize)]
pub struct MeterReport<'a> {
    pub meter: String,
    pub valid: bool,
    pub errors: Vec<ErrorEntry<'a>>,
}

/// One violation as rendered in JSON reports.
#[derive(Debug, Serialize)]
pub struct ErrorEntry<'a> {
    pub path: String,
    #[serde(flatten)]
    pub error: &'a FieldError,
}

impl<'a> MeterReport<'a> {
    fn new(meter: &Path, errors: &'a Errors) -> Self {
        Self {
            meter: meter.display().to_string(),
            valid: !errors.has_errors(),
            errors: errors
                .iter()
                .map(|error| ErrorEntry {
                    path: error.property_path(),
                    error,
                })
                .collect(),
        }
    }
}

/// Load the catalogue at `path`, then fill in built-in presets if
/// `install_presets` is set.
pub fn load_catalogue(path: &Path, install_presets: bool) -> Result<InMemoryCatalogue> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalogue: {}", path.display()))?;
    let document = CatalogueDocument::from_yaml(&raw)
        .with_context(|| format!("invalid catalogue: {}", path.display()))?;

    let catalogue = InMemoryCatalogue::new();
    let items = catalogue
        .load_document(document)
        .with_context(|| format!("failed to load catalogue: {}", path.display()))?;
    if install_presets {
        catalogue.install_default_presets();
    }
    tracing::info!(catalogue = %path.display(), items, "catalogue loaded");
    Ok(catalogue)
}

/// Execute the validate subcommand, writing the report to `out`.
pub fn run_validate(
    args: &ValidateArgs,
    config: &MeterbookConfig,
    out: &mut dyn Write,
) -> Result<u8> {
    let Some(catalogue_path) = args.catalogue.as_ref().or(config.catalogue.as_ref()) else {
        bail!("no catalogue given: pass --catalogue or set `catalogue` in the config file");
    };
    let root = args.root_context.as_deref().unwrap_or(&config.root_context);

    let catalogue = load_catalogue(catalogue_path, config.install_presets)?;
    let validator = MeterValidator::new(catalogue);

    let mut results = Vec::with_capacity(args.meters.len());
    for path in &args.meters {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read meter: {}", path.display()))?;
        let meter = Meter::from_json(&raw)
            .with_context(|| format!("invalid meter document: {}", path.display()))?;

        let mut errors = Errors::new(root);
        validator
            .validate(&meter, &mut errors)
            .with_context(|| format!("cannot validate {}", path.display()))?;
        results.push((path, errors));
    }

    let reports: Vec<MeterReport<'_>> = results
        .iter()
        .map(|(path, errors)| MeterReport::new(path, errors))
        .collect();
    match args.format {
        OutputFormat::Text => write_text(&reports, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &reports)?;
            writeln!(out)?;
        }
    }

    let invalid = reports.iter().filter(|r| !r.valid).count();
    Ok(u8::from(invalid > 0))
}

fn write_text(reports: &[MeterReport<'_>], out: &mut dyn Write) -> Result<()> {
    for report in reports {
        if report.valid {
            writeln!(out, "{}: valid", report.meter)?;
            continue;
        }
        writeln!(out, "{}: {} error(s)", report.meter, report.errors.len())?;
        for entry in &report.errors {
            writeln!(out, "  {}", entry.error)?;
        }
    }
    Ok(())
}
