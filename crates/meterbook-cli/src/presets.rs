//! # Presets Subcommand
//!
//! Lists the presets a catalogue provides: those declared in the catalogue
//! file, plus the built-in presets when `install_presets` is set. Without a
//! catalogue only the built-ins are listed.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use meterbook_catalogue::{ConstraintRule, InMemoryCatalogue, Level, MeterType, Preset};

use crate::config::MeterbookConfig;
use crate::validate::{load_catalogue, OutputFormat};

/// Arguments for the presets subcommand.
#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Only show presets of this meter type (e.g. LORAWAN).
    #[arg(long = "type")]
    pub meter_type: Option<MeterType>,

    /// Only show presets of this level (GATEWAY or DEVICE).
    #[arg(long)]
    pub level: Option<Level>,

    /// Catalogue file whose presets to list. Defaults to the configured
    /// catalogue.
    #[arg(long)]
    pub catalogue: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the presets subcommand.
pub fn run_presets(
    args: &PresetsArgs,
    config: &MeterbookConfig,
    out: &mut dyn Write,
) -> Result<u8> {
    let catalogue = match args.catalogue.as_ref().or(config.catalogue.as_ref()) {
        Some(path) => load_catalogue(path, config.install_presets)?,
        None => {
            let catalogue = InMemoryCatalogue::new();
            if config.install_presets {
                catalogue.install_default_presets();
            }
            catalogue
        }
    };

    let presets = catalogue.presets();
    let selected: Vec<&Preset> = presets
        .iter()
        .map(Arc::as_ref)
        .filter(|p| args.meter_type.map_or(true, |t| p.meter_type == t))
        .filter(|p| args.level.map_or(true, |l| p.level == l))
        .collect();

    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &selected)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for preset in selected {
                writeln!(
                    out,
                    "{} {} ({} constraints)",
                    preset.meter_type,
                    preset.level,
                    preset.constraints.len()
                )?;
                for c in &preset.constraints {
                    writeln!(
                        out,
                        "  {:<28} {:<8} {:<11} {}{}",
                        c.name,
                        c.rule.as_str(),
                        c.stage.as_str(),
                        describe(&c.rule),
                        if c.required { " required" } else { "" }
                    )?;
                }
            }
        }
    }
    Ok(0)
}

fn describe(rule: &ConstraintRule) -> String {
    fn bound<T: std::fmt::Display>(v: Option<T>) -> String {
        v.map_or_else(|| "-".to_string(), |v| v.to_string())
    }
    match rule {
        ConstraintRule::Number(r) => {
            format!("{} [{}, {}]", r.number_type, bound(r.min), bound(r.max))
        }
        ConstraintRule::Text(r) => {
            format!("length [{}, {}]", bound(r.min_length), bound(r.max_length))
        }
        ConstraintRule::Pattern(r) => format!("/{}/", r.pattern),
    }
}
