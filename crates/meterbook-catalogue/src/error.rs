//! # Catalogue Errors
//!
//! Failures raised while authoring catalogue schemas. These are the only
//! construction-time failures in Meterbook; a schema that builds
//! successfully never fails during meter validation.

use meterbook_core::ValidationFailed;
use thiserror::Error;

use crate::item::{Level, MeterType};

/// Error authoring or loading a catalogue schema.
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// Pattern exceeds the admission length cap.
    #[error("pattern exceeds maximum length of {max} characters: {length}")]
    PatternTooLong {
        /// Length of the rejected pattern, in characters.
        length: usize,
        /// The admission cap.
        max: usize,
    },

    /// Pattern matches a catastrophic-backtracking heuristic.
    #[error("pattern contains potentially dangerous nested quantifiers or excessive complexity: {pattern}")]
    DangerousPattern {
        /// The rejected pattern.
        pattern: String,
    },

    /// Pattern is not a valid regular expression.
    #[error("given regex is invalid: {pattern}: {reason}")]
    InvalidRegex {
        /// The rejected pattern.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A catalogue item with this model already exists.
    #[error("a catalogue item for model {0:?} already exists")]
    DuplicateModel(String),

    /// A preset for this type and level already exists.
    #[error("a preset for type {meter_type} and level {level} already exists")]
    DuplicatePreset {
        /// Meter type of the rejected preset.
        meter_type: MeterType,
        /// Level of the rejected preset.
        level: Level,
    },

    /// A catalogue item failed its definition checks.
    #[error("catalogue item {model:?} is invalid: {source}")]
    InvalidItem {
        /// Model of the rejected item.
        model: String,
        /// The recorded definition errors.
        #[source]
        source: ValidationFailed,
    },

    /// A catalogue document could not be parsed.
    #[error("catalogue parse error: {0}")]
    Parse(String),
}
