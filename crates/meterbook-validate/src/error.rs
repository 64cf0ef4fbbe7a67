//! # Validator Errors
//!
//! Conditions a validation pass cannot decide for itself. Business-rule
//! violations are never represented here; they live in
//! [`Errors`](meterbook_core::Errors).

use meterbook_catalogue::CatalogueError;
use meterbook_core::{LineKind, ValidationFailed};
use thiserror::Error;

/// Error raised by [`MeterValidator`](crate::MeterValidator) or
/// [`validate_meter`](crate::validate_meter).
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// A line was matched by name to a constraint that checks a different
    /// line kind. The schema and the meter disagree about the field's type.
    #[error("line {line:?} at index {index} is {line_kind} but its constraint checks {constraint_kind}")]
    LineKindMismatch {
        /// The line (and constraint) name.
        line: String,
        /// Position of the line in the meter.
        index: usize,
        line_kind: LineKind,
        constraint_kind: LineKind,
    },

    /// An admitted pattern could not be compiled for matching.
    #[error(transparent)]
    Pattern(#[from] CatalogueError),

    /// The pass completed and recorded at least one violation.
    #[error(transparent)]
    Rejected(#[from] ValidationFailed),
}

impl ValidatorError {
    /// The recorded violations, when this is a [`ValidatorError::Rejected`].
    pub fn violations(&self) -> Option<&meterbook_core::Errors> {
        match self {
            Self::Rejected(failed) => Some(failed.errors()),
            _ => None,
        }
    }
}
