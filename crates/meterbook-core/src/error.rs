//! # Error Types
//!
//! Errors raised by the foundational types themselves: parsing stage and
//! number-kind identifiers, and decoding meter documents.
//!
//! Business-rule violations found while validating a meter are NOT errors
//! in this sense. They are [`FieldError`](crate::FieldError) records
//! collected in [`Errors`](crate::Errors).

use thiserror::Error;

/// Top-level error type for Meterbook core types.
#[derive(Error, Debug)]
pub enum MeterbookError {
    /// A stage identifier did not name any [`ValidationStage`](crate::ValidationStage).
    #[error("unknown validation stage: {0:?}")]
    UnknownStage(String),

    /// A number-kind identifier was neither `INTEGER` nor `FLOAT`.
    #[error("unknown number kind: {0:?}")]
    UnknownNumberKind(String),

    /// A meter document could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
