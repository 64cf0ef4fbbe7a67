//! # Field Errors: Structured Violation Accumulator
//!
//! Validation never stops at the first failing field. Every violation is
//! recorded as a [`FieldError`] in an [`Errors`] collection, so a single pass
//! reports every problem with a meter.
//!
//! ## Error Taxonomy
//!
//! | Code | Stable id | Arguments |
//! |------|-----------|-----------|
//! | `LessThan` | `isLessThan` | (value, min) |
//! | `GreaterThan` | `isGreaterThan` | (value, max) |
//! | `NotInteger` | `isNotInteger` | (value) |
//! | `MinLength` | `minLength` | (value, minLength) |
//! | `MaxLength` | `maxLength` | (value, maxLength) |
//! | `Required` | `requiredField` | - |
//! | `NotEmpty` | `notEmpty` | - |
//! | `NotFound` | `notFound` | - |
//! | `InvalidPattern` | `invalidPattern` | (value, pattern) |
//!
//! ## Context
//!
//! Each error carries the [`FieldPath`] it was recorded at, as its
//! `field_context`. The caller chooses the root (e.g. `"meter"`); nested
//! calls extend it functionally.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::path::FieldPath;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Kind of business-rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "isLessThan")]
    LessThan,
    #[serde(rename = "isGreaterThan")]
    GreaterThan,
    #[serde(rename = "isNotInteger")]
    NotInteger,
    #[serde(rename = "minLength")]
    MinLength,
    #[serde(rename = "maxLength")]
    MaxLength,
    #[serde(rename = "requiredField")]
    Required,
    #[serde(rename = "notEmpty")]
    NotEmpty,
    #[serde(rename = "notFound")]
    NotFound,
    #[serde(rename = "invalidPattern")]
    InvalidPattern,
}

impl ErrorCode {
    /// Returns all error codes.
    pub fn all() -> &'static [ErrorCode] {
        &[
            Self::LessThan,
            Self::GreaterThan,
            Self::NotInteger,
            Self::MinLength,
            Self::MaxLength,
            Self::Required,
            Self::NotEmpty,
            Self::NotFound,
            Self::InvalidPattern,
        ]
    }

    /// Stable identifier, used as the message key by report renderers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LessThan => "isLessThan",
            Self::GreaterThan => "isGreaterThan",
            Self::NotInteger => "isNotInteger",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Required => "requiredField",
            Self::NotEmpty => "notEmpty",
            Self::NotFound => "notFound",
            Self::InvalidPattern => "invalidPattern",
        }
    }

    /// English fallback description.
    pub fn default_description(&self) -> &'static str {
        match self {
            Self::LessThan => "value is too small",
            Self::GreaterThan => "value is too large",
            Self::NotInteger => "value is not an integer",
            Self::MinLength => "value is too short",
            Self::MaxLength => "value is too long",
            Self::Required => "field is required",
            Self::NotEmpty => "must not be empty",
            Self::NotFound => "could not be found",
            Self::InvalidPattern => "value does not match the required pattern",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// ErrorArg
// ---------------------------------------------------------------------------

/// A rejected value or a message-interpolation argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorArg {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ErrorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for ErrorArg {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for ErrorArg {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ErrorArg {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ErrorArg {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ErrorArg {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

/// A single business-rule violation on one field.
///
/// Serializes with a derived `message` field holding the default
/// description; `message` is ignored on input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Name of the offending field (a line name, or `model`/`locationId`).
    pub field: String,
    /// The value that was rejected, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_value: Option<ErrorArg>,
    pub error_code: ErrorCode,
    /// Positional arguments for message interpolation.
    #[serde(default)]
    pub error_code_args: Vec<ErrorArg>,
    /// Dot-joined location the error was recorded at.
    #[serde(default)]
    pub field_context: String,
}

impl FieldError {
    /// An error on `field` with no rejected value and no arguments.
    pub fn new(field: impl Into<String>, error_code: ErrorCode) -> Self {
        Self {
            field: field.into(),
            rejected_value: None,
            error_code,
            error_code_args: Vec::new(),
            field_context: String::new(),
        }
    }

    /// Set the rejected value.
    pub fn rejecting(mut self, value: impl Into<ErrorArg>) -> Self {
        self.rejected_value = Some(value.into());
        self
    }

    /// Set the interpolation arguments.
    pub fn with_args(mut self, args: Vec<ErrorArg>) -> Self {
        self.error_code_args = args;
        self
    }

    /// `field_context` and `field` joined with a dot, or just `field` when
    /// the context is empty.
    pub fn property_path(&self) -> String {
        if self.field_context.is_empty() {
            self.field.clone()
        } else {
            format!("{}.{}", self.field_context, self.field)
        }
    }

    /// Default English message for this error.
    pub fn message(&self) -> &'static str {
        self.error_code.default_description()
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldError", 6)?;
        state.serialize_field("field", &self.field)?;
        if let Some(value) = &self.rejected_value {
            state.serialize_field("rejectedValue", value)?;
        } else {
            state.skip_field("rejectedValue")?;
        }
        state.serialize_field("errorCode", &self.error_code)?;
        state.serialize_field("errorCodeArgs", &self.error_code_args)?;
        state.serialize_field("fieldContext", &self.field_context)?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.property_path(),
            self.error_code.code(),
            self.message()
        )?;
        if !self.error_code_args.is_empty() {
            let args: Vec<String> = self.error_code_args.iter().map(|a| a.to_string()).collect();
            write!(f, " [{}]", args.join(", "))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Accumulator for all violations found in one top-level validation pass.
///
/// Created fresh per pass and owned by the caller. Not shared across
/// threads or passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Errors {
    root: FieldPath,
    field_errors: Vec<FieldError>,
}

impl Errors {
    /// Create an empty accumulator whose top-level context is `root`.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: FieldPath::root(root),
            field_errors: Vec::new(),
        }
    }

    /// The top-level context every recorded path descends from.
    pub fn root(&self) -> &FieldPath {
        &self.root
    }

    /// Record `error` at location `at`.
    pub fn add(&mut self, at: &FieldPath, mut error: FieldError) -> &mut Self {
        error.field_context = at.as_str().to_string();
        self.field_errors.push(error);
        self
    }

    /// Record `code` on `field` with no rejected value.
    pub fn reject_value(&mut self, at: &FieldPath, field: &str, code: ErrorCode) -> &mut Self {
        self.add(at, FieldError::new(field, code))
    }

    /// Record `code` on `field` if `value` is empty or whitespace only.
    pub fn reject_if_blank(
        &mut self,
        at: &FieldPath,
        field: &str,
        value: &str,
        code: ErrorCode,
    ) -> &mut Self {
        if value.trim().is_empty() {
            self.add(at, FieldError::new(field, code).rejecting(value));
        }
        self
    }

    /// Number of recorded errors.
    pub fn error_count(&self) -> usize {
        self.field_errors.len()
    }

    /// Whether any error has been recorded.
    pub fn has_errors(&self) -> bool {
        !self.field_errors.is_empty()
    }

    /// Whether an error has been recorded on `field`.
    pub fn has_field_error(&self, field: &str) -> bool {
        self.field_errors.iter().any(|e| e.field == field)
    }

    /// First error recorded on `field`.
    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.field_errors.iter().find(|e| e.field == field)
    }

    /// All errors in recording order.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Iterate over errors in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.field_errors.iter()
    }

    /// `Ok(())` when nothing was recorded, otherwise the aggregate failure.
    pub fn into_result(self) -> Result<(), ValidationFailed> {
        if self.has_errors() {
            Err(ValidationFailed { errors: self })
        } else {
            Ok(())
        }
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.field_errors.iter()
    }
}

impl IntoIterator for Errors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.field_errors.into_iter()
    }
}

/// Aggregate failure raised once a caller observes a non-empty [`Errors`].
#[derive(Error, Debug)]
#[error("validation failed with {} error(s)", .errors.error_count())]
pub struct ValidationFailed {
    errors: Errors,
}

impl ValidationFailed {
    /// The complete set of violations.
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// Consume the failure, returning the violations.
    pub fn into_errors(self) -> Errors {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::all() {
            assert!(seen.insert(code.code()), "duplicate code {code}");
            assert!(!code.default_description().is_empty());
        }
    }

    #[test]
    fn test_serde_format_matches_code() {
        for code in ErrorCode::all() {
            let json = serde_json::to_string(code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.code()));
        }
    }

    #[test]
    fn test_add_records_context() {
        let mut errors = Errors::new("meter");
        let at = errors.root().index("lines", 0);
        errors.add(
            &at,
            FieldError::new("notTooShort", ErrorCode::MinLength)
                .rejecting("Hello")
                .with_args(vec!["Hello".into(), 6i64.into()]),
        );

        assert_eq!(errors.error_count(), 1);
        let err = errors.field_error("notTooShort").unwrap();
        assert_eq!(err.field_context, "meter.lines[0]");
        assert_eq!(err.property_path(), "meter.lines[0].notTooShort");
        assert_eq!(
            err.error_code_args,
            vec![ErrorArg::Text("Hello".into()), ErrorArg::Int(6)]
        );
    }

    #[test]
    fn test_field_error_json_shape() {
        let mut errors = Errors::new("meter");
        let at = errors.root().index("lines", 2);
        errors.add(
            &at,
            FieldError::new("battery", ErrorCode::GreaterThan)
                .rejecting(101i64)
                .with_args(vec![101i64.into(), 100i64.into()]),
        );
        let lines = errors.root().child("lines");
        errors.reject_value(&lines, "devEui", ErrorCode::Required);

        let json = serde_json::to_value(errors.field_errors()).unwrap();
        let expected_message = ErrorCode::GreaterThan.default_description();
        assert_eq!(
            json[0],
            serde_json::json!({
                "field": "battery",
                "rejectedValue": 101,
                "errorCode": "isGreaterThan",
                "errorCodeArgs": [101, 100],
                "fieldContext": "meter.lines[2]",
                "message": expected_message,
            })
        );
        assert!(json[1].get("rejectedValue").is_none());
        assert_eq!(json[1]["message"], ErrorCode::Required.default_description());

        let back: Vec<FieldError> = serde_json::from_value(json).unwrap();
        assert_eq!(back, errors.field_errors());
    }

    #[test]
    fn test_reject_if_blank() {
        let mut errors = Errors::new("meter");
        let root = errors.root().clone();
        errors
            .reject_if_blank(&root, "locationId", "   ", ErrorCode::NotEmpty)
            .reject_if_blank(&root, "model", "A0001", ErrorCode::NotEmpty);

        assert_eq!(errors.error_count(), 1);
        let err = errors.field_error("locationId").unwrap();
        assert_eq!(err.error_code, ErrorCode::NotEmpty);
        assert_eq!(err.field_context, "meter");
        assert!(!errors.has_field_error("model"));
    }

    #[test]
    fn test_property_path_without_context() {
        let err = FieldError::new("model", ErrorCode::NotFound);
        assert_eq!(err.property_path(), "model");
    }

    #[test]
    fn test_into_result() {
        assert!(Errors::new("meter").into_result().is_ok());

        let mut errors = Errors::new("meter");
        let root = errors.root().clone();
        errors.reject_value(&root, "model", ErrorCode::NotFound);
        let failure = errors.into_result().unwrap_err();
        assert_eq!(failure.errors().error_count(), 1);
        assert_eq!(failure.to_string(), "validation failed with 1 error(s)");
    }

    #[test]
    fn test_display() {
        let mut errors = Errors::new("meter");
        let at = errors.root().index("lines", 1);
        errors.add(
            &at,
            FieldError::new("lineOne", ErrorCode::LessThan)
                .rejecting(1i64)
                .with_args(vec![1i64.into(), 2i64.into()]),
        );
        assert_eq!(
            errors.field_errors()[0].to_string(),
            "meter.lines[1].lineOne: isLessThan (value is too small) [1, 2]"
        );
    }

    #[test]
    fn test_pattern_error_json_fields() {
        let mut err = FieldError::new("pl1", ErrorCode::InvalidPattern)
            .rejecting("123")
            .with_args(vec!["123".into(), r"\d{4}".into()]);
        err.field_context = "meter.lines[0]".into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["errorCode"], "invalidPattern");
        assert_eq!(json["rejectedValue"], "123");
        assert_eq!(json["fieldContext"], "meter.lines[0]");
        assert_eq!(json["errorCodeArgs"][1], r"\d{4}");
        assert_eq!(json["message"], err.message());
    }
}
