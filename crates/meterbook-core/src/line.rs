//! # Meter Lines: Typed Field Values
//!
//! A [`Line`] is one named, typed value on a meter. The variant decides which
//! kind of constraint may check it:
//!
//! | Line variant | Checked by |
//! |--------------|------------|
//! | `Number` | numeric range / integrality rule |
//! | `Text` | length rule |
//! | `Pattern` | regular-expression rule |
//! | `ReadOnly` | never checked |
//!
//! On the wire a line is an object tagged by `"type"`
//! (`NUMERIC`, `TEXT`, `PATTERN`, `READ_ONLY`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MeterbookError;

/// Numeric interpretation of a number line or number rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NumberKind {
    /// Value must be mathematically integral.
    Integer,
    /// Any finite or non-finite floating-point value.
    Float,
}

impl NumberKind {
    /// Returns the identifier used in serialized documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumberKind {
    type Err = MeterbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INTEGER" => Ok(Self::Integer),
            "FLOAT" => Ok(Self::Float),
            other => Err(MeterbookError::UnknownNumberKind(other.to_string())),
        }
    }
}

/// Discriminant of a [`Line`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Number,
    Text,
    Pattern,
    ReadOnly,
}

impl LineKind {
    /// Returns the wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "NUMERIC",
            Self::Text => "TEXT",
            Self::Pattern => "PATTERN",
            Self::ReadOnly => "READ_ONLY",
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed field value on a meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Line {
    /// A numeric reading or setting.
    #[serde(rename = "NUMERIC")]
    Number {
        name: String,
        #[serde(rename = "numberType")]
        number_type: NumberKind,
        value: f64,
    },
    /// Free text.
    Text { name: String, value: String },
    /// Text that must match a catalogue-defined regular expression.
    Pattern { name: String, value: String },
    /// Informational value that is displayed but never validated.
    ReadOnly { name: String, value: String },
}

impl Line {
    /// Create a number line.
    pub fn number(name: impl Into<String>, number_type: NumberKind, value: f64) -> Self {
        Self::Number {
            name: name.into(),
            number_type,
            value,
        }
    }

    /// Create a text line.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a pattern line.
    pub fn pattern(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Pattern {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a read-only line.
    pub fn read_only(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ReadOnly {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The line's field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Number { name, .. }
            | Self::Text { name, .. }
            | Self::Pattern { name, .. }
            | Self::ReadOnly { name, .. } => name,
        }
    }

    /// The line's variant.
    pub fn kind(&self) -> LineKind {
        match self {
            Self::Number { .. } => LineKind::Number,
            Self::Text { .. } => LineKind::Text,
            Self::Pattern { .. } => LineKind::Pattern,
            Self::ReadOnly { .. } => LineKind::ReadOnly,
        }
    }

    /// Whether this line carries the field `name`.
    ///
    /// Matching is exact and case-sensitive. This is the only definition of
    /// line/constraint name matching in the workspace.
    pub fn is_named(&self, name: &str) -> bool {
        self.name() == name
    }
}
