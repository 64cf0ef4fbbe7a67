//! # Meter: Record Under Validation
//!
//! A meter is an ordered list of [`Line`]s for one device, identified by the
//! catalogue `model` it claims to be and the lifecycle stage it is in.
//! Meters are supplied by the caller; validation never mutates them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::MeterbookError;
use crate::line::Line;
use crate::stage::ValidationStage;

/// A field-device record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    /// Persistence identifier; absent for meters not yet stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Location the meter is installed at.
    #[serde(default)]
    pub location_id: String,
    /// Catalogue model the meter's lines are validated against.
    #[serde(default)]
    pub model: String,
    /// Field values, in submission order.
    #[serde(default)]
    pub lines: Vec<Line>,
    /// Current lifecycle stage.
    #[serde(default)]
    pub stage: ValidationStage,
}

impl Meter {
    /// Create a meter with no lines.
    pub fn new(
        location_id: impl Into<String>,
        model: impl Into<String>,
        stage: ValidationStage,
    ) -> Self {
        Self {
            id: None,
            location_id: location_id.into(),
            model: model.into(),
            lines: Vec::new(),
            stage,
        }
    }

    /// Set the persistence identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a line.
    pub fn with_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    /// Append several lines, preserving their order.
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = Line>) -> Self {
        self.lines.extend(lines);
        self
    }

    /// First line carrying `name`, if any.
    pub fn line(&self, name: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.is_named(name))
    }

    /// Whether any line carries `name`.
    pub fn has_line(&self, name: &str) -> bool {
        self.lines.iter().any(|l| l.is_named(name))
    }

    /// Names that appear on more than one line, in first-repeat order.
    pub fn duplicate_line_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for line in &self.lines {
            let name = line.name();
            if !seen.insert(name) && !dupes.contains(&name) {
                dupes.push(name);
            }
        }
        dupes
    }

    /// Decode a meter from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, MeterbookError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::NumberKind;

    fn sample() -> Meter {
        Meter::new("location1", "A0001", ValidationStage::Connection)
            .with_id("m-1")
            .with_line(Line::number("lineOne", NumberKind::Integer, 3.0))
            .with_line(Line::text("lineThree", "Hello World!"))
    }

    #[test]
    fn test_line_lookup() {
        let meter = sample();
        assert!(meter.has_line("lineOne"));
        assert!(!meter.has_line("lineone"));
        assert_eq!(
            meter.line("lineThree"),
            Some(&Line::text("lineThree", "Hello World!"))
        );
    }

    #[test]
    fn test_duplicate_line_names() {
        let meter = sample()
            .with_line(Line::text("lineThree", "again"))
            .with_line(Line::text("lineThree", "and again"));
        assert_eq!(meter.duplicate_line_names(), vec!["lineThree"]);
        assert!(sample().duplicate_line_names().is_empty());
    }

    #[test]
    fn test_from_json() {
        let meter = Meter::from_json(
            r#"{
                "id": "m-1",
                "locationId": "location1",
                "model": "A0001",
                "stage": "Connection",
                "lines": [
                    {"type": "NUMERIC", "name": "lineOne", "numberType": "INTEGER", "value": 3},
                    {"type": "TEXT", "name": "lineThree", "value": "Hello World!"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(meter, sample());
    }

    #[test]
    fn test_from_json_defaults_missing_fields() {
        let meter = Meter::from_json("{}").unwrap();
        assert!(meter.location_id.is_empty());
        assert!(meter.model.is_empty());
        assert!(meter.lines.is_empty());
        assert_eq!(meter.stage, ValidationStage::Intake);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            Meter::from_json("not json"),
            Err(MeterbookError::Serialization(_))
        ));
    }
}
