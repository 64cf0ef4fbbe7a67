//! # Catalogue Items & Presets
//!
//! A [`CatalogueItem`] is the schema for one manufacturer model. A [`Preset`]
//! is a reusable starting point keyed by ([`MeterType`], [`Level`]): a new
//! item is typically created from the preset for its type and level, then
//! extended with model-specific constraints.
//!
//! Items and presets may carry template `lines`, the default field values a
//! fresh meter of that model starts with. Templates are never validated.

use std::fmt;
use std::str::FromStr;

use meterbook_core::{ErrorCode, Errors, Line};
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::CatalogueError;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Position of a meter in the network topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Gateway,
    Device,
}

impl Level {
    pub fn all() -> &'static [Level] {
        &[Self::Gateway, Self::Device]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gateway => "GATEWAY",
            Self::Device => "DEVICE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CatalogueError::Parse(format!("unknown level: {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// MeterType
// ---------------------------------------------------------------------------

/// Radio or bus technology a meter communicates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeterType {
    Lorawan,
    Modbus,
    Sidewalk,
}

impl MeterType {
    pub fn all() -> &'static [MeterType] {
        &[Self::Lorawan, Self::Modbus, Self::Sidewalk]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lorawan => "LORAWAN",
            Self::Modbus => "MODBUS",
            Self::Sidewalk => "SIDEWALK",
        }
    }
}

impl fmt::Display for MeterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeterType {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CatalogueError::Parse(format!("unknown meter type: {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

/// Default schema for every model of one type and level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub level: Level,
    #[serde(rename = "type")]
    pub meter_type: MeterType,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl Preset {
    pub fn new(meter_type: MeterType, level: Level, constraints: Vec<Constraint>) -> Self {
        Self {
            id: None,
            level,
            meter_type,
            lines: Vec::new(),
            constraints,
        }
    }

    /// Store key: one preset per type and level.
    pub fn key(&self) -> (MeterType, Level) {
        (self.meter_type, self.level)
    }
}

// ---------------------------------------------------------------------------
// CatalogueItem
// ---------------------------------------------------------------------------

/// The validation schema for one manufacturer model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub model: String,
    pub level: Level,
    #[serde(rename = "type")]
    pub meter_type: MeterType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub lines: Vec<Line>,
    /// Checked in order; the first constraint named like a line wins.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl CatalogueItem {
    pub fn new(
        model: impl Into<String>,
        level: Level,
        meter_type: MeterType,
        description: impl Into<String>,
        manufacturer: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            model: model.into(),
            level,
            meter_type,
            description: description.into(),
            manufacturer: manufacturer.into(),
            lines: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// A new item seeded with the preset's level, type, lines and constraints.
    pub fn from_preset(
        preset: &Preset,
        model: impl Into<String>,
        description: impl Into<String>,
        manufacturer: impl Into<String>,
    ) -> Self {
        let mut item = Self::new(
            model,
            preset.level,
            preset.meter_type,
            description,
            manufacturer,
        );
        item.lines = preset.lines.clone();
        item.constraints = preset.constraints.clone();
        item
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// First constraint named `name`.
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Record definition problems into `errors`: blank `model`,
    /// `description` or `manufacturer`, and blank constraint names.
    pub fn check_definition(&self, errors: &mut Errors) {
        let at = errors.root().clone();
        errors
            .reject_if_blank(&at, "model", &self.model, ErrorCode::NotEmpty)
            .reject_if_blank(&at, "description", &self.description, ErrorCode::NotEmpty)
            .reject_if_blank(&at, "manufacturer", &self.manufacturer, ErrorCode::NotEmpty);
        for (i, constraint) in self.constraints.iter().enumerate() {
            let at = at.index("constraints", i);
            errors.reject_if_blank(&at, "name", &constraint.name, ErrorCode::NotEmpty);
        }
    }

    /// Run [`check_definition`](Self::check_definition) under the
    /// `catalogueItem` context and turn any finding into an error.
    pub fn validate_definition(&self) -> Result<(), CatalogueError> {
        let mut errors = Errors::new("catalogueItem");
        self.check_definition(&mut errors);
        errors
            .into_result()
            .map_err(|source| CatalogueError::InvalidItem {
                model: self.model.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::TextRule;

    #[test]
    fn test_level_and_type_round_trip_names() {
        for level in Level::all() {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), *level);
        }
        for t in MeterType::all() {
            assert_eq!(t.as_str().parse::<MeterType>().unwrap(), *t);
        }
        assert_eq!("lorawan".parse::<MeterType>().unwrap(), MeterType::Lorawan);
        assert!("ZIGBEE".parse::<MeterType>().is_err());
    }

    #[test]
    fn test_from_preset_copies_schema() {
        let preset = Preset::new(
            MeterType::Lorawan,
            Level::Device,
            vec![Constraint::new("lorawan.devEui", TextRule::new().with_min_length(16))],
        );
        let item = CatalogueItem::from_preset(&preset, "RAK-7200", "Tracker", "RAKwireless");
        assert_eq!(item.level, Level::Device);
        assert_eq!(item.meter_type, MeterType::Lorawan);
        assert!(item.constraint("lorawan.devEui").is_some());
        assert!(item.constraint("lorawan.appKey").is_none());
    }

    #[test]
    fn test_definition_rejects_blank_fields() {
        let item = CatalogueItem::new(" ", Level::Gateway, MeterType::Lorawan, "", "Kerlink")
            .with_constraint(Constraint::new("", TextRule::new()));

        let mut errors = Errors::new("catalogueItem");
        item.check_definition(&mut errors);
        assert_eq!(errors.error_count(), 3);
        assert_eq!(errors.field_error("model").unwrap().error_code, ErrorCode::NotEmpty);
        assert!(errors.has_field_error("description"));
        assert_eq!(
            errors.field_error("name").unwrap().field_context,
            "catalogueItem.constraints[0]"
        );

        match item.validate_definition() {
            Err(CatalogueError::InvalidItem { model, source }) => {
                assert_eq!(model, " ");
                assert_eq!(source.errors().error_count(), 3);
            }
            other => panic!("expected InvalidItem, got {other:?}"),
        }
    }

    #[test]
    fn test_wire_format() {
        let yaml = r#"
model: Wirnet iStation
level: GATEWAY
type: LORAWAN
description: Outdoor gateway
manufacturer: Kerlink
constraints:
  - name: lorawan.devEui
    isRequired: true
    stage: Connection
    type: TEXT
    minLength: 16
    maxLength: 16
"#;
        let item: CatalogueItem = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(item.level, Level::Gateway);
        assert_eq!(item.constraints.len(), 1);
        assert!(item.constraints[0].required);
        assert!(item.validate_definition().is_ok());
    }
}
