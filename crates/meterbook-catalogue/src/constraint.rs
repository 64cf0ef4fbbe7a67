//! # Constraints: Typed Validation Rules
//!
//! A [`Constraint`] is one rule in a catalogue item's schema. The shared
//! envelope (name, description, required flag, activation stage) wraps a
//! [`ConstraintRule`] carrying the kind-specific parameters.
//!
//! Each rule knows how to check one raw value and record violations into an
//! [`Errors`] accumulator at a given [`FieldPath`]. Errors are recorded on
//! the constraint's name. Rules never decide stage activation or pairing;
//! that is the validator's job.
//!
//! ## Check Semantics
//!
//! | Rule | Violations (at most one per check) |
//! |------|------------------------------------|
//! | `NUMERIC` / `INTEGER` | `isNotInteger`, else `isLessThan`, else `isGreaterThan` |
//! | `NUMERIC` / `FLOAT` | `isLessThan`, else `isGreaterThan` |
//! | `TEXT` | `requiredField` when blank, else `minLength`, else `maxLength` |
//! | `PATTERN` | `invalidPattern` unless the whole value matches |

use meterbook_core::{
    ErrorArg, ErrorCode, Errors, FieldError, FieldPath, Line, LineKind, NumberKind,
    ValidationStage,
};
use serde::{Deserialize, Serialize};

use crate::error::CatalogueError;
use crate::pattern::{GuardedPattern, PatternCache};

// ---------------------------------------------------------------------------
// Constraint envelope
// ---------------------------------------------------------------------------

/// A named rule a meter line must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Whether a meter must carry a line with this name once the
    /// constraint is active.
    #[serde(rename = "isRequired", default)]
    pub required: bool,
    /// Earliest stage at which the constraint applies.
    #[serde(default)]
    pub stage: ValidationStage,
    #[serde(flatten)]
    pub rule: ConstraintRule,
}

impl Constraint {
    /// An optional constraint active from [`ValidationStage::Intake`].
    pub fn new(name: impl Into<String>, rule: impl Into<ConstraintRule>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            required: false,
            stage: ValidationStage::Intake,
            rule: rule.into(),
        }
    }

    /// A pattern constraint. Fails if `pattern` is not admitted.
    pub fn pattern(name: impl Into<String>, pattern: &str) -> Result<Self, CatalogueError> {
        Ok(Self::new(name, PatternRule::new(pattern)?))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn at_stage(mut self, stage: ValidationStage) -> Self {
        self.stage = stage;
        self
    }

    /// Whether this constraint applies to a meter currently at `current`.
    pub fn is_active_at(&self, current: ValidationStage) -> bool {
        self.stage.activates_at(current)
    }

    /// Whether `line` carries this constraint's field name.
    pub fn constrains(&self, line: &Line) -> bool {
        line.is_named(&self.name)
    }
}

// ---------------------------------------------------------------------------
// ConstraintRule
// ---------------------------------------------------------------------------

/// The kind-specific half of a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConstraintRule {
    #[serde(rename = "NUMERIC")]
    Number(NumberRule),
    #[serde(rename = "TEXT")]
    Text(TextRule),
    #[serde(rename = "PATTERN")]
    Pattern(PatternRule),
}

impl ConstraintRule {
    /// The only line variant this rule can check.
    pub fn line_kind(&self) -> LineKind {
        match self {
            Self::Number(_) => LineKind::Number,
            Self::Text(_) => LineKind::Text,
            Self::Pattern(_) => LineKind::Pattern,
        }
    }

    /// Wire tag of the rule.
    pub fn as_str(&self) -> &'static str {
        self.line_kind().as_str()
    }
}

impl From<NumberRule> for ConstraintRule {
    fn from(rule: NumberRule) -> Self {
        Self::Number(rule)
    }
}

impl From<TextRule> for ConstraintRule {
    fn from(rule: TextRule) -> Self {
        Self::Text(rule)
    }
}

impl From<PatternRule> for ConstraintRule {
    fn from(rule: PatternRule) -> Self {
        Self::Pattern(rule)
    }
}

// ---------------------------------------------------------------------------
// Number
// ---------------------------------------------------------------------------

/// Integrality and inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberRule {
    pub number_type: NumberKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumberRule {
    pub fn integer() -> Self {
        Self {
            number_type: NumberKind::Integer,
            min: None,
            max: None,
        }
    }

    pub fn float() -> Self {
        Self {
            number_type: NumberKind::Float,
            min: None,
            max: None,
        }
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Check `value` for `field`, recording at most one violation.
    ///
    /// Under `INTEGER`, bounds are truncated toward zero before comparing.
    /// Integral values outside the `i64` range are compared and reported as
    /// floats rather than saturated.
    pub fn check(&self, field: &str, value: f64, at: &FieldPath, errors: &mut Errors) {
        match self.number_type {
            NumberKind::Integer => {
                if !value.is_finite() || value != value.floor() {
                    errors.add(
                        at,
                        FieldError::new(field, ErrorCode::NotInteger)
                            .rejecting(value)
                            .with_args(vec![value.into()]),
                    );
                    return;
                }
                if (I64_LOWER..I64_UPPER).contains(&value) {
                    let min = self.min.map(|m| m as i64);
                    let max = self.max.map(|m| m as i64);
                    check_bounds(field, value as i64, min, max, at, errors);
                } else {
                    let min = self.min.map(f64::trunc);
                    let max = self.max.map(f64::trunc);
                    check_bounds(field, value, min, max, at, errors);
                }
            }
            NumberKind::Float => check_bounds(field, value, self.min, self.max, at, errors),
        }
    }
}

// -2^63 is exact in f64; 2^63 is the first value past i64::MAX.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn check_bounds<T>(
    field: &str,
    value: T,
    min: Option<T>,
    max: Option<T>,
    at: &FieldPath,
    errors: &mut Errors,
) where
    T: PartialOrd + Into<ErrorArg> + Copy,
{
    if let Some(min) = min.filter(|&min| min > value) {
        errors.add(at, bound_error(field, ErrorCode::LessThan, value, min));
    } else if let Some(max) = max.filter(|&max| max < value) {
        errors.add(at, bound_error(field, ErrorCode::GreaterThan, value, max));
    }
}

fn bound_error<T>(field: &str, code: ErrorCode, value: T, bound: T) -> FieldError
where
    T: Into<ErrorArg> + Copy,
{
    FieldError::new(field, code)
        .rejecting(value)
        .with_args(vec![value.into(), bound.into()])
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Non-blank text with optional length limits, in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl TextRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Check `value` for `field`, recording at most one violation.
    ///
    /// A blank value is always `requiredField`, whatever the constraint's
    /// required flag says.
    pub fn check(&self, field: &str, value: &str, at: &FieldPath, errors: &mut Errors) {
        if value.trim().is_empty() {
            errors.reject_value(at, field, ErrorCode::Required);
            return;
        }

        let length = value.chars().count();
        if let Some(min) = self.min_length.filter(|&min| min > length) {
            errors.add(at, length_error(field, ErrorCode::MinLength, value, min));
        } else if let Some(max) = self.max_length.filter(|&max| max < length) {
            errors.add(at, length_error(field, ErrorCode::MaxLength, value, max));
        }
    }
}

fn length_error(field: &str, code: ErrorCode, value: &str, limit: usize) -> FieldError {
    FieldError::new(field, code)
        .rejecting(value)
        .with_args(vec![value.into(), limit.into()])
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// Full-string regular-expression match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: GuardedPattern,
}

impl PatternRule {
    /// Admit `pattern` and wrap it in a rule.
    pub fn new(pattern: &str) -> Result<Self, CatalogueError> {
        Ok(Self {
            pattern: GuardedPattern::new(pattern)?,
        })
    }

    /// Check `value` for `field` against the compiled pattern from `cache`.
    ///
    /// Only fails if an admitted pattern cannot be compiled in its anchored
    /// form, which admission rules out.
    pub fn check(
        &self,
        field: &str,
        value: &str,
        at: &FieldPath,
        errors: &mut Errors,
        cache: &PatternCache,
    ) -> Result<(), CatalogueError> {
        let regex = cache.get_or_compile(&self.pattern)?;
        if !regex.is_match(value) {
            errors.add(
                at,
                FieldError::new(field, ErrorCode::InvalidPattern)
                    .rejecting(value)
                    .with_args(vec![value.into(), self.pattern.as_str().into()]),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_line_zero(errors: &Errors) -> FieldPath {
        errors.root().index("lines", 0)
    }

    #[test]
    fn test_non_integral_value_is_not_integer() {
        let mut errors = Errors::new("meter");
        let at = at_line_zero(&errors);
        NumberRule::integer()
            .with_min(0.0)
            .check("gtThanEqualToZero", 5.5, &at, &mut errors);

        assert_eq!(errors.error_count(), 1);
        let err = errors.field_error("gtThanEqualToZero").unwrap();
        assert_eq!(err.error_code, ErrorCode::NotInteger);
        assert_eq!(err.rejected_value, Some(ErrorArg::Float(5.5)));
        assert_eq!(err.error_code_args, vec![ErrorArg::Float(5.5)]);
    }

    #[test]
    fn test_non_finite_integer_is_not_integer() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut errors = Errors::new("meter");
            let at = at_line_zero(&errors);
            NumberRule::integer().check("n", value, &at, &mut errors);
            assert_eq!(errors.error_count(), 1);
            assert_eq!(errors.field_errors()[0].error_code, ErrorCode::NotInteger);
        }
    }

    #[test]
    fn test_integer_at_min_passes() {
        let mut errors = Errors::new("meter");
        let at = at_line_zero(&errors);
        NumberRule::integer()
            .with_min(0.0)
            .check("gtThanEqualToZero", 0.0, &at, &mut errors);
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_integer_below_min() {
        let mut errors = Errors::new("meter");
        let at = at_line_zero(&errors);
        NumberRule::integer()
            .with_min(5.0)
            .check("lessMinFive", 4.0, &at, &mut errors);

        assert_eq!(errors.error_count(), 1);
        let err = errors.field_error("lessMinFive").unwrap();
        assert_eq!(err.error_code, ErrorCode::LessThan);
        assert_eq!(err.rejected_value, Some(ErrorArg::Int(4)));
        assert_eq!(err.error_code_args, vec![ErrorArg::Int(4), ErrorArg::Int(5)]);
        assert_eq!(err.field_context, "meter.lines[0]");
    }

    #[test]
    fn test_integer_bounds_truncate() {
        let rule = NumberRule::integer().with_min(4.9).with_max(7.9);
        let mut errors = Errors::new("meter");
        let at = FieldPath::root("meter");
        rule.check("n", 4.0, &at, &mut errors);
        rule.check("n", 7.0, &at, &mut errors);
        assert!(!errors.has_errors());

        rule.check("n", 8.0, &at, &mut errors);
        let err = errors.field_error("n").unwrap();
        assert_eq!(err.error_code, ErrorCode::GreaterThan);
        assert_eq!(err.error_code_args, vec![ErrorArg::Int(8), ErrorArg::Int(7)]);
    }

    #[test]
    fn test_integer_beyond_i64_is_reported_unsaturated() {
        let rule = NumberRule::integer().with_max(100.0);
        let mut errors = Errors::new("meter");
        rule.check("n", 1e19, &FieldPath::root("meter"), &mut errors);

        let err = errors.field_error("n").unwrap();
        assert_eq!(err.error_code, ErrorCode::GreaterThan);
        assert_eq!(err.rejected_value, Some(ErrorArg::Float(1e19)));
        assert_eq!(
            err.error_code_args,
            vec![ErrorArg::Float(1e19), ErrorArg::Float(100.0)]
        );

        let mut errors = Errors::new("meter");
        NumberRule::integer()
            .with_min(0.0)
            .check("n", -1e19, &FieldPath::root("meter"), &mut errors);
        assert_eq!(errors.field_errors()[0].error_code, ErrorCode::LessThan);
        assert_eq!(errors.field_errors()[0].rejected_value, Some(ErrorArg::Float(-1e19)));
    }

    #[test]
    fn test_min_checked_before_max() {
        // Inverted bounds: a value can fail both; only the min is reported.
        let rule = NumberRule::float().with_min(10.0).with_max(0.0);
        let mut errors = Errors::new("meter");
        rule.check("n", 5.0, &FieldPath::root("meter"), &mut errors);
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.field_errors()[0].error_code, ErrorCode::LessThan);
    }

    #[test]
    fn test_float_below_min() {
        let mut errors = Errors::new("meter");
        let at = at_line_zero(&errors);
        NumberRule::float()
            .with_min(5.0)
            .check("lessMinFive", 4.0, &at, &mut errors);

        let err = errors.field_error("lessMinFive").unwrap();
        assert_eq!(err.error_code, ErrorCode::LessThan);
        assert_eq!(err.rejected_value, Some(ErrorArg::Float(4.0)));
        assert_eq!(
            err.error_code_args,
            vec![ErrorArg::Float(4.0), ErrorArg::Float(5.0)]
        );
    }

    #[test]
    fn test_float_nan_passes_bounds() {
        let mut errors = Errors::new("meter");
        NumberRule::float()
            .with_min(0.0)
            .with_max(1.0)
            .check("n", f64::NAN, &FieldPath::root("meter"), &mut errors);
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_text_below_min_length() {
        let mut errors = Errors::new("meter");
        let at = at_line_zero(&errors);
        TextRule::new()
            .with_min_length(6)
            .check("notTooShort", "Hello", &at, &mut errors);

        assert_eq!(errors.error_count(), 1);
        let err = errors.field_error("notTooShort").unwrap();
        assert_eq!(err.error_code, ErrorCode::MinLength);
        assert_eq!(
            err.error_code_args,
            vec![ErrorArg::Text("Hello".into()), ErrorArg::Int(6)]
        );
        assert_eq!(err.field_context, "meter.lines[0]");
    }

    #[test]
    fn test_text_above_max_length() {
        let mut errors = Errors::new("meter");
        TextRule::new()
            .with_max_length(3)
            .check("short", "four", &FieldPath::root("meter"), &mut errors);
        assert_eq!(errors.field_error("short").unwrap().error_code, ErrorCode::MaxLength);
    }

    #[test]
    fn test_text_length_counts_chars() {
        let mut errors = Errors::new("meter");
        // Six characters, seven bytes.
        TextRule::new()
            .with_max_length(6)
            .check("city", "Zürich", &FieldPath::root("meter"), &mut errors);
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_blank_text_is_required_only() {
        let mut errors = Errors::new("meter");
        TextRule::new()
            .with_min_length(3)
            .check("name", "   ", &FieldPath::root("meter"), &mut errors);
        assert_eq!(errors.error_count(), 1);
        let err = errors.field_error("name").unwrap();
        assert_eq!(err.error_code, ErrorCode::Required);
        assert_eq!(err.rejected_value, None);
    }

    #[test]
    fn test_pattern_full_match() {
        let cache = PatternCache::new();
        let rule = PatternRule::new(r"\d{4}-\d{4}-\d{4}-\d{4}").unwrap();
        let mut errors = Errors::new("meter");
        let at = at_line_zero(&errors);

        rule.check("card", "1234-1234-1234-4321", &at, &mut errors, &cache)
            .unwrap();
        assert!(!errors.has_errors());

        rule.check("card", "123-1234-1234-4321", &at, &mut errors, &cache)
            .unwrap();
        assert_eq!(errors.error_count(), 1);
        let err = errors.field_error("card").unwrap();
        assert_eq!(err.error_code, ErrorCode::InvalidPattern);
        assert_eq!(
            err.error_code_args,
            vec![
                ErrorArg::Text("123-1234-1234-4321".into()),
                ErrorArg::Text(r"\d{4}-\d{4}-\d{4}-\d{4}".into()),
            ]
        );
    }

    #[test]
    fn test_pattern_constraint_construction_fails_on_long_pattern() {
        let long = "a".repeat(501);
        assert!(matches!(
            Constraint::pattern("p", &long),
            Err(CatalogueError::PatternTooLong { .. })
        ));
    }

    #[test]
    fn test_pattern_constraint_rejects_comment_swallowing_anchor() {
        assert!(matches!(
            Constraint::pattern("serial", r"(?x)\d{4} # four digits"),
            Err(CatalogueError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
            "name": "lorawan.devEui",
            "description": "Device EUI",
            "isRequired": true,
            "stage": "Connection",
            "type": "PATTERN",
            "pattern": "[A-F0-9]{16}"
        }"#;
        let constraint: Constraint = serde_json::from_str(json).unwrap();
        assert!(constraint.required);
        assert_eq!(constraint.stage, ValidationStage::Connection);
        assert_eq!(constraint.rule.line_kind(), LineKind::Pattern);

        let back = serde_json::to_value(&constraint).unwrap();
        assert_eq!(back["type"], "PATTERN");
        assert_eq!(back["isRequired"], true);
        assert_eq!(back["pattern"], "[A-F0-9]{16}");
    }

    #[test]
    fn test_wire_format_rejects_dangerous_pattern() {
        let json = r#"{"name": "p", "type": "PATTERN", "pattern": "(a+)+b+"}"#;
        assert!(serde_json::from_str::<Constraint>(json).is_err());
    }

    #[test]
    fn test_number_rule_wire_format() {
        let json = r#"{
            "name": "port", "type": "NUMERIC", "numberType": "INTEGER", "min": 1, "max": 65535
        }"#;
        let constraint: Constraint = serde_json::from_str(json).unwrap();
        assert_eq!(
            constraint.rule,
            ConstraintRule::Number(NumberRule::integer().with_min(1.0).with_max(65535.0))
        );
        assert!(!constraint.required);
        assert_eq!(constraint.stage, ValidationStage::Intake);
    }

    #[test]
    fn test_stage_activation() {
        let c = Constraint::new("n", TextRule::new()).at_stage(ValidationStage::Connection);
        assert!(!c.is_active_at(ValidationStage::Intake));
        assert!(c.is_active_at(ValidationStage::Connection));
        assert!(c.is_active_at(ValidationStage::Deployment));
    }
}
