//! # Meter Validator
//!
//! One pass over a meter against its catalogue schema:
//!
//! 1. Blank `locationId` or `model` records `notEmpty` and ends the pass.
//! 2. An unknown model records `notFound` on `model` and ends the pass.
//! 3. Each line, at `lines[i]`, is checked by the first constraint with the
//!    same name, if that constraint is active at the meter's stage.
//! 4. Each active, required constraint with no line of the same name
//!    records `requiredField` at `lines`.
//!
//! Steps 3 and 4 never short-circuit. Every violation found is recorded
//! before the pass returns.
//!
//! ## Contract Violations
//!
//! A line whose name matches a constraint of a different kind cannot be
//! checked, and neither can a line whose pattern fails to compile. The pass
//! records nothing for that line, finishes, and then returns the error for
//! the first such line ([`ValidatorError::LineKindMismatch`] or
//! [`ValidatorError::Pattern`]).

use std::fmt;
use std::sync::Arc;

use meterbook_catalogue::{
    CatalogueItem, Constraint, ConstraintRule, PatternCache, SchemaResolver,
};
use meterbook_core::{ErrorCode, Errors, FieldError, FieldPath, Line, Meter};

use crate::error::ValidatorError;

/// Validates meters against schemas obtained from `R`.
pub struct MeterValidator<R> {
    resolver: R,
    patterns: Arc<PatternCache>,
}

impl<R: SchemaResolver> MeterValidator<R> {
    /// A validator using the process-wide pattern cache.
    pub fn new(resolver: R) -> Self {
        Self::with_pattern_cache(resolver, PatternCache::shared())
    }

    /// A validator using its own pattern cache.
    pub fn with_pattern_cache(resolver: R, patterns: Arc<PatternCache>) -> Self {
        Self { resolver, patterns }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn pattern_cache(&self) -> &PatternCache {
        &self.patterns
    }

    /// Validate `meter`, recording every violation into `errors`.
    ///
    /// Returns `Ok(())` whether or not violations were recorded; inspect
    /// `errors` (or use [`crate::validate_meter`]) to decide pass/fail.
    pub fn validate(&self, meter: &Meter, errors: &mut Errors) -> Result<(), ValidatorError> {
        tracing::debug!(
            meter_id = meter.id.as_deref().unwrap_or(""),
            model = %meter.model,
            stage = %meter.stage,
            lines = meter.lines.len(),
            "validating meter"
        );

        let root = errors.root().clone();
        let before = errors.error_count();
        errors
            .reject_if_blank(&root, "locationId", &meter.location_id, ErrorCode::NotEmpty)
            .reject_if_blank(&root, "model", &meter.model, ErrorCode::NotEmpty);
        if errors.error_count() > before {
            return Ok(());
        }

        let Some(item) = self.resolver.resolve_schema(&meter.model) else {
            tracing::debug!(model = %meter.model, "no catalogue item for model");
            errors.add(
                &root,
                FieldError::new("model", ErrorCode::NotFound)
                    .rejecting(meter.model.as_str()),
            );
            return Ok(());
        };

        let outcome = self.validate_against(meter, &item, errors);
        tracing::debug!(
            model = %meter.model,
            error_count = errors.error_count(),
            "meter validated"
        );
        outcome
    }

    /// Steps 3 and 4 of the pass, against an already resolved schema.
    pub fn validate_against(
        &self,
        meter: &Meter,
        item: &CatalogueItem,
        errors: &mut Errors,
    ) -> Result<(), ValidatorError> {
        let duplicates = meter.duplicate_line_names();
        if !duplicates.is_empty() {
            tracing::warn!(model = %meter.model, ?duplicates, "meter has duplicate line names");
        }

        let root = errors.root().clone();
        let mut failure = None;

        for (index, line) in meter.lines.iter().enumerate() {
            let Some(constraint) = item.constraints.iter().find(|c| c.constrains(line)) else {
                continue;
            };
            let at = root.index("lines", index);
            if let Err(e) = self.check_line(constraint, line, index, &at, meter, errors) {
                tracing::warn!(error = %e, line = line.name(), index, "line could not be checked");
                failure.get_or_insert(e);
            }
        }

        let lines_at = root.child("lines");
        for constraint in item
            .constraints
            .iter()
            .filter(|c| c.required && c.is_active_at(meter.stage))
        {
            if !meter.has_line(&constraint.name) {
                errors.reject_value(&lines_at, &constraint.name, ErrorCode::Required);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn check_line(
        &self,
        constraint: &Constraint,
        line: &Line,
        index: usize,
        at: &FieldPath,
        meter: &Meter,
        errors: &mut Errors,
    ) -> Result<(), ValidatorError> {
        let field = constraint.name.as_str();
        let active = constraint.is_active_at(meter.stage);
        match (&constraint.rule, line) {
            (ConstraintRule::Number(rule), Line::Number { value, .. }) => {
                if active {
                    rule.check(field, *value, at, errors);
                }
            }
            (ConstraintRule::Text(rule), Line::Text { value, .. }) => {
                if active {
                    rule.check(field, value, at, errors);
                }
            }
            (ConstraintRule::Pattern(rule), Line::Pattern { value, .. }) => {
                if active {
                    rule.check(field, value, at, errors, &self.patterns)?;
                }
            }
            (rule, line) => {
                return Err(ValidatorError::LineKindMismatch {
                    line: line.name().to_string(),
                    index,
                    line_kind: line.kind(),
                    constraint_kind: rule.line_kind(),
                });
            }
        }
        Ok(())
    }
}

impl<R> fmt::Debug for MeterValidator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeterValidator")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

/// Validate `meter` under top-level context `root` and turn a non-empty
/// error collection into [`ValidatorError::Rejected`].
pub fn validate_meter<R: SchemaResolver>(
    validator: &MeterValidator<R>,
    meter: &Meter,
    root: &str,
) -> Result<(), ValidatorError> {
    let mut errors = Errors::new(root);
    validator.validate(meter, &mut errors)?;
    errors.into_result()?;
    Ok(())
}
