//! # meterbook-catalogue: Per-Model Validation Schemas
//!
//! A catalogue item describes one manufacturer model: its metadata and the
//! ordered list of [`Constraint`]s a meter of that model must satisfy.
//!
//! ## Constraints
//!
//! A [`Constraint`] names a field, says whether it is required, declares the
//! lifecycle stage from which it applies, and carries exactly one typed rule:
//!
//! - [`NumberRule`]: integer/float kind with optional inclusive bounds.
//! - [`TextRule`]: optional minimum and maximum length.
//! - [`PatternRule`]: a full-string regular expression.
//!
//! Each rule kind pairs with exactly one [`Line`](meterbook_core::Line)
//! variant; see [`ConstraintRule::line_kind`].
//!
//! ## Pattern Admission Control (`pattern`)
//!
//! Pattern rules are the only fallible constructors in the crate. Patterns
//! longer than [`MAX_PATTERN_LENGTH`] characters, patterns matching the
//! nested-quantifier heuristics, and syntactically invalid patterns are
//! rejected when the constraint is built, never at validation time.
//! Compiled patterns are memoized in a concurrent [`PatternCache`].
//!
//! ## Schema Resolution (`store`)
//!
//! Validation looks schemas up through the [`SchemaResolver`] trait.
//! [`InMemoryCatalogue`] is the bundled implementation.
//!
//! ## Crate Policy
//!
//! - Depends only on `meterbook-core` internally.
//! - Catalogue items and constraints are immutable once shared; the store
//!   hands out `Arc<CatalogueItem>`.

pub mod constraint;
pub mod error;
pub mod item;
pub mod pattern;
pub mod presets;
pub mod store;

pub use constraint::{Constraint, ConstraintRule, NumberRule, PatternRule, TextRule};
pub use error::CatalogueError;
pub use item::{CatalogueItem, Level, MeterType, Preset};
pub use pattern::{GuardedPattern, PatternCache, MAX_PATTERN_LENGTH};
pub use store::{CatalogueDocument, InMemoryCatalogue, SchemaResolver};
