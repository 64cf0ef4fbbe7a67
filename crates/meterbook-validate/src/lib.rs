//! # meterbook-validate: Meter Validation
//!
//! Checks a [`Meter`](meterbook_core::Meter) against the catalogue schema for
//! its model and records every violation into an
//! [`Errors`](meterbook_core::Errors) accumulator.
//!
//! ## Usage
//!
//! ```ignore
//! let validator = MeterValidator::new(catalogue);
//! let mut errors = Errors::new("meter");
//! validator.validate(&meter, &mut errors)?;
//! for err in &errors {
//!     println!("{err}");
//! }
//! ```
//!
//! [`validate_meter`] wraps the pass for callers that only want pass/fail,
//! returning [`ValidatorError::Rejected`] with the full error list.
//!
//! ## Crate Policy
//!
//! - Schema lookup goes through [`SchemaResolver`](meterbook_catalogue::SchemaResolver);
//!   the validator never owns catalogue storage.
//! - Validation performs no I/O and never panics on meter content.
//! - One [`Errors`](meterbook_core::Errors) per pass; validators themselves
//!   are shareable across threads when their resolver is.

pub mod error;
pub mod validator;

pub use error::ValidatorError;
pub use meterbook_core::ValidationFailed;
pub use validator::{validate_meter, MeterValidator};
