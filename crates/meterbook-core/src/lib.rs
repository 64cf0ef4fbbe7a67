//! # meterbook-core: Foundational Types for Meterbook
//!
//! This crate is the leaf of the Meterbook dependency DAG. It defines the
//! value model that every other crate validates against and the error model
//! that every validation pass writes into.
//!
//! ## Key Design Principles
//!
//! 1. **Closed variants.** [`Line`] and [`NumberKind`] are enums. Every
//!    consumer matches exhaustively, so a new line kind is a compile error
//!    until every validation path handles it.
//!
//! 2. **Totally ordered stages.** [`ValidationStage`] derives `Ord`; stage
//!    gating is a single comparison, defined once in
//!    [`ValidationStage::activates_at`].
//!
//! 3. **Collected, not thrown.** Business-rule violations are [`FieldError`]
//!    records accumulated in [`Errors`]. Only the caller decides whether a
//!    non-empty collection is a failure ([`Errors::into_result`]).
//!
//! 4. **Immutable context.** Error locations are [`FieldPath`] values passed
//!    by argument and extended with [`FieldPath::child`]. There is no
//!    push/pop context stack to unbalance.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `meterbook-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod line;
pub mod meter;
pub mod path;
pub mod stage;
pub mod violation;

// Re-export primary types for ergonomic imports.
pub use error::MeterbookError;
pub use line::{Line, LineKind, NumberKind};
pub use meter::Meter;
pub use path::FieldPath;
pub use stage::ValidationStage;
pub use violation::{ErrorArg, ErrorCode, Errors, FieldError, ValidationFailed};
