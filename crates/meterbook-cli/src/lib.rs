//! # meterbook-cli: Meterbook Command-Line Interface
//!
//! ## Subcommands
//!
//! - `validate`: validate meter documents against a catalogue file
//! - `check-pattern`: run a regex through admission control and test values
//! - `presets`: list the built-in catalogue presets
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers; handlers take parsed
//!   arguments and an output writer and return an exit status.
//! - Handlers delegate to the library crates. No validation logic here.
//! - Logs go to stderr; reports go to the writer (stdout in the binary).

pub mod config;
pub mod pattern;
pub mod presets;
pub mod validate;
