//! # Validation Stage: Lifecycle Ordering
//!
//! A meter moves through four lifecycle stages. Each constraint declares the
//! stage from which it applies; a meter is only held to the constraints its
//! current stage has reached.
//!
//! ```text
//! Intake < Connection < Staging < Deployment
//! ```
//!
//! A constraint declared at `Connection` is skipped entirely for a meter at
//! `Intake` (no value check, no missing-line error) and enforced for a meter
//! at `Connection`, `Staging`, or `Deployment`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MeterbookError;

/// Lifecycle stage of a meter record, totally ordered by declaration order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ValidationStage {
    /// Record has been captured but not yet connected.
    #[default]
    Intake,
    /// Device is being connected to its network.
    Connection,
    /// Device is provisioned in cloud infrastructure ahead of rollout.
    Staging,
    /// Device is live in the field.
    Deployment,
}

impl ValidationStage {
    /// Returns all stages in lifecycle order.
    pub fn all() -> &'static [ValidationStage] {
        &[
            Self::Intake,
            Self::Connection,
            Self::Staging,
            Self::Deployment,
        ]
    }

    /// Returns the identifier used in serialized documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intake => "Intake",
            Self::Connection => "Connection",
            Self::Staging => "Staging",
            Self::Deployment => "Deployment",
        }
    }

    /// Whether a constraint declared at `self` is active for a record at
    /// `current`.
    ///
    /// True once the record has reached the constraint's stage.
    pub fn activates_at(self, current: ValidationStage) -> bool {
        self <= current
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStage {
    type Err = MeterbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Intake" => Ok(Self::Intake),
            "Connection" => Ok(Self::Connection),
            "Staging" => Ok(Self::Staging),
            "Deployment" => Ok(Self::Deployment),
            other => Err(MeterbookError::UnknownStage(other.to_string())),
        }
    }
}
