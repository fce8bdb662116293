//! Violation taxonomy for attribute checks
//!
//! Every check function in the model produces exactly one outcome: `Ok(())`
//! (no violation) or one of the typed violation kinds below. Violations are
//! the only error-signaling mechanism in the model layer; storage failures
//! use their own error type and never masquerade as violations.

use serde::Serialize;
use thiserror::Error;

/// Result type of every attribute check and setter.
pub type ValidationResult = Result<(), Violation>;

/// Closed set of constraint violation kinds.
///
/// Each variant carries a human-readable message intended for direct display
/// next to a form field or in a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum Violation {
    /// A required value is absent.
    #[error("{0}")]
    MandatoryValue(String),
    /// A value is present but outside its admissible domain.
    #[error("{0}")]
    Range(String),
    /// A value does not match its declared pattern.
    #[error("{0}")]
    Pattern(String),
    /// A numeric value lies outside its declared interval.
    #[error("{0}")]
    Interval(String),
    /// A key value is already taken by a live record.
    #[error("{0}")]
    Uniqueness(String),
    /// An attempt to change a write-once attribute.
    #[error("{0}")]
    FrozenValue(String),
    /// Any other constraint, e.g. a segment attribute supplied under the
    /// wrong subtype.
    #[error("{0}")]
    Other(String),
}

impl Violation {
    /// Stable machine-readable kind name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Violation::MandatoryValue(_) => "MANDATORY_VALUE",
            Violation::Range(_) => "RANGE",
            Violation::Pattern(_) => "PATTERN",
            Violation::Interval(_) => "INTERVAL",
            Violation::Uniqueness(_) => "UNIQUENESS",
            Violation::FrozenValue(_) => "FROZEN_VALUE",
            Violation::Other(_) => "OTHER",
        }
    }

    /// The display message carried by this violation.
    pub fn message(&self) -> &str {
        match self {
            Violation::MandatoryValue(m)
            | Violation::Range(m)
            | Violation::Pattern(m)
            | Violation::Interval(m)
            | Violation::Uniqueness(m)
            | Violation::FrozenValue(m)
            | Violation::Other(m) => m,
        }
    }
}
