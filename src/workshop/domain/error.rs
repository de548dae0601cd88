//! Error types for workshop domain validation and parsing.

use std::fmt;
use thiserror::Error;

/// Numeric inputs that arrive as free text and must be parsed before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    /// Labor cost of a repair.
    LaborCost,
    /// Total cost of a repair.
    TotalCost,
    /// Odometer reading when the vehicle entered the shop.
    IntakeOdometer,
    /// Odometer reading when the vehicle left the shop.
    ExitOdometer,
    /// Baseline odometer recorded with a vehicle.
    BaselineOdometer,
}

impl NumericField {
    /// Returns a human-readable field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LaborCost => "labor cost",
            Self::TotalCost => "total cost",
            Self::IntakeOdometer => "intake odometer",
            Self::ExitOdometer => "exit odometer",
            Self::BaselineOdometer => "baseline odometer",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned while constructing workshop domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkshopDomainError {
    /// A required text field is empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The license plate is empty or contains whitespace.
    #[error("invalid license plate '{0}'")]
    InvalidLicensePlate(String),

    /// A numeric input could not be parsed.
    #[error("invalid {field}: '{value}' is not a valid number")]
    InvalidNumber {
        /// Field that failed to parse.
        field: NumericField,
        /// Raw input as supplied by the caller.
        value: String,
    },
}

/// Error returned while parsing appointment statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown appointment status: {0}")]
pub struct ParseAppointmentStatusError(pub String);

/// Error returned while parsing repair statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown repair status: {0}")]
pub struct ParseRepairStatusError(pub String);
