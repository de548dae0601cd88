//! Odometer readings and monetary amounts.

use super::{NumericField, WorkshopDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Odometer reading in kilometres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Odometer(u32);

impl Odometer {
    /// Creates a reading from a kilometre count.
    #[must_use]
    pub const fn new(kilometres: u32) -> Self {
        Self(kilometres)
    }

    /// Parses a reading entered as text.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopDomainError::InvalidNumber`] when the input is not a
    /// non-negative whole number.
    pub fn parse(field: NumericField, raw: &str) -> Result<Self, WorkshopDomainError> {
        raw.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| WorkshopDomainError::InvalidNumber {
                field,
                value: raw.to_owned(),
            })
    }

    /// Returns the kilometre count.
    #[must_use]
    pub const fn kilometres(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Odometer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} km", self.0)
    }
}

/// Monetary amount charged for a repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cost(f64);

impl Cost {
    /// Zero cost, used when a finalized repair never had a cost recorded.
    pub const ZERO: Self = Self(0.0);

    /// Wraps an amount.
    #[must_use]
    pub const fn new(amount: f64) -> Self {
        Self(amount)
    }

    /// Parses an amount entered as text.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopDomainError::InvalidNumber`] when the input is not a
    /// finite decimal number.
    pub fn parse(field: NumericField, raw: &str) -> Result<Self, WorkshopDomainError> {
        let invalid = || WorkshopDomainError::InvalidNumber {
            field,
            value: raw.to_owned(),
        };
        let amount = raw.trim().parse::<f64>().map_err(|_| invalid())?;
        if !amount.is_finite() {
            return Err(invalid());
        }
        Ok(Self(amount))
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
