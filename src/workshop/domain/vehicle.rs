//! Vehicle records and license plates.

use super::{ClientId, Odometer, VehicleId, WorkshopDomainError, client::required_text};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized license plate: trimmed, upper-cased, without inner whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicensePlate(String);

impl LicensePlate {
    /// Creates a validated license plate.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopDomainError::InvalidLicensePlate`] when the value is
    /// empty or contains whitespace between characters.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkshopDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(WorkshopDomainError::InvalidLicensePlate(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the plate as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive vehicle details captured at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDetails {
    plate: LicensePlate,
    make: String,
    model: String,
    year: Option<u16>,
    baseline_odometer: Option<Odometer>,
}

impl VehicleDetails {
    /// Creates validated vehicle details.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopDomainError`] when the plate is invalid or the make
    /// or model is blank.
    pub fn new(
        plate: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, WorkshopDomainError> {
        Ok(Self {
            plate: LicensePlate::new(plate)?,
            make: required_text(make, "make")?,
            model: required_text(model, "model")?,
            year: None,
            baseline_odometer: None,
        })
    }

    /// Sets the model year.
    #[must_use]
    pub const fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the odometer reading recorded when the vehicle was registered.
    #[must_use]
    pub const fn with_baseline_odometer(mut self, reading: Odometer) -> Self {
        self.baseline_odometer = Some(reading);
        self
    }

    /// Returns the license plate.
    #[must_use]
    pub const fn plate(&self) -> &LicensePlate {
        &self.plate
    }

    /// Returns the make.
    #[must_use]
    pub fn make(&self) -> &str {
        &self.make
    }

    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the model year, if recorded.
    #[must_use]
    pub const fn year(&self) -> Option<u16> {
        self.year
    }

    /// Returns the baseline odometer, if recorded.
    #[must_use]
    pub const fn baseline_odometer(&self) -> Option<Odometer> {
        self.baseline_odometer
    }
}

/// A vehicle owned by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    id: VehicleId,
    owner: ClientId,
    details: VehicleDetails,
}

impl Vehicle {
    /// Creates a new vehicle for the given owner.
    #[must_use]
    pub fn new(owner: ClientId, details: VehicleDetails) -> Self {
        Self::from_persisted(VehicleId::new(), owner, details)
    }

    /// Reconstructs a vehicle from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: VehicleId, owner: ClientId, details: VehicleDetails) -> Self {
        Self { id, owner, details }
    }

    /// Returns the vehicle identifier.
    #[must_use]
    pub const fn id(&self) -> VehicleId {
        self.id
    }

    /// Returns the owning client.
    #[must_use]
    pub const fn owner(&self) -> ClientId {
        self.owner
    }

    /// Returns the vehicle details.
    #[must_use]
    pub const fn details(&self) -> &VehicleDetails {
        &self.details
    }

    /// Returns the license plate.
    #[must_use]
    pub const fn plate(&self) -> &LicensePlate {
        self.details.plate()
    }

    /// Returns the odometer reading that seeds repairs promoted from
    /// appointments, defaulting to zero when none was recorded.
    #[must_use]
    pub fn intake_baseline(&self) -> Odometer {
        self.details.baseline_odometer().unwrap_or_default()
    }

    /// Replaces the vehicle details.
    pub fn revise(&mut self, details: VehicleDetails) {
        self.details = details;
    }
}
