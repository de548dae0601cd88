//! Domain model for the repair shop.
//!
//! Clients, vehicles and mechanics are reference data with natural-key
//! uniqueness. Appointments and repairs carry the job lifecycle: an
//! appointment is promoted into at most one repair, and a repair moves
//! through its statuses while keeping previously recorded fields.

mod appointment;
mod client;
mod error;
mod ids;
mod repair;
mod units;
mod vehicle;

pub use appointment::{Appointment, AppointmentStatus, PersistedAppointmentData, Slot};
pub use client::{Client, ContactDetails, Mechanic, PersonName};
pub use error::{
    NumericField, ParseAppointmentStatusError, ParseRepairStatusError, WorkshopDomainError,
};
pub use ids::{AppointmentId, ClientId, MechanicId, RepairId, VehicleId};
pub use repair::{DirectIntake, PersistedRepairData, Repair, RepairChanges, RepairStatus};
pub use units::{Cost, Odometer};
pub use vehicle::{LicensePlate, Vehicle, VehicleDetails};
