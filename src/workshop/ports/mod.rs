//! Port contracts for workshop persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by workshop services.

pub mod repository;

pub use repository::{
    AppointmentRepository, ClientRepository, MechanicRepository, RepairRepository,
    VehicleRepository, WorkshopRepositoryError, WorkshopRepositoryResult, WorkshopStore,
};
