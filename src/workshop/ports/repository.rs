//! Repository ports for workshop persistence.
//!
//! One store usually implements every trait here; the traits stay separate
//! so each service names only the records it touches.

use crate::workshop::domain::{
    Appointment, AppointmentId, Client, ClientId, LicensePlate, Mechanic, MechanicId, Repair,
    RepairChanges, RepairId, Vehicle, VehicleId,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workshop repository operations.
pub type WorkshopRepositoryResult<T> = Result<T, WorkshopRepositoryError>;

/// Client persistence contract.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Stores a new client.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::DuplicateNationalId`] when another
    /// client already holds the national ID.
    async fn store_client(&self, client: &Client) -> WorkshopRepositoryResult<()>;

    /// Persists changes to an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::ClientNotFound`] when the client
    /// does not exist or [`WorkshopRepositoryError::DuplicateNationalId`] on
    /// a national ID clash.
    async fn update_client(&self, client: &Client) -> WorkshopRepositoryResult<()>;

    /// Finds a client by identifier.
    async fn find_client(&self, id: ClientId) -> WorkshopRepositoryResult<Option<Client>>;

    /// Lists all clients ordered by last name, then first name.
    async fn list_clients(&self) -> WorkshopRepositoryResult<Vec<Client>>;

    /// Deletes a client together with its vehicles.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::ClientNotFound`] when the client
    /// does not exist.
    async fn delete_client(&self, id: ClientId) -> WorkshopRepositoryResult<()>;
}

/// Vehicle persistence contract.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Stores a new vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::DuplicateLicensePlate`] when the
    /// plate is already registered.
    async fn store_vehicle(&self, vehicle: &Vehicle) -> WorkshopRepositoryResult<()>;

    /// Persists changes to an existing vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::VehicleNotFound`] when the vehicle
    /// does not exist or [`WorkshopRepositoryError::DuplicateLicensePlate`]
    /// on a plate clash.
    async fn update_vehicle(&self, vehicle: &Vehicle) -> WorkshopRepositoryResult<()>;

    /// Finds a vehicle by identifier.
    async fn find_vehicle(&self, id: VehicleId) -> WorkshopRepositoryResult<Option<Vehicle>>;

    /// Lists a client's vehicles ordered by plate.
    async fn list_vehicles_for_client(
        &self,
        owner: ClientId,
    ) -> WorkshopRepositoryResult<Vec<Vehicle>>;

    /// Deletes a vehicle together with its appointments and repairs.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::VehicleNotFound`] when the vehicle
    /// does not exist.
    async fn delete_vehicle(&self, id: VehicleId) -> WorkshopRepositoryResult<()>;
}

/// Mechanic persistence contract.
#[async_trait]
pub trait MechanicRepository: Send + Sync {
    /// Stores a new mechanic.
    async fn store_mechanic(&self, mechanic: &Mechanic) -> WorkshopRepositoryResult<()>;

    /// Persists changes to an existing mechanic.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::MechanicNotFound`] when the
    /// mechanic does not exist.
    async fn update_mechanic(&self, mechanic: &Mechanic) -> WorkshopRepositoryResult<()>;

    /// Finds a mechanic by identifier.
    async fn find_mechanic(&self, id: MechanicId) -> WorkshopRepositoryResult<Option<Mechanic>>;

    /// Lists all mechanics ordered by last name, then first name.
    async fn list_mechanics(&self) -> WorkshopRepositoryResult<Vec<Mechanic>>;

    /// Deletes a mechanic and clears their assignments.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::MechanicNotFound`] when the
    /// mechanic does not exist.
    async fn delete_mechanic(&self, id: MechanicId) -> WorkshopRepositoryResult<()>;
}

/// Appointment persistence contract.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Stores a new appointment.
    async fn store_appointment(&self, appointment: &Appointment) -> WorkshopRepositoryResult<()>;

    /// Persists changes to an existing appointment.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::AppointmentNotFound`] when the
    /// appointment does not exist.
    async fn update_appointment(&self, appointment: &Appointment)
    -> WorkshopRepositoryResult<()>;

    /// Finds an appointment by identifier.
    async fn find_appointment(
        &self,
        id: AppointmentId,
    ) -> WorkshopRepositoryResult<Option<Appointment>>;

    /// Lists appointments that have not been converted into jobs, newest
    /// slot first.
    async fn list_active_appointments(&self) -> WorkshopRepositoryResult<Vec<Appointment>>;

    /// Deletes an appointment. Repairs promoted from it lose their origin
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::AppointmentNotFound`] when the
    /// appointment does not exist.
    async fn delete_appointment(&self, id: AppointmentId) -> WorkshopRepositoryResult<()>;
}

/// Repair persistence contract.
#[async_trait]
pub trait RepairRepository: Send + Sync {
    /// Stores a new repair.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::DuplicateAppointmentOrigin`] when
    /// another repair already originates from the same appointment.
    async fn store_repair(&self, repair: &Repair) -> WorkshopRepositoryResult<()>;

    /// Stores a repair promoted from an appointment and marks that
    /// appointment completed, as one atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::DuplicateAppointmentOrigin`] when
    /// the appointment has already been promoted,
    /// [`WorkshopRepositoryError::AppointmentNotFound`] when the origin does
    /// not exist, or a persistence error when the repair has no origin.
    /// Nothing is written on error.
    async fn store_promoted(&self, repair: &Repair) -> WorkshopRepositoryResult<()>;

    /// Writes the supplied fields of a change set and returns the repair as
    /// stored afterwards.
    ///
    /// Fields the change set omits are not written, so concurrent updates
    /// of different fields all survive.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::RepairNotFound`] when the repair
    /// does not exist.
    async fn update_repair(
        &self,
        id: RepairId,
        changes: &RepairChanges,
    ) -> WorkshopRepositoryResult<Repair>;

    /// Completes a repair on `exit_date` and returns it as stored.
    ///
    /// Costs still unset at the time of the write become zero; every other
    /// recorded field is kept.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::RepairNotFound`] when the repair
    /// does not exist.
    async fn finalize_repair(
        &self,
        id: RepairId,
        exit_date: NaiveDate,
    ) -> WorkshopRepositoryResult<Repair>;

    /// Finds a repair by identifier.
    async fn find_repair(&self, id: RepairId) -> WorkshopRepositoryResult<Option<Repair>>;

    /// Finds the repair promoted from the given appointment.
    async fn find_repair_by_origin(
        &self,
        origin: AppointmentId,
    ) -> WorkshopRepositoryResult<Option<Repair>>;

    /// Lists a vehicle's repairs, most recent intake first.
    async fn list_repairs_for_vehicle(
        &self,
        vehicle: VehicleId,
    ) -> WorkshopRepositoryResult<Vec<Repair>>;

    /// Lists repairs in the active set ordered by status precedence, then
    /// most recent intake first.
    async fn list_active_repairs(&self) -> WorkshopRepositoryResult<Vec<Repair>>;
}

/// Every workshop port, implemented by complete stores.
pub trait WorkshopStore:
    ClientRepository + VehicleRepository + MechanicRepository + AppointmentRepository + RepairRepository
{
}

impl<T> WorkshopStore for T where
    T: ClientRepository
        + VehicleRepository
        + MechanicRepository
        + AppointmentRepository
        + RepairRepository
{
}

/// Errors returned by workshop repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkshopRepositoryError {
    /// The client was not found.
    #[error("client not found: {0}")]
    ClientNotFound(ClientId),

    /// The vehicle was not found.
    #[error("vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// The mechanic was not found.
    #[error("mechanic not found: {0}")]
    MechanicNotFound(MechanicId),

    /// The appointment was not found.
    #[error("appointment not found: {0}")]
    AppointmentNotFound(AppointmentId),

    /// The repair was not found.
    #[error("repair not found: {0}")]
    RepairNotFound(RepairId),

    /// Another client already holds the national ID.
    #[error("duplicate national id: {0}")]
    DuplicateNationalId(String),

    /// Another vehicle already carries the plate.
    #[error("duplicate license plate: {0}")]
    DuplicateLicensePlate(LicensePlate),

    /// A repair for the appointment already exists.
    #[error("duplicate appointment origin: {0}")]
    DuplicateAppointmentOrigin(AppointmentId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkshopRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
