//! Appointment booking and the hand-off to the workshop.

use super::lifecycle::{JobLifecycleError, JobLifecycleService, Promotion};
use crate::workshop::{
    domain::{
        Appointment, AppointmentId, AppointmentStatus, ClientId, MechanicId, Slot, VehicleId,
        WorkshopDomainError,
    },
    ports::{WorkshopRepositoryError, WorkshopStore},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for booking an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleAppointmentRequest {
    client: ClientId,
    vehicle: VehicleId,
    mechanic: Option<MechanicId>,
    slot: Slot,
    problem: String,
}

impl ScheduleAppointmentRequest {
    /// Creates a request with the required booking fields.
    #[must_use]
    pub fn new(
        client: ClientId,
        vehicle: VehicleId,
        slot: Slot,
        problem: impl Into<String>,
    ) -> Self {
        Self {
            client,
            vehicle,
            mechanic: None,
            slot,
            problem: problem.into(),
        }
    }

    /// Assigns a mechanic.
    #[must_use]
    pub const fn with_mechanic(mut self, mechanic: MechanicId) -> Self {
        self.mechanic = Some(mechanic);
        self
    }
}

/// Request payload for rewriting an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleRequest {
    appointment_id: AppointmentId,
    client: Option<ClientId>,
    vehicle: Option<VehicleId>,
    mechanic: Option<MechanicId>,
    slot: Slot,
    problem: String,
    status: AppointmentStatus,
}

impl RescheduleRequest {
    /// Creates a request; the mechanic assignment is cleared unless set,
    /// while the client and vehicle are kept unless set.
    #[must_use]
    pub fn new(
        appointment_id: AppointmentId,
        slot: Slot,
        problem: impl Into<String>,
        status: AppointmentStatus,
    ) -> Self {
        Self {
            appointment_id,
            client: None,
            vehicle: None,
            mechanic: None,
            slot,
            problem: problem.into(),
            status,
        }
    }

    /// Moves the booking to another client.
    #[must_use]
    pub const fn with_client(mut self, client: ClientId) -> Self {
        self.client = Some(client);
        self
    }

    /// Moves the booking to another vehicle.
    #[must_use]
    pub const fn with_vehicle(mut self, vehicle: VehicleId) -> Self {
        self.vehicle = Some(vehicle);
        self
    }

    /// Assigns a mechanic.
    #[must_use]
    pub const fn with_mechanic(mut self, mechanic: MechanicId) -> Self {
        self.mechanic = Some(mechanic);
        self
    }
}

/// Result of rewriting an appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct RescheduleOutcome {
    /// The appointment as stored after the call.
    pub appointment: Appointment,
    /// Promotion result when the new status sent the vehicle to the shop.
    pub promotion: Option<Promotion>,
}

/// Result of asking to send an appointment to the workshop.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkshopHandoff {
    /// The appointment was promoted, or had been already.
    Promoted(Promotion),
    /// The appointment's status does not allow promotion; nothing changed.
    Skipped {
        /// Status that blocked the hand-off.
        status: AppointmentStatus,
    },
}

/// Service-level errors for scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// The vehicle is not registered to the booking client.
    #[error("vehicle {vehicle} does not belong to client {client}")]
    VehicleNotOwned {
        /// Booking client.
        client: ClientId,
        /// Vehicle named in the booking.
        vehicle: VehicleId,
    },
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkshopDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkshopRepositoryError),
    /// Promotion into a repair failed.
    #[error(transparent)]
    Lifecycle(#[from] JobLifecycleError),
}

/// Result type for scheduling service operations.
pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// Appointment desk service.
#[derive(Clone)]
pub struct SchedulingService<R, C>
where
    R: WorkshopStore,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    lifecycle: JobLifecycleService<R, C>,
}

impl<R, C> SchedulingService<R, C>
where
    R: WorkshopStore,
    C: Clock + Send + Sync,
{
    /// Creates a new scheduling service sharing the store with its
    /// lifecycle manager.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        let lifecycle = JobLifecycleService::new(Arc::clone(&repository), clock);
        Self {
            repository,
            lifecycle,
        }
    }

    /// Books an appointment in [`AppointmentStatus::Scheduled`].
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::VehicleNotOwned`] when the vehicle belongs
    /// to another client, [`SchedulingError::Domain`] for a blank problem,
    /// or [`SchedulingError::Repository`] when a referenced record is missing
    /// or storage fails.
    pub async fn schedule(
        &self,
        request: ScheduleAppointmentRequest,
    ) -> SchedulingResult<Appointment> {
        let appointment = Appointment::schedule(
            request.client,
            request.vehicle,
            request.mechanic,
            request.slot,
            request.problem,
        )?;
        self.check_references(request.client, request.vehicle, request.mechanic)
            .await?;
        self.repository.store_appointment(&appointment).await?;
        tracing::debug!(appointment = %appointment.id(), "appointment scheduled");
        Ok(appointment)
    }

    /// Retrieves an appointment.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::AppointmentNotFound`] when absent.
    pub async fn get(&self, id: AppointmentId) -> SchedulingResult<Appointment> {
        Ok(self
            .repository
            .find_appointment(id)
            .await?
            .ok_or(WorkshopRepositoryError::AppointmentNotFound(id))?)
    }

    /// Deletes an appointment.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::AppointmentNotFound`] when absent.
    pub async fn delete(&self, id: AppointmentId) -> SchedulingResult<()> {
        self.repository.delete_appointment(id).await?;
        Ok(())
    }

    /// Lists appointments not yet converted into jobs, newest slot first.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::Repository`] when storage fails.
    pub async fn list_active(&self) -> SchedulingResult<Vec<Appointment>> {
        Ok(self.repository.list_active_appointments().await?)
    }

    /// Rewrites an appointment. Moving it to
    /// [`AppointmentStatus::InProgress`] sends it to the workshop.
    ///
    /// On the way to the workshop the new booking details are saved under
    /// the previous status and the promotion completes the appointment, so
    /// a failed promotion leaves it eligible for another hand-off.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::VehicleNotOwned`] when the vehicle belongs
    /// to another client, or another [`SchedulingError`] when a referenced
    /// record is missing, the problem is blank, or promotion fails.
    pub async fn reschedule(&self, request: RescheduleRequest) -> SchedulingResult<RescheduleOutcome> {
        let mut appointment = self.get(request.appointment_id).await?;
        let client = request.client.unwrap_or_else(|| appointment.client());
        let vehicle = request.vehicle.unwrap_or_else(|| appointment.vehicle());
        self.check_references(client, vehicle, request.mechanic)
            .await?;
        appointment.reschedule(request.mechanic, request.slot, request.problem)?;
        appointment.reassign(client, vehicle);

        if request.status != AppointmentStatus::InProgress {
            appointment.set_status(request.status);
            self.repository.update_appointment(&appointment).await?;
            return Ok(RescheduleOutcome {
                appointment,
                promotion: None,
            });
        }

        self.repository.update_appointment(&appointment).await?;
        let promotion = self
            .lifecycle
            .promote_appointment_to_repair(appointment.id())
            .await?;
        Ok(RescheduleOutcome {
            appointment: self.get(appointment.id()).await?,
            promotion: Some(promotion),
        })
    }

    /// Sends an appointment to the workshop unless its status forbids it.
    ///
    /// Completed, in-progress and cancelled appointments are skipped, not
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError`] when the appointment is missing or
    /// promotion fails.
    pub async fn send_to_workshop(&self, id: AppointmentId) -> SchedulingResult<WorkshopHandoff> {
        let appointment = self.get(id).await?;
        let status = appointment.status();
        if !status.is_promotable() {
            tracing::warn!(appointment = %id, %status, "appointment not sent to workshop");
            return Ok(WorkshopHandoff::Skipped { status });
        }
        let promotion = self.lifecycle.promote_appointment_to_repair(id).await?;
        Ok(WorkshopHandoff::Promoted(promotion))
    }

    async fn check_references(
        &self,
        client: ClientId,
        vehicle: VehicleId,
        mechanic: Option<MechanicId>,
    ) -> SchedulingResult<()> {
        let stored = self
            .repository
            .find_vehicle(vehicle)
            .await?
            .ok_or(WorkshopRepositoryError::VehicleNotFound(vehicle))?;
        if stored.owner() != client {
            return Err(SchedulingError::VehicleNotOwned { client, vehicle });
        }
        if let Some(mechanic_id) = mechanic {
            self.check_mechanic(mechanic_id).await?;
        }
        Ok(())
    }

    async fn check_mechanic(&self, mechanic: MechanicId) -> SchedulingResult<()> {
        if self.repository.find_mechanic(mechanic).await?.is_none() {
            return Err(WorkshopRepositoryError::MechanicNotFound(mechanic).into());
        }
        Ok(())
    }
}
