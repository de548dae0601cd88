//! Service layer for the appointment-to-repair job lifecycle.

use crate::workshop::{
    domain::{
        AppointmentId, Cost, DirectIntake, MechanicId, NumericField, Odometer, Repair,
        RepairChanges, RepairId, RepairStatus, VehicleId, WorkshopDomainError,
    },
    ports::{WorkshopRepositoryError, WorkshopStore},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of promoting an appointment.
#[derive(Debug, Clone, PartialEq)]
pub enum Promotion {
    /// A new repair was opened for the appointment.
    Created(Repair),
    /// The appointment had already been promoted; this is that repair.
    AlreadyExisted(Repair),
}

impl Promotion {
    /// Returns whether this call opened the repair.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Returns the repair linked to the appointment.
    #[must_use]
    pub const fn repair(&self) -> &Repair {
        match self {
            Self::Created(repair) | Self::AlreadyExisted(repair) => repair,
        }
    }

    /// Consumes the outcome and returns the repair.
    #[must_use]
    pub fn into_repair(self) -> Repair {
        match self {
            Self::Created(repair) | Self::AlreadyExisted(repair) => repair,
        }
    }
}

/// Request payload for a partial repair update.
///
/// Numeric fields carry the raw text entered by the operator and are parsed
/// before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairUpdateRequest {
    repair_id: RepairId,
    status: RepairStatus,
    work_performed: Option<String>,
    parts_used: Option<String>,
    labor_cost: Option<String>,
    total_cost: Option<String>,
    exit_date: Option<NaiveDate>,
    exit_odometer: Option<String>,
}

impl RepairUpdateRequest {
    /// Creates a request that moves the repair to `status`.
    #[must_use]
    pub const fn new(repair_id: RepairId, status: RepairStatus) -> Self {
        Self {
            repair_id,
            status,
            work_performed: None,
            parts_used: None,
            labor_cost: None,
            total_cost: None,
            exit_date: None,
            exit_odometer: None,
        }
    }

    /// Sets the work performed.
    #[must_use]
    pub fn with_work_performed(mut self, work_performed: impl Into<String>) -> Self {
        self.work_performed = Some(work_performed.into());
        self
    }

    /// Sets the parts used.
    #[must_use]
    pub fn with_parts_used(mut self, parts_used: impl Into<String>) -> Self {
        self.parts_used = Some(parts_used.into());
        self
    }

    /// Sets the labor cost as entered.
    #[must_use]
    pub fn with_labor_cost(mut self, labor_cost: impl Into<String>) -> Self {
        self.labor_cost = Some(labor_cost.into());
        self
    }

    /// Sets the total cost as entered.
    #[must_use]
    pub fn with_total_cost(mut self, total_cost: impl Into<String>) -> Self {
        self.total_cost = Some(total_cost.into());
        self
    }

    /// Sets the exit date.
    #[must_use]
    pub const fn with_exit_date(mut self, exit_date: NaiveDate) -> Self {
        self.exit_date = Some(exit_date);
        self
    }

    /// Sets the exit odometer as entered.
    #[must_use]
    pub fn with_exit_odometer(mut self, exit_odometer: impl Into<String>) -> Self {
        self.exit_odometer = Some(exit_odometer.into());
        self
    }

    fn into_changes(self) -> Result<(RepairId, RepairChanges), WorkshopDomainError> {
        let parse_cost = |field, raw: Option<String>| {
            supplied_number(raw)
                .map(|value| Cost::parse(field, &value))
                .transpose()
        };
        let changes = RepairChanges {
            status: self.status,
            work_performed: self.work_performed,
            parts_used: self.parts_used,
            labor_cost: parse_cost(NumericField::LaborCost, self.labor_cost)?,
            total_cost: parse_cost(NumericField::TotalCost, self.total_cost)?,
            exit_date: self.exit_date,
            exit_odometer: supplied_number(self.exit_odometer)
                .map(|value| Odometer::parse(NumericField::ExitOdometer, &value))
                .transpose()?,
        };
        Ok((self.repair_id, changes))
    }
}

/// Blank numeric entries count as not supplied.
fn supplied_number(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

/// Request payload for a vehicle arriving without an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectIntakeRequest {
    vehicle: VehicleId,
    mechanic: Option<MechanicId>,
    intake_date: NaiveDate,
    intake_odometer: String,
    problem: String,
}

impl DirectIntakeRequest {
    /// Creates a request with the required intake fields.
    #[must_use]
    pub fn new(
        vehicle: VehicleId,
        intake_date: NaiveDate,
        intake_odometer: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        Self {
            vehicle,
            mechanic: None,
            intake_date,
            intake_odometer: intake_odometer.into(),
            problem: problem.into(),
        }
    }

    /// Assigns the receiving mechanic.
    #[must_use]
    pub const fn with_mechanic(mut self, mechanic: MechanicId) -> Self {
        self.mechanic = Some(mechanic);
        self
    }
}

/// Coarse failure classes surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFailureKind {
    /// A referenced record does not exist.
    NotFound,
    /// Caller input was rejected before anything was written.
    InvalidInput,
    /// The storage backend failed.
    StorageFailure,
}

/// Service-level errors for job lifecycle operations.
#[derive(Debug, Error)]
pub enum JobLifecycleError {
    /// The appointment does not exist.
    #[error("appointment not found: {0}")]
    AppointmentNotFound(AppointmentId),

    /// The vehicle does not exist.
    #[error("vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// The repair does not exist.
    #[error("repair not found: {0}")]
    RepairNotFound(RepairId),

    /// The mechanic does not exist.
    #[error("mechanic not found: {0}")]
    MechanicNotFound(MechanicId),

    /// A supplied value was rejected.
    #[error("invalid {field}: '{value}'")]
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value as supplied.
        value: String,
    },

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkshopRepositoryError),
}

impl JobLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> JobFailureKind {
        match self {
            Self::AppointmentNotFound(_)
            | Self::VehicleNotFound(_)
            | Self::RepairNotFound(_)
            | Self::MechanicNotFound(_)
            | Self::Repository(
                WorkshopRepositoryError::ClientNotFound(_)
                | WorkshopRepositoryError::VehicleNotFound(_)
                | WorkshopRepositoryError::MechanicNotFound(_)
                | WorkshopRepositoryError::AppointmentNotFound(_)
                | WorkshopRepositoryError::RepairNotFound(_),
            ) => JobFailureKind::NotFound,
            Self::InvalidInput { .. } => JobFailureKind::InvalidInput,
            Self::Repository(_) => JobFailureKind::StorageFailure,
        }
    }
}

impl From<WorkshopDomainError> for JobLifecycleError {
    fn from(err: WorkshopDomainError) -> Self {
        match err {
            WorkshopDomainError::EmptyField(field) => Self::InvalidInput {
                field,
                value: String::new(),
            },
            WorkshopDomainError::InvalidLicensePlate(value) => Self::InvalidInput {
                field: "license plate",
                value,
            },
            WorkshopDomainError::InvalidNumber { field, value } => Self::InvalidInput {
                field: field.as_str(),
                value,
            },
        }
    }
}

/// Result type for job lifecycle service operations.
pub type JobLifecycleResult<T> = Result<T, JobLifecycleError>;

/// Job lifecycle orchestration service.
#[derive(Clone)]
pub struct JobLifecycleService<R, C>
where
    R: WorkshopStore,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> JobLifecycleService<R, C>
where
    R: WorkshopStore,
    C: Clock + Send + Sync,
{
    /// Creates a new job lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Converts an appointment into a workshop repair, at most once.
    ///
    /// Re-entry returns the existing repair as
    /// [`Promotion::AlreadyExisted`]; so does losing a race against a
    /// concurrent promotion of the same appointment.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::AppointmentNotFound`] or
    /// [`JobLifecycleError::VehicleNotFound`] when a referenced record is
    /// missing, or [`JobLifecycleError::Repository`] when storage fails.
    pub async fn promote_appointment_to_repair(
        &self,
        appointment_id: AppointmentId,
    ) -> JobLifecycleResult<Promotion> {
        let appointment = self
            .repository
            .find_appointment(appointment_id)
            .await?
            .ok_or(JobLifecycleError::AppointmentNotFound(appointment_id))?;

        if let Some(existing) = self.repository.find_repair_by_origin(appointment_id).await? {
            tracing::warn!(
                appointment = %appointment_id,
                repair = %existing.id(),
                "appointment already promoted; returning existing repair"
            );
            return Ok(Promotion::AlreadyExisted(existing));
        }

        let vehicle = self
            .repository
            .find_vehicle(appointment.vehicle())
            .await?
            .ok_or(JobLifecycleError::VehicleNotFound(appointment.vehicle()))?;

        let repair = Repair::from_appointment(&appointment, vehicle.intake_baseline(), &*self.clock);
        match self.repository.store_promoted(&repair).await {
            Ok(()) => {
                tracing::info!(
                    appointment = %appointment_id,
                    repair = %repair.id(),
                    "appointment promoted to repair"
                );
                Ok(Promotion::Created(repair))
            }
            Err(WorkshopRepositoryError::DuplicateAppointmentOrigin(origin)) => {
                self.concurrent_winner(origin).await
            }
            Err(WorkshopRepositoryError::AppointmentNotFound(origin)) => {
                Err(JobLifecycleError::AppointmentNotFound(origin))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn concurrent_winner(&self, origin: AppointmentId) -> JobLifecycleResult<Promotion> {
        let winner = self
            .repository
            .find_repair_by_origin(origin)
            .await?
            .ok_or(WorkshopRepositoryError::DuplicateAppointmentOrigin(origin))?;
        tracing::warn!(
            appointment = %origin,
            repair = %winner.id(),
            "concurrent promotion won the race; returning its repair"
        );
        Ok(Promotion::AlreadyExisted(winner))
    }

    /// Applies a partial update to a repair.
    ///
    /// Every numeric field is parsed before anything is written. Omitted
    /// fields keep their stored values, and so do numeric fields supplied
    /// as blank text.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::InvalidInput`] when a numeric field does
    /// not parse, [`JobLifecycleError::RepairNotFound`] when the repair is
    /// missing, or [`JobLifecycleError::Repository`] when storage fails.
    pub async fn update_repair_status(
        &self,
        request: RepairUpdateRequest,
    ) -> JobLifecycleResult<Repair> {
        let (repair_id, changes) = request.into_changes()?;
        let repair = self
            .repository
            .update_repair(repair_id, &changes)
            .await
            .map_err(|err| missing_repair(err, repair_id))?;
        tracing::debug!(repair = %repair_id, status = %changes.status, "repair updated");
        Ok(repair)
    }

    /// Closes a repair with today's date as exit date.
    ///
    /// Recorded fields are kept; costs still unset when the store writes the
    /// closure become zero.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::RepairNotFound`] when the repair is
    /// missing, or [`JobLifecycleError::Repository`] when storage fails.
    pub async fn finalize_repair(&self, repair_id: RepairId) -> JobLifecycleResult<Repair> {
        let today = self.clock.utc().date_naive();
        let repair = self
            .repository
            .finalize_repair(repair_id, today)
            .await
            .map_err(|err| missing_repair(err, repair_id))?;
        tracing::info!(repair = %repair_id, exit_date = %today, "repair finalized");
        Ok(repair)
    }

    /// Opens a repair for a vehicle that arrived without an appointment.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::InvalidInput`] when the odometer or
    /// problem is invalid, a not-found error when the vehicle or mechanic is
    /// missing, or [`JobLifecycleError::Repository`] when storage fails.
    pub async fn register_direct_intake(
        &self,
        request: DirectIntakeRequest,
    ) -> JobLifecycleResult<Repair> {
        let intake_odometer =
            Odometer::parse(NumericField::IntakeOdometer, &request.intake_odometer)?;
        if self.repository.find_vehicle(request.vehicle).await?.is_none() {
            return Err(JobLifecycleError::VehicleNotFound(request.vehicle));
        }
        if let Some(mechanic) = request.mechanic {
            if self.repository.find_mechanic(mechanic).await?.is_none() {
                return Err(JobLifecycleError::MechanicNotFound(mechanic));
            }
        }

        let repair = Repair::open_direct(
            DirectIntake {
                vehicle: request.vehicle,
                mechanic: request.mechanic,
                intake_date: request.intake_date,
                intake_odometer,
                problem: request.problem,
            },
            &*self.clock,
        )?;
        self.repository.store_repair(&repair).await?;
        tracing::info!(repair = %repair.id(), vehicle = %repair.vehicle(), "direct intake registered");
        Ok(repair)
    }

    /// Retrieves a repair.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::RepairNotFound`] when the repair is
    /// missing, or [`JobLifecycleError::Repository`] when storage fails.
    pub async fn get_repair(&self, repair_id: RepairId) -> JobLifecycleResult<Repair> {
        self.load_repair(repair_id).await
    }

    /// Lists a vehicle's repairs, most recent intake first.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::Repository`] when storage fails.
    pub async fn vehicle_history(&self, vehicle: VehicleId) -> JobLifecycleResult<Vec<Repair>> {
        Ok(self.repository.list_repairs_for_vehicle(vehicle).await?)
    }

    /// Returns the most recent active repair for a vehicle, if any.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::Repository`] when storage fails.
    pub async fn active_repair_for_vehicle(
        &self,
        vehicle: VehicleId,
    ) -> JobLifecycleResult<Option<Repair>> {
        let history = self.vehicle_history(vehicle).await?;
        Ok(history
            .into_iter()
            .find(|repair| repair.status().is_active()))
    }

    /// Lists every repair currently in the shop, by status precedence and
    /// then most recent intake first.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::Repository`] when storage fails.
    pub async fn vehicles_in_shop(&self) -> JobLifecycleResult<Vec<Repair>> {
        Ok(self.repository.list_active_repairs().await?)
    }

    async fn load_repair(&self, repair_id: RepairId) -> JobLifecycleResult<Repair> {
        self.repository
            .find_repair(repair_id)
            .await?
            .ok_or(JobLifecycleError::RepairNotFound(repair_id))
    }

}

fn missing_repair(err: WorkshopRepositoryError, repair_id: RepairId) -> JobLifecycleError {
    match err {
        WorkshopRepositoryError::RepairNotFound(_) => JobLifecycleError::RepairNotFound(repair_id),
        other => other.into(),
    }
}
