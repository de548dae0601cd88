//! Repair aggregate root and its status model.

use super::{
    Appointment, AppointmentId, Cost, MechanicId, Odometer, ParseRepairStatusError, RepairId,
    VehicleId, WorkshopDomainError,
    client::{optional_text, required_text},
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repair job status.
///
/// `InProgress`, `Pending` and `AwaitingParts` form the active set: the
/// vehicle is physically in the shop. `Completed` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    /// Work is under way.
    InProgress,
    /// Work is waiting to start or on hold.
    Pending,
    /// Work is blocked on parts delivery.
    AwaitingParts,
    /// The vehicle has been returned.
    Completed,
    /// The job was abandoned.
    Cancelled,
}

impl RepairStatus {
    /// Statuses considered "currently in the shop", in display precedence.
    pub const ACTIVE: [Self; 3] = [Self::InProgress, Self::Pending, Self::AwaitingParts];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Pending => "pending",
            Self::AwaitingParts => "awaiting_parts",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the status belongs to the active set.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.shop_precedence().is_some()
    }

    /// Returns whether no further work is expected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Ordering key for shop-floor listings; `None` outside the active set.
    #[must_use]
    pub const fn shop_precedence(self) -> Option<u8> {
        match self {
            Self::InProgress => Some(1),
            Self::Pending => Some(2),
            Self::AwaitingParts => Some(3),
            Self::Completed | Self::Cancelled => None,
        }
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RepairStatus {
    type Error = ParseRepairStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "in_progress" => Ok(Self::InProgress),
            "pending" => Ok(Self::Pending),
            "awaiting_parts" => Ok(Self::AwaitingParts),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseRepairStatusError(value.to_owned())),
        }
    }
}

/// Fields supplied when a vehicle is booked straight into the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectIntake {
    /// Vehicle entering the shop.
    pub vehicle: VehicleId,
    /// Mechanic receiving the vehicle, if any.
    pub mechanic: Option<MechanicId>,
    /// Intake date.
    pub intake_date: NaiveDate,
    /// Odometer reading at intake.
    pub intake_odometer: Odometer,
    /// Reported problem.
    pub problem: String,
}

/// Typed partial update for a repair.
///
/// `None` means "leave the stored value alone".
#[derive(Debug, Clone, PartialEq)]
pub struct RepairChanges {
    /// New status.
    pub status: RepairStatus,
    /// Work performed.
    pub work_performed: Option<String>,
    /// Parts used.
    pub parts_used: Option<String>,
    /// Labor cost.
    pub labor_cost: Option<Cost>,
    /// Total cost.
    pub total_cost: Option<Cost>,
    /// Date the vehicle left the shop.
    pub exit_date: Option<NaiveDate>,
    /// Odometer reading when the vehicle left the shop.
    pub exit_odometer: Option<Odometer>,
}

impl RepairChanges {
    /// Creates a change set that only moves the status.
    #[must_use]
    pub const fn status_only(status: RepairStatus) -> Self {
        Self {
            status,
            work_performed: None,
            parts_used: None,
            labor_cost: None,
            total_cost: None,
            exit_date: None,
            exit_odometer: None,
        }
    }

    /// Returns the work-performed update. The outer `None` leaves the field
    /// alone; `Some(None)` clears it.
    #[must_use]
    pub fn work_performed_update(&self) -> Option<Option<String>> {
        self.work_performed
            .as_ref()
            .map(|text| optional_text(Some(text.clone())))
    }

    /// Returns the parts-used update, shaped like
    /// [`Self::work_performed_update`].
    #[must_use]
    pub fn parts_used_update(&self) -> Option<Option<String>> {
        self.parts_used
            .as_ref()
            .map(|text| optional_text(Some(text.clone())))
    }
}

/// Workshop job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repair {
    id: RepairId,
    vehicle: VehicleId,
    mechanic: Option<MechanicId>,
    intake_date: NaiveDate,
    exit_date: Option<NaiveDate>,
    intake_odometer: Odometer,
    exit_odometer: Option<Odometer>,
    problem: String,
    work_performed: Option<String>,
    parts_used: Option<String>,
    labor_cost: Option<Cost>,
    total_cost: Option<Cost>,
    status: RepairStatus,
    origin: Option<AppointmentId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted repair.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRepairData {
    /// Persisted repair identifier.
    pub id: RepairId,
    /// Vehicle under repair.
    pub vehicle: VehicleId,
    /// Assigned mechanic, if any.
    pub mechanic: Option<MechanicId>,
    /// Intake date.
    pub intake_date: NaiveDate,
    /// Exit date, if the vehicle has left.
    pub exit_date: Option<NaiveDate>,
    /// Intake odometer reading.
    pub intake_odometer: Odometer,
    /// Exit odometer reading, if recorded.
    pub exit_odometer: Option<Odometer>,
    /// Reported problem.
    pub problem: String,
    /// Work performed, if recorded.
    pub work_performed: Option<String>,
    /// Parts used, if recorded.
    pub parts_used: Option<String>,
    /// Labor cost, if recorded.
    pub labor_cost: Option<Cost>,
    /// Total cost, if recorded.
    pub total_cost: Option<Cost>,
    /// Persisted status.
    pub status: RepairStatus,
    /// Originating appointment, if promoted.
    pub origin: Option<AppointmentId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Repair {
    /// Opens a repair for an appointment that is being sent to the workshop.
    ///
    /// The intake date is the appointment date and the problem text is copied
    /// verbatim.
    #[must_use]
    pub fn from_appointment(
        appointment: &Appointment,
        intake_odometer: Odometer,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: RepairId::new(),
            vehicle: appointment.vehicle(),
            mechanic: appointment.mechanic(),
            intake_date: appointment.slot().date,
            exit_date: None,
            intake_odometer,
            exit_odometer: None,
            problem: appointment.problem().to_owned(),
            work_performed: None,
            parts_used: None,
            labor_cost: None,
            total_cost: None,
            status: RepairStatus::InProgress,
            origin: Some(appointment.id()),
            created_at: clock.utc(),
        }
    }

    /// Opens a repair for a vehicle that arrived without an appointment.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopDomainError::EmptyField`] when the problem
    /// description is blank.
    pub fn open_direct(
        intake: DirectIntake,
        clock: &impl Clock,
    ) -> Result<Self, WorkshopDomainError> {
        Ok(Self {
            id: RepairId::new(),
            vehicle: intake.vehicle,
            mechanic: intake.mechanic,
            intake_date: intake.intake_date,
            exit_date: None,
            intake_odometer: intake.intake_odometer,
            exit_odometer: None,
            problem: required_text(intake.problem, "reported problem")?,
            work_performed: None,
            parts_used: None,
            labor_cost: None,
            total_cost: None,
            status: RepairStatus::InProgress,
            origin: None,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a repair from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRepairData) -> Self {
        Self {
            id: data.id,
            vehicle: data.vehicle,
            mechanic: data.mechanic,
            intake_date: data.intake_date,
            exit_date: data.exit_date,
            intake_odometer: data.intake_odometer,
            exit_odometer: data.exit_odometer,
            problem: data.problem,
            work_performed: data.work_performed,
            parts_used: data.parts_used,
            labor_cost: data.labor_cost,
            total_cost: data.total_cost,
            status: data.status,
            origin: data.origin,
            created_at: data.created_at,
        }
    }

    /// Returns the repair identifier.
    #[must_use]
    pub const fn id(&self) -> RepairId {
        self.id
    }

    /// Returns the vehicle under repair.
    #[must_use]
    pub const fn vehicle(&self) -> VehicleId {
        self.vehicle
    }

    /// Returns the assigned mechanic, if any.
    #[must_use]
    pub const fn mechanic(&self) -> Option<MechanicId> {
        self.mechanic
    }

    /// Returns the intake date.
    #[must_use]
    pub const fn intake_date(&self) -> NaiveDate {
        self.intake_date
    }

    /// Returns the exit date, if the vehicle has left.
    #[must_use]
    pub const fn exit_date(&self) -> Option<NaiveDate> {
        self.exit_date
    }

    /// Returns the intake odometer reading.
    #[must_use]
    pub const fn intake_odometer(&self) -> Odometer {
        self.intake_odometer
    }

    /// Returns the exit odometer reading, if recorded.
    #[must_use]
    pub const fn exit_odometer(&self) -> Option<Odometer> {
        self.exit_odometer
    }

    /// Returns the reported problem.
    #[must_use]
    pub fn problem(&self) -> &str {
        &self.problem
    }

    /// Returns the work performed, if recorded.
    #[must_use]
    pub fn work_performed(&self) -> Option<&str> {
        self.work_performed.as_deref()
    }

    /// Returns the parts used, if recorded.
    #[must_use]
    pub fn parts_used(&self) -> Option<&str> {
        self.parts_used.as_deref()
    }

    /// Returns the labor cost, if recorded.
    #[must_use]
    pub const fn labor_cost(&self) -> Option<Cost> {
        self.labor_cost
    }

    /// Returns the total cost, if recorded.
    #[must_use]
    pub const fn total_cost(&self) -> Option<Cost> {
        self.total_cost
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> RepairStatus {
        self.status
    }

    /// Returns the appointment this repair was promoted from, if any.
    #[must_use]
    pub const fn origin(&self) -> Option<AppointmentId> {
        self.origin
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Drops the mechanic assignment.
    pub const fn unassign_mechanic(&mut self) {
        self.mechanic = None;
    }

    /// Forgets the originating appointment once it has been deleted.
    pub const fn detach_origin(&mut self) {
        self.origin = None;
    }

    /// Applies a partial update.
    ///
    /// The status always changes; every other field is overwritten only when
    /// the change set supplies it. Supplied blank text clears the field.
    pub fn apply(&mut self, changes: &RepairChanges) {
        self.status = changes.status;
        if let Some(text) = changes.work_performed_update() {
            self.work_performed = text;
        }
        if let Some(text) = changes.parts_used_update() {
            self.parts_used = text;
        }
        if changes.labor_cost.is_some() {
            self.labor_cost = changes.labor_cost;
        }
        if changes.total_cost.is_some() {
            self.total_cost = changes.total_cost;
        }
        if changes.exit_date.is_some() {
            self.exit_date = changes.exit_date;
        }
        if changes.exit_odometer.is_some() {
            self.exit_odometer = changes.exit_odometer;
        }
    }

    /// Closes the job on `exit_date`, zeroing unset costs.
    pub fn finalize(&mut self, exit_date: NaiveDate) {
        let closing = self.finalization(exit_date);
        self.apply(&closing);
    }

    /// Builds the change set that closes the job on `exit_date`.
    ///
    /// Every optional field is re-supplied with its current value so the
    /// update cannot lose data; unset costs become zero.
    #[must_use]
    pub fn finalization(&self, exit_date: NaiveDate) -> RepairChanges {
        RepairChanges {
            status: RepairStatus::Completed,
            work_performed: self.work_performed.clone(),
            parts_used: self.parts_used.clone(),
            labor_cost: Some(self.labor_cost.unwrap_or(Cost::ZERO)),
            total_cost: Some(self.total_cost.unwrap_or(Cost::ZERO)),
            exit_date: Some(exit_date),
            exit_odometer: self.exit_odometer,
        }
    }
}
