//! Appointment ("turno") aggregate.

use super::{
    AppointmentId, ClientId, MechanicId, ParseAppointmentStatusError, VehicleId,
    WorkshopDomainError, client::required_text,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Appointment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// The visit is booked and has not started.
    Scheduled,
    /// The vehicle is being worked on.
    InProgress,
    /// The appointment has been converted into a workshop job.
    Completed,
    /// The visit was called off.
    Cancelled,
}

impl AppointmentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the appointment may still be sent to the workshop.
    ///
    /// Completed, in-progress and cancelled appointments are refused.
    #[must_use]
    pub const fn is_promotable(self) -> bool {
        matches!(self, Self::Scheduled)
    }

    /// Returns whether the appointment appears in active listings.
    #[must_use]
    pub const fn is_listed_as_active(self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AppointmentStatus {
    type Error = ParseAppointmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseAppointmentStatusError(value.to_owned())),
        }
    }
}

/// Date and time slot of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Scheduled date.
    pub date: NaiveDate,
    /// Scheduled time of day.
    pub time: NaiveTime,
}

impl Slot {
    /// Creates a slot.
    #[must_use]
    pub const fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

/// A scheduled workshop visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    id: AppointmentId,
    client: ClientId,
    vehicle: VehicleId,
    mechanic: Option<MechanicId>,
    slot: Slot,
    problem: String,
    status: AppointmentStatus,
}

/// Parameter object for reconstructing a persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAppointmentData {
    /// Persisted appointment identifier.
    pub id: AppointmentId,
    /// Client who booked the visit.
    pub client: ClientId,
    /// Vehicle to be inspected.
    pub vehicle: VehicleId,
    /// Assigned mechanic, if any.
    pub mechanic: Option<MechanicId>,
    /// Scheduled slot.
    pub slot: Slot,
    /// Reported problem.
    pub problem: String,
    /// Persisted status.
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Books a new appointment in [`AppointmentStatus::Scheduled`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopDomainError::EmptyField`] when the problem
    /// description is blank.
    pub fn schedule(
        client: ClientId,
        vehicle: VehicleId,
        mechanic: Option<MechanicId>,
        slot: Slot,
        problem: impl Into<String>,
    ) -> Result<Self, WorkshopDomainError> {
        Ok(Self {
            id: AppointmentId::new(),
            client,
            vehicle,
            mechanic,
            slot,
            problem: required_text(problem, "reported problem")?,
            status: AppointmentStatus::Scheduled,
        })
    }

    /// Reconstructs an appointment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAppointmentData) -> Self {
        Self {
            id: data.id,
            client: data.client,
            vehicle: data.vehicle,
            mechanic: data.mechanic,
            slot: data.slot,
            problem: data.problem,
            status: data.status,
        }
    }

    /// Returns the appointment identifier.
    #[must_use]
    pub const fn id(&self) -> AppointmentId {
        self.id
    }

    /// Returns the client who booked the visit.
    #[must_use]
    pub const fn client(&self) -> ClientId {
        self.client
    }

    /// Returns the vehicle to be inspected.
    #[must_use]
    pub const fn vehicle(&self) -> VehicleId {
        self.vehicle
    }

    /// Returns the assigned mechanic, if any.
    #[must_use]
    pub const fn mechanic(&self) -> Option<MechanicId> {
        self.mechanic
    }

    /// Returns the scheduled slot.
    #[must_use]
    pub const fn slot(&self) -> Slot {
        self.slot
    }

    /// Returns the reported problem.
    #[must_use]
    pub fn problem(&self) -> &str {
        &self.problem
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> AppointmentStatus {
        self.status
    }

    /// Moves the appointment to a new slot and rewrites its booking details.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopDomainError::EmptyField`] when the problem
    /// description is blank.
    pub fn reschedule(
        &mut self,
        mechanic: Option<MechanicId>,
        slot: Slot,
        problem: impl Into<String>,
    ) -> Result<(), WorkshopDomainError> {
        self.problem = required_text(problem, "reported problem")?;
        self.mechanic = mechanic;
        self.slot = slot;
        Ok(())
    }

    /// Moves the booking to another client and vehicle.
    pub const fn reassign(&mut self, client: ClientId, vehicle: VehicleId) {
        self.client = client;
        self.vehicle = vehicle;
    }

    /// Sets the status without transition checks.
    pub const fn set_status(&mut self, status: AppointmentStatus) {
        self.status = status;
    }

    /// Marks the appointment as converted into a workshop job.
    pub const fn mark_converted(&mut self) {
        self.status = AppointmentStatus::Completed;
    }

    /// Drops the mechanic assignment.
    pub const fn unassign_mechanic(&mut self) {
        self.mechanic = None;
    }
}
