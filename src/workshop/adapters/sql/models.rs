//! Diesel row models for workshop persistence and their mapping to domain
//! aggregates.

use super::schema::{appointments, clients, mechanics, repairs, vehicles};
use crate::workshop::{
    domain::{
        Appointment, AppointmentId, AppointmentStatus, Client, ClientId, ContactDetails, Cost,
        Mechanic, MechanicId, Odometer, PersistedAppointmentData, PersistedRepairData,
        PersonName, Repair, RepairChanges, RepairId, RepairStatus, Slot, Vehicle,
        VehicleDetails, VehicleId,
    },
    ports::{WorkshopRepositoryError, WorkshopRepositoryResult},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use std::str::FromStr;

/// Client row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = clients)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg, diesel::sqlite::Sqlite))]
pub struct ClientRow {
    /// Client identifier.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// National ID.
    pub national_id: Option<String>,
}

/// Vehicle row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = vehicles)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg, diesel::sqlite::Sqlite))]
pub struct VehicleRow {
    /// Vehicle identifier.
    pub id: String,
    /// Owning client.
    pub client_id: String,
    /// License plate.
    pub plate: String,
    /// Make.
    pub make: String,
    /// Model.
    pub model: String,
    /// Model year.
    pub model_year: Option<i32>,
    /// Baseline odometer.
    pub baseline_odometer: Option<i64>,
}

/// Mechanic row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = mechanics)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg, diesel::sqlite::Sqlite))]
pub struct MechanicRow {
    /// Mechanic identifier.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

/// Appointment row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = appointments)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg, diesel::sqlite::Sqlite))]
pub struct AppointmentRow {
    /// Appointment identifier.
    pub id: String,
    /// Booking client.
    pub client_id: String,
    /// Vehicle to inspect.
    pub vehicle_id: String,
    /// Assigned mechanic.
    pub mechanic_id: Option<String>,
    /// Scheduled date.
    pub scheduled_date: NaiveDate,
    /// Scheduled time.
    pub scheduled_time: NaiveTime,
    /// Reported problem.
    pub problem: String,
    /// Status.
    pub status: String,
}

/// Repair row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = repairs)]
#[diesel(check_for_backend(diesel::pg::Pg, diesel::sqlite::Sqlite))]
pub struct RepairRow {
    /// Repair identifier.
    pub id: String,
    /// Vehicle under repair.
    pub vehicle_id: String,
    /// Assigned mechanic.
    pub mechanic_id: Option<String>,
    /// Intake date.
    pub intake_date: NaiveDate,
    /// Exit date.
    pub exit_date: Option<NaiveDate>,
    /// Intake odometer reading.
    pub intake_odometer: i64,
    /// Exit odometer reading.
    pub exit_odometer: Option<i64>,
    /// Reported problem.
    pub problem: String,
    /// Work performed.
    pub work_performed: Option<String>,
    /// Parts used.
    pub parts_used: Option<String>,
    /// Labor cost.
    pub labor_cost: Option<f64>,
    /// Total cost.
    pub total_cost: Option<f64>,
    /// Status.
    pub status: String,
    /// Originating appointment.
    pub origin_appointment_id: Option<String>,
    /// Creation timestamp in UTC.
    pub created_at: NaiveDateTime,
}

/// Partial repair update. `None` keeps the column out of the `UPDATE`;
/// `Some(None)` on a text column writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = repairs)]
pub struct RepairChangeset {
    /// Status.
    pub status: String,
    /// Work performed.
    pub work_performed: Option<Option<String>>,
    /// Parts used.
    pub parts_used: Option<Option<String>>,
    /// Labor cost.
    pub labor_cost: Option<f64>,
    /// Total cost.
    pub total_cost: Option<f64>,
    /// Exit date.
    pub exit_date: Option<NaiveDate>,
    /// Exit odometer reading.
    pub exit_odometer: Option<i64>,
}

fn parse_id<T: FromStr<Err = uuid::Error>>(raw: &str) -> WorkshopRepositoryResult<T> {
    T::from_str(raw).map_err(WorkshopRepositoryError::persistence)
}

fn parse_optional_id<T: FromStr<Err = uuid::Error>>(
    raw: Option<&str>,
) -> WorkshopRepositoryResult<Option<T>> {
    raw.map(parse_id).transpose()
}

fn odometer_from_column(value: i64) -> WorkshopRepositoryResult<Odometer> {
    u32::try_from(value)
        .map(Odometer::new)
        .map_err(WorkshopRepositoryError::persistence)
}

fn odometer_to_column(value: Odometer) -> i64 {
    i64::from(value.kilometres())
}

impl From<&Client> for ClientRow {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id().to_string(),
            first_name: client.name().first().to_owned(),
            last_name: client.name().last().to_owned(),
            phone: client.contact().phone.clone(),
            email: client.contact().email.clone(),
            national_id: client.national_id().map(str::to_owned),
        }
    }
}

impl TryFrom<ClientRow> for Client {
    type Error = WorkshopRepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let name = PersonName::new(row.first_name, row.last_name)
            .map_err(WorkshopRepositoryError::persistence)?;
        Ok(Self::from_persisted(
            parse_id::<ClientId>(&row.id)?,
            name,
            ContactDetails::new(row.phone, row.email),
            row.national_id,
        ))
    }
}

impl From<&Vehicle> for VehicleRow {
    fn from(vehicle: &Vehicle) -> Self {
        let details = vehicle.details();
        Self {
            id: vehicle.id().to_string(),
            client_id: vehicle.owner().to_string(),
            plate: details.plate().as_str().to_owned(),
            make: details.make().to_owned(),
            model: details.model().to_owned(),
            model_year: details.year().map(i32::from),
            baseline_odometer: details.baseline_odometer().map(odometer_to_column),
        }
    }
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = WorkshopRepositoryError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let mut details = VehicleDetails::new(row.plate, row.make, row.model)
            .map_err(WorkshopRepositoryError::persistence)?;
        if let Some(year) = row.model_year {
            details =
                details.with_year(u16::try_from(year).map_err(WorkshopRepositoryError::persistence)?);
        }
        if let Some(reading) = row.baseline_odometer {
            details = details.with_baseline_odometer(odometer_from_column(reading)?);
        }
        Ok(Self::from_persisted(
            parse_id::<VehicleId>(&row.id)?,
            parse_id::<ClientId>(&row.client_id)?,
            details,
        ))
    }
}

impl From<&Mechanic> for MechanicRow {
    fn from(mechanic: &Mechanic) -> Self {
        Self {
            id: mechanic.id().to_string(),
            first_name: mechanic.name().first().to_owned(),
            last_name: mechanic.name().last().to_owned(),
            phone: mechanic.contact().phone.clone(),
            email: mechanic.contact().email.clone(),
        }
    }
}

impl TryFrom<MechanicRow> for Mechanic {
    type Error = WorkshopRepositoryError;

    fn try_from(row: MechanicRow) -> Result<Self, Self::Error> {
        let name = PersonName::new(row.first_name, row.last_name)
            .map_err(WorkshopRepositoryError::persistence)?;
        Ok(Self::from_persisted(
            parse_id::<MechanicId>(&row.id)?,
            name,
            ContactDetails::new(row.phone, row.email),
        ))
    }
}

impl From<&Appointment> for AppointmentRow {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id().to_string(),
            client_id: appointment.client().to_string(),
            vehicle_id: appointment.vehicle().to_string(),
            mechanic_id: appointment.mechanic().map(|id| id.to_string()),
            scheduled_date: appointment.slot().date,
            scheduled_time: appointment.slot().time,
            problem: appointment.problem().to_owned(),
            status: appointment.status().as_str().to_owned(),
        }
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = WorkshopRepositoryError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let status = AppointmentStatus::try_from(row.status.as_str())
            .map_err(WorkshopRepositoryError::persistence)?;
        Ok(Self::from_persisted(PersistedAppointmentData {
            id: parse_id::<AppointmentId>(&row.id)?,
            client: parse_id::<ClientId>(&row.client_id)?,
            vehicle: parse_id::<VehicleId>(&row.vehicle_id)?,
            mechanic: parse_optional_id::<MechanicId>(row.mechanic_id.as_deref())?,
            slot: Slot::new(row.scheduled_date, row.scheduled_time),
            problem: row.problem,
            status,
        }))
    }
}

impl From<&Repair> for RepairRow {
    fn from(repair: &Repair) -> Self {
        Self {
            id: repair.id().to_string(),
            vehicle_id: repair.vehicle().to_string(),
            mechanic_id: repair.mechanic().map(|id| id.to_string()),
            intake_date: repair.intake_date(),
            exit_date: repair.exit_date(),
            intake_odometer: odometer_to_column(repair.intake_odometer()),
            exit_odometer: repair.exit_odometer().map(odometer_to_column),
            problem: repair.problem().to_owned(),
            work_performed: repair.work_performed().map(str::to_owned),
            parts_used: repair.parts_used().map(str::to_owned),
            labor_cost: repair.labor_cost().map(Cost::amount),
            total_cost: repair.total_cost().map(Cost::amount),
            status: repair.status().as_str().to_owned(),
            origin_appointment_id: repair.origin().map(|id| id.to_string()),
            created_at: repair.created_at().naive_utc(),
        }
    }
}

impl TryFrom<RepairRow> for Repair {
    type Error = WorkshopRepositoryError;

    fn try_from(row: RepairRow) -> Result<Self, Self::Error> {
        let status = RepairStatus::try_from(row.status.as_str())
            .map_err(WorkshopRepositoryError::persistence)?;
        Ok(Self::from_persisted(PersistedRepairData {
            id: parse_id::<RepairId>(&row.id)?,
            vehicle: parse_id::<VehicleId>(&row.vehicle_id)?,
            mechanic: parse_optional_id::<MechanicId>(row.mechanic_id.as_deref())?,
            intake_date: row.intake_date,
            exit_date: row.exit_date,
            intake_odometer: odometer_from_column(row.intake_odometer)?,
            exit_odometer: row.exit_odometer.map(odometer_from_column).transpose()?,
            problem: row.problem,
            work_performed: row.work_performed,
            parts_used: row.parts_used,
            labor_cost: row.labor_cost.map(Cost::new),
            total_cost: row.total_cost.map(Cost::new),
            status,
            origin: parse_optional_id::<AppointmentId>(row.origin_appointment_id.as_deref())?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, chrono::Utc),
        }))
    }
}

impl From<&RepairChanges> for RepairChangeset {
    fn from(changes: &RepairChanges) -> Self {
        Self {
            status: changes.status.as_str().to_owned(),
            work_performed: changes.work_performed_update(),
            parts_used: changes.parts_used_update(),
            labor_cost: changes.labor_cost.map(Cost::amount),
            total_cost: changes.total_cost.map(Cost::amount),
            exit_date: changes.exit_date,
            exit_odometer: changes.exit_odometer.map(odometer_to_column),
        }
    }
}
