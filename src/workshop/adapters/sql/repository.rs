//! Diesel repository implementation for workshop storage.

use super::{
    models::{AppointmentRow, ClientRow, MechanicRow, RepairChangeset, RepairRow, VehicleRow},
    pool::{PooledWorkshopConnection, WorkshopPool, with_connection},
    schema::{appointments, clients, mechanics, repairs, vehicles},
};
use crate::config::StorageConfig;
use crate::workshop::{
    adapters::ordering,
    domain::{
        Appointment, AppointmentId, AppointmentStatus, Client, ClientId, Cost, LicensePlate,
        Mechanic, MechanicId, Repair, RepairChanges, RepairId, RepairStatus, Vehicle, VehicleId,
    },
    ports::{
        AppointmentRepository, ClientRepository, MechanicRepository, RepairRepository,
        VehicleRepository, WorkshopRepositoryError, WorkshopRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Schema DDL shared by `PostgreSQL` and SQLite.
pub const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_workshop_tables/up.sql");

/// Unique constraint, named for `PostgreSQL` and by column for SQLite.
struct UniqueKey {
    constraint: &'static str,
    column: &'static str,
}

const NATIONAL_ID_KEY: UniqueKey = UniqueKey {
    constraint: "clients_national_id_unique",
    column: "clients.national_id",
};

const PLATE_KEY: UniqueKey = UniqueKey {
    constraint: "vehicles_plate_unique",
    column: "vehicles.plate",
};

const ORIGIN_KEY: UniqueKey = UniqueKey {
    constraint: "repairs_origin_appointment_unique",
    column: "repairs.origin_appointment_id",
};

/// SQL-backed workshop store.
#[derive(Debug, Clone)]
pub struct SqlWorkshopStore {
    pool: WorkshopPool,
}

impl SqlWorkshopStore {
    /// Creates a store from an existing pool.
    #[must_use]
    pub const fn new(pool: WorkshopPool) -> Self {
        Self { pool }
    }

    /// Connects to the configured database.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::Persistence`] when the pool cannot
    /// be built.
    pub fn connect(config: &StorageConfig) -> WorkshopRepositoryResult<Self> {
        WorkshopPool::connect(config).map(Self::new)
    }

    /// Creates any missing workshop tables.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::Persistence`] when the DDL fails.
    pub async fn initialise_schema(&self) -> WorkshopRepositoryResult<()> {
        let backend = self.pool.backend_name();
        self.run_blocking(|connection| {
            with_connection!(connection, conn => conn.batch_execute(SCHEMA_SQL))
                .map_err(WorkshopRepositoryError::persistence)
        })
        .await?;
        tracing::info!(backend, "workshop schema initialised");
        Ok(())
    }

    async fn run_blocking<F, T>(&self, f: F) -> WorkshopRepositoryResult<T>
    where
        F: FnOnce(&mut PooledWorkshopConnection) -> WorkshopRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get()?;
            f(&mut connection)
        })
        .await
        .map_err(WorkshopRepositoryError::persistence)?
    }
}

fn violates(info: &dyn DatabaseErrorInformation, key: &UniqueKey) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == key.constraint)
        || info.message().contains(key.column)
}

fn is_unique_violation(err: &DieselError, key: &UniqueKey) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if violates(info.as_ref(), key)
    )
}

const fn is_foreign_key_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}

fn expect_one_row(
    affected: usize,
    missing: WorkshopRepositoryError,
) -> WorkshopRepositoryResult<()> {
    if affected == 0 {
        return Err(missing);
    }
    Ok(())
}

fn into_domain<R, D>(rows: Vec<R>) -> WorkshopRepositoryResult<Vec<D>>
where
    D: TryFrom<R, Error = WorkshopRepositoryError>,
{
    rows.into_iter().map(D::try_from).collect()
}

#[async_trait]
impl ClientRepository for SqlWorkshopStore {
    async fn store_client(&self, client: &Client) -> WorkshopRepositoryResult<()> {
        let row = ClientRow::from(client);
        self.run_blocking(move |connection| {
            with_connection!(connection, conn => diesel::insert_into(clients::table)
                .values(&row)
                .execute(conn))
            .map_err(|err| national_id_error(err, &row))?;
            Ok(())
        })
        .await
    }

    async fn update_client(&self, client: &Client) -> WorkshopRepositoryResult<()> {
        let client_id = client.id();
        let row = ClientRow::from(client);
        self.run_blocking(move |connection| {
            let affected = with_connection!(connection, conn => diesel::update(
                clients::table.find(row.id.as_str()),
            )
            .set(&row)
            .execute(conn))
            .map_err(|err| national_id_error(err, &row))?;
            expect_one_row(affected, WorkshopRepositoryError::ClientNotFound(client_id))
        })
        .await
    }

    async fn find_client(&self, id: ClientId) -> WorkshopRepositoryResult<Option<Client>> {
        self.run_blocking(move |connection| {
            let row = with_connection!(connection, conn => clients::table
                .find(id.to_string())
                .select(ClientRow::as_select())
                .first::<ClientRow>(conn)
                .optional())
            .map_err(WorkshopRepositoryError::persistence)?;
            row.map(Client::try_from).transpose()
        })
        .await
    }

    async fn list_clients(&self) -> WorkshopRepositoryResult<Vec<Client>> {
        let mut clients: Vec<Client> = self
            .run_blocking(|connection| {
                let rows = with_connection!(connection, conn => clients::table
                    .select(ClientRow::as_select())
                    .load::<ClientRow>(conn))
                .map_err(WorkshopRepositoryError::persistence)?;
                into_domain(rows)
            })
            .await?;
        ordering::sort_clients(&mut clients);
        Ok(clients)
    }

    async fn delete_client(&self, id: ClientId) -> WorkshopRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = with_connection!(connection, conn => diesel::delete(
                clients::table.find(id.to_string()),
            )
            .execute(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            expect_one_row(affected, WorkshopRepositoryError::ClientNotFound(id))
        })
        .await
    }
}

fn national_id_error(err: DieselError, row: &ClientRow) -> WorkshopRepositoryError {
    match row.national_id.as_ref() {
        Some(national_id) if is_unique_violation(&err, &NATIONAL_ID_KEY) => {
            WorkshopRepositoryError::DuplicateNationalId(national_id.clone())
        }
        _ => WorkshopRepositoryError::persistence(err),
    }
}

#[async_trait]
impl VehicleRepository for SqlWorkshopStore {
    async fn store_vehicle(&self, vehicle: &Vehicle) -> WorkshopRepositoryResult<()> {
        let owner = vehicle.owner();
        let plate = vehicle.plate().clone();
        let row = VehicleRow::from(vehicle);
        self.run_blocking(move |connection| {
            with_connection!(connection, conn => diesel::insert_into(vehicles::table)
                .values(&row)
                .execute(conn))
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    WorkshopRepositoryError::ClientNotFound(owner)
                } else {
                    plate_error(err, plate)
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> WorkshopRepositoryResult<()> {
        let vehicle_id = vehicle.id();
        let plate = vehicle.plate().clone();
        let row = VehicleRow::from(vehicle);
        self.run_blocking(move |connection| {
            let affected = with_connection!(connection, conn => diesel::update(
                vehicles::table.find(row.id.as_str()),
            )
            .set(&row)
            .execute(conn))
            .map_err(|err| plate_error(err, plate))?;
            expect_one_row(affected, WorkshopRepositoryError::VehicleNotFound(vehicle_id))
        })
        .await
    }

    async fn find_vehicle(&self, id: VehicleId) -> WorkshopRepositoryResult<Option<Vehicle>> {
        self.run_blocking(move |connection| {
            let row = with_connection!(connection, conn => vehicles::table
                .find(id.to_string())
                .select(VehicleRow::as_select())
                .first::<VehicleRow>(conn)
                .optional())
            .map_err(WorkshopRepositoryError::persistence)?;
            row.map(Vehicle::try_from).transpose()
        })
        .await
    }

    async fn list_vehicles_for_client(
        &self,
        owner: ClientId,
    ) -> WorkshopRepositoryResult<Vec<Vehicle>> {
        self.run_blocking(move |connection| {
            let rows = with_connection!(connection, conn => vehicles::table
                .filter(vehicles::client_id.eq(owner.to_string()))
                .order(vehicles::plate.asc())
                .select(VehicleRow::as_select())
                .load::<VehicleRow>(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            into_domain(rows)
        })
        .await
    }

    async fn delete_vehicle(&self, id: VehicleId) -> WorkshopRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = with_connection!(connection, conn => diesel::delete(
                vehicles::table.find(id.to_string()),
            )
            .execute(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            expect_one_row(affected, WorkshopRepositoryError::VehicleNotFound(id))
        })
        .await
    }
}

fn plate_error(err: DieselError, plate: LicensePlate) -> WorkshopRepositoryError {
    if is_unique_violation(&err, &PLATE_KEY) {
        WorkshopRepositoryError::DuplicateLicensePlate(plate)
    } else {
        WorkshopRepositoryError::persistence(err)
    }
}

#[async_trait]
impl MechanicRepository for SqlWorkshopStore {
    async fn store_mechanic(&self, mechanic: &Mechanic) -> WorkshopRepositoryResult<()> {
        let row = MechanicRow::from(mechanic);
        self.run_blocking(move |connection| {
            with_connection!(connection, conn => diesel::insert_into(mechanics::table)
                .values(&row)
                .execute(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update_mechanic(&self, mechanic: &Mechanic) -> WorkshopRepositoryResult<()> {
        let mechanic_id = mechanic.id();
        let row = MechanicRow::from(mechanic);
        self.run_blocking(move |connection| {
            let affected = with_connection!(connection, conn => diesel::update(
                mechanics::table.find(row.id.as_str()),
            )
            .set(&row)
            .execute(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            expect_one_row(affected, WorkshopRepositoryError::MechanicNotFound(mechanic_id))
        })
        .await
    }

    async fn find_mechanic(&self, id: MechanicId) -> WorkshopRepositoryResult<Option<Mechanic>> {
        self.run_blocking(move |connection| {
            let row = with_connection!(connection, conn => mechanics::table
                .find(id.to_string())
                .select(MechanicRow::as_select())
                .first::<MechanicRow>(conn)
                .optional())
            .map_err(WorkshopRepositoryError::persistence)?;
            row.map(Mechanic::try_from).transpose()
        })
        .await
    }

    async fn list_mechanics(&self) -> WorkshopRepositoryResult<Vec<Mechanic>> {
        let mut mechanics: Vec<Mechanic> = self
            .run_blocking(|connection| {
                let rows = with_connection!(connection, conn => mechanics::table
                    .select(MechanicRow::as_select())
                    .load::<MechanicRow>(conn))
                .map_err(WorkshopRepositoryError::persistence)?;
                into_domain(rows)
            })
            .await?;
        ordering::sort_mechanics(&mut mechanics);
        Ok(mechanics)
    }

    async fn delete_mechanic(&self, id: MechanicId) -> WorkshopRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = with_connection!(connection, conn => diesel::delete(
                mechanics::table.find(id.to_string()),
            )
            .execute(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            expect_one_row(affected, WorkshopRepositoryError::MechanicNotFound(id))
        })
        .await
    }
}

#[async_trait]
impl AppointmentRepository for SqlWorkshopStore {
    async fn store_appointment(&self, appointment: &Appointment) -> WorkshopRepositoryResult<()> {
        let vehicle = appointment.vehicle();
        let row = AppointmentRow::from(appointment);
        self.run_blocking(move |connection| {
            with_connection!(connection, conn => diesel::insert_into(appointments::table)
                .values(&row)
                .execute(conn))
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    WorkshopRepositoryError::VehicleNotFound(vehicle)
                } else {
                    WorkshopRepositoryError::persistence(err)
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn update_appointment(
        &self,
        appointment: &Appointment,
    ) -> WorkshopRepositoryResult<()> {
        let appointment_id = appointment.id();
        let row = AppointmentRow::from(appointment);
        self.run_blocking(move |connection| {
            let affected = with_connection!(connection, conn => diesel::update(
                appointments::table.find(row.id.as_str()),
            )
            .set(&row)
            .execute(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            expect_one_row(
                affected,
                WorkshopRepositoryError::AppointmentNotFound(appointment_id),
            )
        })
        .await
    }

    async fn find_appointment(
        &self,
        id: AppointmentId,
    ) -> WorkshopRepositoryResult<Option<Appointment>> {
        self.run_blocking(move |connection| {
            let row = with_connection!(connection, conn => appointments::table
                .find(id.to_string())
                .select(AppointmentRow::as_select())
                .first::<AppointmentRow>(conn)
                .optional())
            .map_err(WorkshopRepositoryError::persistence)?;
            row.map(Appointment::try_from).transpose()
        })
        .await
    }

    async fn list_active_appointments(&self) -> WorkshopRepositoryResult<Vec<Appointment>> {
        self.run_blocking(|connection| {
            let rows = with_connection!(connection, conn => appointments::table
                .filter(appointments::status.ne(AppointmentStatus::Completed.as_str()))
                .order((
                    appointments::scheduled_date.desc(),
                    appointments::scheduled_time.desc(),
                ))
                .select(AppointmentRow::as_select())
                .load::<AppointmentRow>(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            into_domain(rows)
        })
        .await
    }

    async fn delete_appointment(&self, id: AppointmentId) -> WorkshopRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = with_connection!(connection, conn => diesel::delete(
                appointments::table.find(id.to_string()),
            )
            .execute(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            expect_one_row(affected, WorkshopRepositoryError::AppointmentNotFound(id))
        })
        .await
    }
}

#[async_trait]
impl RepairRepository for SqlWorkshopStore {
    async fn store_repair(&self, repair: &Repair) -> WorkshopRepositoryResult<()> {
        let vehicle = repair.vehicle();
        let origin = repair.origin();
        let row = RepairRow::from(repair);
        self.run_blocking(move |connection| {
            with_connection!(connection, conn => diesel::insert_into(repairs::table)
                .values(&row)
                .execute(conn))
            .map_err(|err| match origin {
                Some(appointment) if is_unique_violation(&err, &ORIGIN_KEY) => {
                    WorkshopRepositoryError::DuplicateAppointmentOrigin(appointment)
                }
                _ if is_foreign_key_violation(&err) => {
                    WorkshopRepositoryError::VehicleNotFound(vehicle)
                }
                _ => WorkshopRepositoryError::persistence(err),
            })?;
            Ok(())
        })
        .await
    }

    async fn store_promoted(&self, repair: &Repair) -> WorkshopRepositoryResult<()> {
        let origin = repair.origin().ok_or_else(|| {
            WorkshopRepositoryError::persistence(std::io::Error::other(
                "promoted repair carries no origin",
            ))
        })?;
        let row = RepairRow::from(repair);
        self.run_blocking(move |connection| {
            // Completing the appointment first locks its row, so a concurrent
            // promotion waits here and then fails on the origin constraint.
            with_connection!(connection, conn => conn.transaction::<_, DieselError, _>(|tx| {
                let completed = diesel::update(appointments::table.find(origin.to_string()))
                    .set(appointments::status.eq(AppointmentStatus::Completed.as_str()))
                    .execute(tx)?;
                if completed == 0 {
                    return Err(DieselError::NotFound);
                }
                diesel::insert_into(repairs::table).values(&row).execute(tx)?;
                Ok(())
            }))
            .map_err(|err| match err {
                DieselError::NotFound => WorkshopRepositoryError::AppointmentNotFound(origin),
                _ if is_unique_violation(&err, &ORIGIN_KEY) => {
                    WorkshopRepositoryError::DuplicateAppointmentOrigin(origin)
                }
                _ => WorkshopRepositoryError::persistence(err),
            })
        })
        .await
    }

    async fn update_repair(
        &self,
        id: RepairId,
        changes: &RepairChanges,
    ) -> WorkshopRepositoryResult<Repair> {
        let changeset = RepairChangeset::from(changes);
        self.run_blocking(move |connection| {
            let key = id.to_string();
            let row = with_connection!(connection, conn => conn.transaction::<_, DieselError, _>(|tx| {
                let affected = diesel::update(repairs::table.find(key.as_str()))
                    .set(&changeset)
                    .execute(tx)?;
                if affected == 0 {
                    return Err(DieselError::NotFound);
                }
                repairs::table
                    .find(key.as_str())
                    .select(RepairRow::as_select())
                    .first::<RepairRow>(tx)
            }))
            .map_err(|err| repair_write_error(err, id))?;
            Repair::try_from(row)
        })
        .await
    }

    async fn finalize_repair(
        &self,
        id: RepairId,
        exit_date: NaiveDate,
    ) -> WorkshopRepositoryResult<Repair> {
        self.run_blocking(move |connection| {
            let key = id.to_string();
            // The first UPDATE takes the row lock, so the cost defaults below
            // see every write committed before this one.
            let row = with_connection!(connection, conn => conn.transaction::<_, DieselError, _>(|tx| {
                let affected = diesel::update(repairs::table.find(key.as_str()))
                    .set((
                        repairs::status.eq(RepairStatus::Completed.as_str()),
                        repairs::exit_date.eq(exit_date),
                    ))
                    .execute(tx)?;
                if affected == 0 {
                    return Err(DieselError::NotFound);
                }
                diesel::update(
                    repairs::table
                        .find(key.as_str())
                        .filter(repairs::labor_cost.is_null()),
                )
                .set(repairs::labor_cost.eq(Cost::ZERO.amount()))
                .execute(tx)?;
                diesel::update(
                    repairs::table
                        .find(key.as_str())
                        .filter(repairs::total_cost.is_null()),
                )
                .set(repairs::total_cost.eq(Cost::ZERO.amount()))
                .execute(tx)?;
                repairs::table
                    .find(key.as_str())
                    .select(RepairRow::as_select())
                    .first::<RepairRow>(tx)
            }))
            .map_err(|err| repair_write_error(err, id))?;
            Repair::try_from(row)
        })
        .await
    }

    async fn find_repair(&self, id: RepairId) -> WorkshopRepositoryResult<Option<Repair>> {
        self.run_blocking(move |connection| {
            let row = with_connection!(connection, conn => repairs::table
                .find(id.to_string())
                .select(RepairRow::as_select())
                .first::<RepairRow>(conn)
                .optional())
            .map_err(WorkshopRepositoryError::persistence)?;
            row.map(Repair::try_from).transpose()
        })
        .await
    }

    async fn find_repair_by_origin(
        &self,
        origin: AppointmentId,
    ) -> WorkshopRepositoryResult<Option<Repair>> {
        self.run_blocking(move |connection| {
            let row = with_connection!(connection, conn => repairs::table
                .filter(repairs::origin_appointment_id.eq(origin.to_string()))
                .select(RepairRow::as_select())
                .first::<RepairRow>(conn)
                .optional())
            .map_err(WorkshopRepositoryError::persistence)?;
            row.map(Repair::try_from).transpose()
        })
        .await
    }

    async fn list_repairs_for_vehicle(
        &self,
        vehicle: VehicleId,
    ) -> WorkshopRepositoryResult<Vec<Repair>> {
        self.run_blocking(move |connection| {
            let rows = with_connection!(connection, conn => repairs::table
                .filter(repairs::vehicle_id.eq(vehicle.to_string()))
                .order((repairs::intake_date.desc(), repairs::created_at.desc()))
                .select(RepairRow::as_select())
                .load::<RepairRow>(conn))
            .map_err(WorkshopRepositoryError::persistence)?;
            into_domain(rows)
        })
        .await
    }

    async fn list_active_repairs(&self) -> WorkshopRepositoryResult<Vec<Repair>> {
        let active: Vec<&'static str> = RepairStatus::ACTIVE
            .iter()
            .map(|status| status.as_str())
            .collect();
        let mut repairs: Vec<Repair> = self
            .run_blocking(move |connection| {
                let rows = with_connection!(connection, conn => repairs::table
                    .filter(repairs::status.eq_any(active))
                    .select(RepairRow::as_select())
                    .load::<RepairRow>(conn))
                .map_err(WorkshopRepositoryError::persistence)?;
                into_domain(rows)
            })
            .await?;
        ordering::sort_shop_floor(&mut repairs);
        Ok(repairs)
    }
}

fn repair_write_error(err: DieselError, id: RepairId) -> WorkshopRepositoryError {
    match err {
        DieselError::NotFound => WorkshopRepositoryError::RepairNotFound(id),
        _ => WorkshopRepositoryError::persistence(err),
    }
}
