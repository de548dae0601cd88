//! In-memory workshop store for tests and local tooling.

use crate::workshop::{
    adapters::ordering,
    domain::{
        Appointment, AppointmentId, Client, ClientId, Mechanic, MechanicId, Repair,
        RepairChanges, RepairId, Vehicle, VehicleId,
    },
    ports::{
        AppointmentRepository, ClientRepository, MechanicRepository, RepairRepository,
        VehicleRepository, WorkshopRepositoryError, WorkshopRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory implementation of every workshop port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkshopStore {
    state: Arc<RwLock<InMemoryWorkshopState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkshopState {
    clients: HashMap<ClientId, Client>,
    vehicles: HashMap<VehicleId, Vehicle>,
    mechanics: HashMap<MechanicId, Mechanic>,
    appointments: HashMap<AppointmentId, Appointment>,
    repairs: HashMap<RepairId, Repair>,
    origin_index: HashMap<AppointmentId, RepairId>,
}

impl InMemoryWorkshopStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> WorkshopRepositoryResult<RwLockReadGuard<'_, InMemoryWorkshopState>> {
        self.state.read().map_err(|err| {
            WorkshopRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> WorkshopRepositoryResult<RwLockWriteGuard<'_, InMemoryWorkshopState>> {
        self.state.write().map_err(|err| {
            WorkshopRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryWorkshopState {
    fn ensure_national_id_free(&self, client: &Client) -> WorkshopRepositoryResult<()> {
        let Some(national_id) = client.national_id() else {
            return Ok(());
        };
        let taken = self
            .clients
            .values()
            .any(|other| other.id() != client.id() && other.national_id() == Some(national_id));
        if taken {
            return Err(WorkshopRepositoryError::DuplicateNationalId(
                national_id.to_owned(),
            ));
        }
        Ok(())
    }

    fn ensure_plate_free(&self, vehicle: &Vehicle) -> WorkshopRepositoryResult<()> {
        let taken = self
            .vehicles
            .values()
            .any(|other| other.id() != vehicle.id() && other.plate() == vehicle.plate());
        if taken {
            return Err(WorkshopRepositoryError::DuplicateLicensePlate(
                vehicle.plate().clone(),
            ));
        }
        Ok(())
    }

    fn insert_repair(&mut self, repair: &Repair) -> WorkshopRepositoryResult<()> {
        if let Some(origin) = repair.origin() {
            if self.origin_index.contains_key(&origin) {
                return Err(WorkshopRepositoryError::DuplicateAppointmentOrigin(origin));
            }
            self.origin_index.insert(origin, repair.id());
        }
        self.repairs.insert(repair.id(), repair.clone());
        Ok(())
    }

    fn remove_repair(&mut self, id: RepairId) {
        if let Some(removed) = self.repairs.remove(&id) {
            if let Some(origin) = removed.origin() {
                self.origin_index.remove(&origin);
            }
        }
    }

    fn remove_vehicle(&mut self, id: VehicleId) {
        self.vehicles.remove(&id);
        self.appointments
            .retain(|_, appointment| appointment.vehicle() != id);
        let repair_ids: Vec<RepairId> = self
            .repairs
            .values()
            .filter(|repair| repair.vehicle() == id)
            .map(Repair::id)
            .collect();
        for repair_id in repair_ids {
            self.remove_repair(repair_id);
        }
        self.detach_missing_origins();
    }

    /// Clears origin references that point at appointments no longer stored.
    fn detach_missing_origins(&mut self) {
        let orphaned: Vec<AppointmentId> = self
            .origin_index
            .keys()
            .filter(|origin| !self.appointments.contains_key(origin))
            .copied()
            .collect();
        for origin in orphaned {
            let Some(repair_id) = self.origin_index.remove(&origin) else {
                continue;
            };
            if let Some(repair) = self.repairs.get_mut(&repair_id) {
                repair.detach_origin();
            }
        }
    }
}

#[async_trait]
impl ClientRepository for InMemoryWorkshopStore {
    async fn store_client(&self, client: &Client) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_national_id_free(client)?;
        state.clients.insert(client.id(), client.clone());
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.clients.contains_key(&client.id()) {
            return Err(WorkshopRepositoryError::ClientNotFound(client.id()));
        }
        state.ensure_national_id_free(client)?;
        state.clients.insert(client.id(), client.clone());
        Ok(())
    }

    async fn find_client(&self, id: ClientId) -> WorkshopRepositoryResult<Option<Client>> {
        Ok(self.read()?.clients.get(&id).cloned())
    }

    async fn list_clients(&self) -> WorkshopRepositoryResult<Vec<Client>> {
        let mut clients: Vec<Client> = self.read()?.clients.values().cloned().collect();
        ordering::sort_clients(&mut clients);
        Ok(clients)
    }

    async fn delete_client(&self, id: ClientId) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if state.clients.remove(&id).is_none() {
            return Err(WorkshopRepositoryError::ClientNotFound(id));
        }
        let owned: Vec<VehicleId> = state
            .vehicles
            .values()
            .filter(|vehicle| vehicle.owner() == id)
            .map(Vehicle::id)
            .collect();
        for vehicle_id in owned {
            state.remove_vehicle(vehicle_id);
        }
        state
            .appointments
            .retain(|_, appointment| appointment.client() != id);
        state.detach_missing_origins();
        Ok(())
    }
}

#[async_trait]
impl VehicleRepository for InMemoryWorkshopStore {
    async fn store_vehicle(&self, vehicle: &Vehicle) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.clients.contains_key(&vehicle.owner()) {
            return Err(WorkshopRepositoryError::ClientNotFound(vehicle.owner()));
        }
        state.ensure_plate_free(vehicle)?;
        state.vehicles.insert(vehicle.id(), vehicle.clone());
        Ok(())
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.vehicles.contains_key(&vehicle.id()) {
            return Err(WorkshopRepositoryError::VehicleNotFound(vehicle.id()));
        }
        state.ensure_plate_free(vehicle)?;
        state.vehicles.insert(vehicle.id(), vehicle.clone());
        Ok(())
    }

    async fn find_vehicle(&self, id: VehicleId) -> WorkshopRepositoryResult<Option<Vehicle>> {
        Ok(self.read()?.vehicles.get(&id).cloned())
    }

    async fn list_vehicles_for_client(
        &self,
        owner: ClientId,
    ) -> WorkshopRepositoryResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = self
            .read()?
            .vehicles
            .values()
            .filter(|vehicle| vehicle.owner() == owner)
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| a.plate().cmp(b.plate()));
        Ok(vehicles)
    }

    async fn delete_vehicle(&self, id: VehicleId) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.vehicles.contains_key(&id) {
            return Err(WorkshopRepositoryError::VehicleNotFound(id));
        }
        state.remove_vehicle(id);
        Ok(())
    }
}

#[async_trait]
impl MechanicRepository for InMemoryWorkshopStore {
    async fn store_mechanic(&self, mechanic: &Mechanic) -> WorkshopRepositoryResult<()> {
        self.write()?
            .mechanics
            .insert(mechanic.id(), mechanic.clone());
        Ok(())
    }

    async fn update_mechanic(&self, mechanic: &Mechanic) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.mechanics.contains_key(&mechanic.id()) {
            return Err(WorkshopRepositoryError::MechanicNotFound(mechanic.id()));
        }
        state.mechanics.insert(mechanic.id(), mechanic.clone());
        Ok(())
    }

    async fn find_mechanic(&self, id: MechanicId) -> WorkshopRepositoryResult<Option<Mechanic>> {
        Ok(self.read()?.mechanics.get(&id).cloned())
    }

    async fn list_mechanics(&self) -> WorkshopRepositoryResult<Vec<Mechanic>> {
        let mut mechanics: Vec<Mechanic> = self.read()?.mechanics.values().cloned().collect();
        ordering::sort_mechanics(&mut mechanics);
        Ok(mechanics)
    }

    async fn delete_mechanic(&self, id: MechanicId) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if state.mechanics.remove(&id).is_none() {
            return Err(WorkshopRepositoryError::MechanicNotFound(id));
        }
        for appointment in state.appointments.values_mut() {
            if appointment.mechanic() == Some(id) {
                appointment.unassign_mechanic();
            }
        }
        for repair in state.repairs.values_mut() {
            if repair.mechanic() == Some(id) {
                repair.unassign_mechanic();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryWorkshopStore {
    async fn store_appointment(&self, appointment: &Appointment) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.vehicles.contains_key(&appointment.vehicle()) {
            return Err(WorkshopRepositoryError::VehicleNotFound(
                appointment.vehicle(),
            ));
        }
        state
            .appointments
            .insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn update_appointment(
        &self,
        appointment: &Appointment,
    ) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.appointments.contains_key(&appointment.id()) {
            return Err(WorkshopRepositoryError::AppointmentNotFound(
                appointment.id(),
            ));
        }
        state
            .appointments
            .insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn find_appointment(
        &self,
        id: AppointmentId,
    ) -> WorkshopRepositoryResult<Option<Appointment>> {
        Ok(self.read()?.appointments.get(&id).cloned())
    }

    async fn list_active_appointments(&self) -> WorkshopRepositoryResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .read()?
            .appointments
            .values()
            .filter(|appointment| appointment.status().is_listed_as_active())
            .cloned()
            .collect();
        ordering::sort_appointments(&mut appointments);
        Ok(appointments)
    }

    async fn delete_appointment(&self, id: AppointmentId) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if state.appointments.remove(&id).is_none() {
            return Err(WorkshopRepositoryError::AppointmentNotFound(id));
        }
        state.detach_missing_origins();
        Ok(())
    }
}

#[async_trait]
impl RepairRepository for InMemoryWorkshopStore {
    async fn store_repair(&self, repair: &Repair) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.vehicles.contains_key(&repair.vehicle()) {
            return Err(WorkshopRepositoryError::VehicleNotFound(repair.vehicle()));
        }
        state.insert_repair(repair)
    }

    async fn store_promoted(&self, repair: &Repair) -> WorkshopRepositoryResult<()> {
        let mut state = self.write()?;
        let origin = repair.origin().ok_or_else(|| {
            WorkshopRepositoryError::persistence(std::io::Error::other(
                "promoted repair carries no origin",
            ))
        })?;
        let mut appointment = state
            .appointments
            .get(&origin)
            .cloned()
            .ok_or(WorkshopRepositoryError::AppointmentNotFound(origin))?;

        // Insert first: a duplicate origin must leave the appointment as is.
        state.insert_repair(repair)?;
        appointment.mark_converted();
        state.appointments.insert(origin, appointment);
        Ok(())
    }

    async fn update_repair(
        &self,
        id: RepairId,
        changes: &RepairChanges,
    ) -> WorkshopRepositoryResult<Repair> {
        let mut state = self.write()?;
        let stored = state
            .repairs
            .get_mut(&id)
            .ok_or(WorkshopRepositoryError::RepairNotFound(id))?;
        stored.apply(changes);
        Ok(stored.clone())
    }

    async fn finalize_repair(
        &self,
        id: RepairId,
        exit_date: NaiveDate,
    ) -> WorkshopRepositoryResult<Repair> {
        let mut state = self.write()?;
        let stored = state
            .repairs
            .get_mut(&id)
            .ok_or(WorkshopRepositoryError::RepairNotFound(id))?;
        stored.finalize(exit_date);
        Ok(stored.clone())
    }

    async fn find_repair(&self, id: RepairId) -> WorkshopRepositoryResult<Option<Repair>> {
        Ok(self.read()?.repairs.get(&id).cloned())
    }

    async fn find_repair_by_origin(
        &self,
        origin: AppointmentId,
    ) -> WorkshopRepositoryResult<Option<Repair>> {
        let state = self.read()?;
        let repair = state
            .origin_index
            .get(&origin)
            .and_then(|repair_id| state.repairs.get(repair_id))
            .cloned();
        Ok(repair)
    }

    async fn list_repairs_for_vehicle(
        &self,
        vehicle: VehicleId,
    ) -> WorkshopRepositoryResult<Vec<Repair>> {
        let mut repairs: Vec<Repair> = self
            .read()?
            .repairs
            .values()
            .filter(|repair| repair.vehicle() == vehicle)
            .cloned()
            .collect();
        ordering::sort_history(&mut repairs);
        Ok(repairs)
    }

    async fn list_active_repairs(&self) -> WorkshopRepositoryResult<Vec<Repair>> {
        let mut repairs: Vec<Repair> = self
            .read()?
            .repairs
            .values()
            .filter(|repair| repair.status().is_active())
            .cloned()
            .collect();
        ordering::sort_shop_floor(&mut repairs);
        Ok(repairs)
    }
}
