//! Shared world state for repair job lifecycle scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use shopfloor::workshop::{
    adapters::memory::InMemoryWorkshopStore,
    domain::{Appointment, Repair, Vehicle},
    services::{
        JobLifecycleError, JobLifecycleService, Promotion, RegistryService, SchedulingService,
        WorkshopHandoff,
    },
};

/// Scenario world for job lifecycle behaviour tests.
pub struct JobLifecycleWorld {
    pub registry: RegistryService<InMemoryWorkshopStore>,
    pub scheduling: SchedulingService<InMemoryWorkshopStore, DefaultClock>,
    pub lifecycle: JobLifecycleService<InMemoryWorkshopStore, DefaultClock>,
    pub vehicle: Option<Vehicle>,
    pub appointment: Option<Appointment>,
    pub repair: Option<Repair>,
    pub last_promotion: Option<Promotion>,
    pub last_handoff: Option<WorkshopHandoff>,
    pub last_update: Option<Result<Repair, JobLifecycleError>>,
}

impl JobLifecycleWorld {
    /// Creates a world over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryWorkshopStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            registry: RegistryService::new(Arc::clone(&store)),
            scheduling: SchedulingService::new(Arc::clone(&store), Arc::clone(&clock)),
            lifecycle: JobLifecycleService::new(store, clock),
            vehicle: None,
            appointment: None,
            repair: None,
            last_promotion: None,
            last_handoff: None,
            last_update: None,
        }
    }

    /// Returns the scenario's vehicle.
    pub fn vehicle(&self) -> Result<&Vehicle, eyre::Report> {
        self.vehicle
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing vehicle in scenario world"))
    }

    /// Returns the scenario's appointment.
    pub fn appointment(&self) -> Result<&Appointment, eyre::Report> {
        self.appointment
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing appointment in scenario world"))
    }

    /// Returns the scenario's repair.
    pub fn repair(&self) -> Result<&Repair, eyre::Report> {
        self.repair
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing repair in scenario world"))
    }
}

impl Default for JobLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> JobLifecycleWorld {
    JobLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
