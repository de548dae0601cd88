//! Service layer for workshop orchestration.

mod lifecycle;
mod portal;
mod registry;
mod scheduling;

pub use lifecycle::{
    DirectIntakeRequest, JobFailureKind, JobLifecycleError, JobLifecycleResult,
    JobLifecycleService, Promotion, RepairUpdateRequest,
};
pub use portal::{ClientDashboard, ClientPortalService, PortalError, PortalResult};
pub use registry::{
    PersonRequest, RegistryError, RegistryResult, RegistryService, VehicleRequest,
};
pub use scheduling::{
    RescheduleOutcome, RescheduleRequest, ScheduleAppointmentRequest, SchedulingError,
    SchedulingResult, SchedulingService, WorkshopHandoff,
};
