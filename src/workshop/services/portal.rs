//! Owner-scoped read access for the client portal.

use crate::workshop::{
    domain::{Client, ClientId, Repair, Vehicle, VehicleId},
    ports::{WorkshopRepositoryError, WorkshopStore},
};
use std::sync::Arc;
use thiserror::Error;

/// A client's landing view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDashboard {
    /// The signed-in client.
    pub client: Client,
    /// Vehicles registered to the client, by plate.
    pub vehicles: Vec<Vehicle>,
}

/// Service-level errors for portal operations.
#[derive(Debug, Error)]
pub enum PortalError {
    /// The client does not exist.
    #[error("client not found: {0}")]
    ClientNotFound(ClientId),
    /// The vehicle is unknown or belongs to someone else.
    #[error("access denied to vehicle {vehicle} for client {client}")]
    AccessDenied {
        /// Requesting client.
        client: ClientId,
        /// Requested vehicle.
        vehicle: VehicleId,
    },
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkshopRepositoryError),
}

/// Result type for portal service operations.
pub type PortalResult<T> = Result<T, PortalError>;

/// Read-only view of the shop for vehicle owners.
#[derive(Clone)]
pub struct ClientPortalService<R>
where
    R: WorkshopStore,
{
    repository: Arc<R>,
}

impl<R> ClientPortalService<R>
where
    R: WorkshopStore,
{
    /// Creates a new portal service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the client and their vehicles.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::ClientNotFound`] when the client is absent.
    pub async fn dashboard(&self, client_id: ClientId) -> PortalResult<ClientDashboard> {
        let client = self
            .repository
            .find_client(client_id)
            .await?
            .ok_or(PortalError::ClientNotFound(client_id))?;
        let vehicles = self.repository.list_vehicles_for_client(client_id).await?;
        Ok(ClientDashboard { client, vehicles })
    }

    /// Returns the repair history of one of the client's vehicles.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::AccessDenied`] when the vehicle is missing or
    /// owned by another client.
    pub async fn vehicle_history(
        &self,
        client_id: ClientId,
        vehicle_id: VehicleId,
    ) -> PortalResult<Vec<Repair>> {
        self.authorize(client_id, vehicle_id).await?;
        Ok(self.repository.list_repairs_for_vehicle(vehicle_id).await?)
    }

    /// Returns the vehicle's repair currently in the shop, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::AccessDenied`] when the vehicle is missing or
    /// owned by another client.
    pub async fn active_repair(
        &self,
        client_id: ClientId,
        vehicle_id: VehicleId,
    ) -> PortalResult<Option<Repair>> {
        let history = self.vehicle_history(client_id, vehicle_id).await?;
        Ok(history
            .into_iter()
            .find(|repair| repair.status().is_active()))
    }

    async fn authorize(&self, client: ClientId, vehicle: VehicleId) -> PortalResult<Vehicle> {
        match self.repository.find_vehicle(vehicle).await? {
            Some(found) if found.owner() == client => Ok(found),
            _ => {
                tracing::warn!(%client, %vehicle, "portal access denied");
                Err(PortalError::AccessDenied { client, vehicle })
            }
        }
    }
}
