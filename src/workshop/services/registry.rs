//! Reference-data maintenance for clients, vehicles and mechanics.

use crate::workshop::{
    domain::{
        Client, ClientId, ContactDetails, Mechanic, MechanicId, NumericField, Odometer, PersonName,
        Vehicle, VehicleDetails, VehicleId, WorkshopDomainError,
    },
    ports::{WorkshopRepositoryError, WorkshopStore},
};
use std::sync::Arc;
use thiserror::Error;

/// Request payload describing a person (client or mechanic).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRequest {
    first_name: String,
    last_name: String,
    phone: Option<String>,
    email: Option<String>,
    national_id: Option<String>,
}

impl PersonRequest {
    /// Creates a request with the required name fields.
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            email: None,
            national_id: None,
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the national ID. Ignored for mechanics.
    #[must_use]
    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    fn into_parts(
        self,
    ) -> Result<(PersonName, ContactDetails, Option<String>), WorkshopDomainError> {
        let name = PersonName::new(self.first_name, self.last_name)?;
        Ok((
            name,
            ContactDetails::new(self.phone, self.email),
            self.national_id,
        ))
    }
}

/// Request payload describing a vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRequest {
    plate: String,
    make: String,
    model: String,
    year: Option<u16>,
    baseline_odometer: Option<String>,
}

impl VehicleRequest {
    /// Creates a request with the required vehicle fields.
    #[must_use]
    pub fn new(plate: impl Into<String>, make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            plate: plate.into(),
            make: make.into(),
            model: model.into(),
            year: None,
            baseline_odometer: None,
        }
    }

    /// Sets the model year.
    #[must_use]
    pub const fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the odometer reading at registration, as entered.
    #[must_use]
    pub fn with_baseline_odometer(mut self, kilometres: impl Into<String>) -> Self {
        self.baseline_odometer = Some(kilometres.into());
        self
    }

    fn into_details(self) -> Result<VehicleDetails, WorkshopDomainError> {
        let mut details = VehicleDetails::new(self.plate, self.make, self.model)?;
        if let Some(year) = self.year {
            details = details.with_year(year);
        }
        if let Some(raw) = self.baseline_odometer {
            details = details
                .with_baseline_odometer(Odometer::parse(NumericField::BaselineOdometer, &raw)?);
        }
        Ok(details)
    }
}

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkshopDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkshopRepositoryError),
}

/// Result type for registry service operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Maintains clients, their vehicles and the shop's mechanics.
#[derive(Clone)]
pub struct RegistryService<R>
where
    R: WorkshopStore,
{
    repository: Arc<R>,
}

impl<R> RegistryService<R>
where
    R: WorkshopStore,
{
    /// Creates a new registry service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Registers a new client.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Domain`] for blank names, or
    /// [`RegistryError::Repository`] when the national ID is taken or storage
    /// fails.
    pub async fn register_client(&self, request: PersonRequest) -> RegistryResult<Client> {
        let (name, contact, national_id) = request.into_parts()?;
        let client = Client::new(name, contact, national_id);
        self.repository.store_client(&client).await?;
        tracing::debug!(client = %client.id(), "client registered");
        Ok(client)
    }

    /// Retrieves a client.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::ClientNotFound`] when absent.
    pub async fn client(&self, id: ClientId) -> RegistryResult<Client> {
        Ok(self
            .repository
            .find_client(id)
            .await?
            .ok_or(WorkshopRepositoryError::ClientNotFound(id))?)
    }

    /// Lists clients by last name, then first name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Repository`] when storage fails.
    pub async fn list_clients(&self) -> RegistryResult<Vec<Client>> {
        Ok(self.repository.list_clients().await?)
    }

    /// Rewrites a client's details.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when validation fails, the client is
    /// missing, or the national ID is taken.
    pub async fn update_client(
        &self,
        id: ClientId,
        request: PersonRequest,
    ) -> RegistryResult<Client> {
        let (name, contact, national_id) = request.into_parts()?;
        let mut client = self.client(id).await?;
        client.revise(name, contact, national_id);
        self.repository.update_client(&client).await?;
        Ok(client)
    }

    /// Deletes a client together with its vehicles and their history.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Repository`] when the client is missing or
    /// storage fails.
    pub async fn delete_client(&self, id: ClientId) -> RegistryResult<()> {
        self.repository.delete_client(id).await?;
        tracing::info!(client = %id, "client deleted");
        Ok(())
    }

    /// Registers a vehicle for an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Domain`] for an invalid plate or blank
    /// make/model, or [`RegistryError::Repository`] when the owner is
    /// missing, the plate is taken, or storage fails.
    pub async fn register_vehicle(
        &self,
        owner: ClientId,
        request: VehicleRequest,
    ) -> RegistryResult<Vehicle> {
        let details = request.into_details()?;
        self.client(owner).await?;
        let vehicle = Vehicle::new(owner, details);
        self.repository.store_vehicle(&vehicle).await?;
        tracing::debug!(vehicle = %vehicle.id(), plate = %vehicle.plate(), "vehicle registered");
        Ok(vehicle)
    }

    /// Retrieves a vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::VehicleNotFound`] when absent.
    pub async fn vehicle(&self, id: VehicleId) -> RegistryResult<Vehicle> {
        Ok(self
            .repository
            .find_vehicle(id)
            .await?
            .ok_or(WorkshopRepositoryError::VehicleNotFound(id))?)
    }

    /// Lists a client's vehicles by plate.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Repository`] when storage fails.
    pub async fn vehicles_for_client(&self, owner: ClientId) -> RegistryResult<Vec<Vehicle>> {
        Ok(self.repository.list_vehicles_for_client(owner).await?)
    }

    /// Rewrites a vehicle's details.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when validation fails, the vehicle is
    /// missing, or the plate is taken.
    pub async fn update_vehicle(
        &self,
        id: VehicleId,
        request: VehicleRequest,
    ) -> RegistryResult<Vehicle> {
        let details = request.into_details()?;
        let mut vehicle = self.vehicle(id).await?;
        vehicle.revise(details);
        self.repository.update_vehicle(&vehicle).await?;
        Ok(vehicle)
    }

    /// Deletes a vehicle together with its appointments and repairs.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Repository`] when the vehicle is missing or
    /// storage fails.
    pub async fn delete_vehicle(&self, id: VehicleId) -> RegistryResult<()> {
        self.repository.delete_vehicle(id).await?;
        tracing::info!(vehicle = %id, "vehicle deleted");
        Ok(())
    }

    /// Registers a mechanic.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Domain`] for blank names, or
    /// [`RegistryError::Repository`] when storage fails.
    pub async fn register_mechanic(&self, request: PersonRequest) -> RegistryResult<Mechanic> {
        let (name, contact, _) = request.into_parts()?;
        let mechanic = Mechanic::new(name, contact);
        self.repository.store_mechanic(&mechanic).await?;
        Ok(mechanic)
    }

    /// Retrieves a mechanic.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::MechanicNotFound`] when absent.
    pub async fn mechanic(&self, id: MechanicId) -> RegistryResult<Mechanic> {
        Ok(self
            .repository
            .find_mechanic(id)
            .await?
            .ok_or(WorkshopRepositoryError::MechanicNotFound(id))?)
    }

    /// Lists mechanics by last name, then first name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Repository`] when storage fails.
    pub async fn list_mechanics(&self) -> RegistryResult<Vec<Mechanic>> {
        Ok(self.repository.list_mechanics().await?)
    }

    /// Rewrites a mechanic's details.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when validation fails or the mechanic is
    /// missing.
    pub async fn update_mechanic(
        &self,
        id: MechanicId,
        request: PersonRequest,
    ) -> RegistryResult<Mechanic> {
        let (name, contact, _) = request.into_parts()?;
        let mut mechanic = self.mechanic(id).await?;
        mechanic.revise(name, contact);
        self.repository.update_mechanic(&mechanic).await?;
        Ok(mechanic)
    }

    /// Deletes a mechanic and clears their assignments.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Repository`] when the mechanic is missing or
    /// storage fails.
    pub async fn delete_mechanic(&self, id: MechanicId) -> RegistryResult<()> {
        self.repository.delete_mechanic(id).await?;
        tracing::info!(mechanic = %id, "mechanic deleted");
        Ok(())
    }
}
