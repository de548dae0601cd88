//! Client and mechanic reference records.

use super::{ClientId, MechanicId, WorkshopDomainError};
use serde::{Deserialize, Serialize};

/// Returns the trimmed value, or an error naming the empty field.
pub(crate) fn required_text(
    value: impl Into<String>,
    field: &'static str,
) -> Result<String, WorkshopDomainError> {
    let raw = value.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WorkshopDomainError::EmptyField(field));
    }
    Ok(trimmed.to_owned())
}

/// Drops blank optional text so empty form fields persist as `NULL`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// First and last name shared by clients and mechanics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    first: String,
    last: String,
}

impl PersonName {
    /// Creates a validated name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopDomainError::EmptyField`] when either part is blank.
    pub fn new(
        first: impl Into<String>,
        last: impl Into<String>,
    ) -> Result<Self, WorkshopDomainError> {
        Ok(Self {
            first: required_text(first, "first name")?,
            last: required_text(last, "last name")?,
        })
    }

    /// Returns the first name.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Returns the last name.
    #[must_use]
    pub fn last(&self) -> &str {
        &self.last
    }
}

/// Optional contact channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Phone number, if known.
    pub phone: Option<String>,
    /// Email address, if known.
    pub email: Option<String>,
}

impl ContactDetails {
    /// Creates contact details, discarding blank values.
    #[must_use]
    pub fn new(phone: Option<String>, email: Option<String>) -> Self {
        Self {
            phone: optional_text(phone),
            email: optional_text(email),
        }
    }
}

/// A vehicle owner known to the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    name: PersonName,
    contact: ContactDetails,
    national_id: Option<String>,
}

impl Client {
    /// Creates a new client record.
    #[must_use]
    pub fn new(name: PersonName, contact: ContactDetails, national_id: Option<String>) -> Self {
        Self::from_persisted(ClientId::new(), name, contact, national_id)
    }

    /// Reconstructs a client from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: ClientId,
        name: PersonName,
        contact: ContactDetails,
        national_id: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            contact,
            national_id: optional_text(national_id),
        }
    }

    /// Returns the client identifier.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the client name.
    #[must_use]
    pub const fn name(&self) -> &PersonName {
        &self.name
    }

    /// Returns the contact details.
    #[must_use]
    pub const fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Returns the national identity document number, if recorded.
    #[must_use]
    pub fn national_id(&self) -> Option<&str> {
        self.national_id.as_deref()
    }

    /// Replaces the mutable client fields.
    pub fn revise(
        &mut self,
        name: PersonName,
        contact: ContactDetails,
        national_id: Option<String>,
    ) {
        self.name = name;
        self.contact = contact;
        self.national_id = optional_text(national_id);
    }
}

/// A mechanic who can be assigned to appointments and repairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mechanic {
    id: MechanicId,
    name: PersonName,
    contact: ContactDetails,
}

impl Mechanic {
    /// Creates a new mechanic record.
    #[must_use]
    pub fn new(name: PersonName, contact: ContactDetails) -> Self {
        Self::from_persisted(MechanicId::new(), name, contact)
    }

    /// Reconstructs a mechanic from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: MechanicId, name: PersonName, contact: ContactDetails) -> Self {
        Self { id, name, contact }
    }

    /// Returns the mechanic identifier.
    #[must_use]
    pub const fn id(&self) -> MechanicId {
        self.id
    }

    /// Returns the mechanic name.
    #[must_use]
    pub const fn name(&self) -> &PersonName {
        &self.name
    }

    /// Returns the contact details.
    #[must_use]
    pub const fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Replaces the mutable mechanic fields.
    pub fn revise(&mut self, name: PersonName, contact: ContactDetails) {
        self.name = name;
        self.contact = contact;
    }
}
