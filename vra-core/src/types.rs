//! Domain types for the vehicle registry.
//!
//! Constructors validate their arguments and never touch storage. An
//! [`Asset`] only gains an [`Identifier`] once a store has persisted it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};

use crate::error::RegistryError;

/// Earliest model year accepted for a vehicle (first production automobile).
pub const MIN_MODEL_YEAR: i32 = 1886;

/// Longest accepted identifier encoding.
pub const MAX_IDENTIFIER_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// Opaque record identifier assigned by the storage layer.
///
/// The string encoding is 1 to [`MAX_IDENTIFIER_LEN`] characters drawn from
/// ASCII letters, digits, `-` and `_`. Nothing else about its shape is
/// guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Validate and wrap an encoded identifier.
    pub fn parse(s: impl Into<String>) -> Result<Self, RegistryError> {
        let s = s.into();
        if s.is_empty() || s.len() > MAX_IDENTIFIER_LEN {
            return Err(RegistryError::invalid(format!(
                "identifier must be 1..={MAX_IDENTIFIER_LEN} characters, got {}",
                s.len()
            )));
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(RegistryError::invalid(format!(
                "identifier contains invalid character {bad:?}"
            )));
        }
        Ok(Self(s))
    }

    /// Fresh time-ordered identifier for stores that assign their own ids.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Identifier {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Descriptive vehicle fields. Replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleAttributes {
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl VehicleAttributes {
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
        }
    }

    /// Shape checks. `year` must fall in `[MIN_MODEL_YEAR, registered_at.year() + 1]`.
    fn validate(&self, registered_at: DateTime<Utc>) -> Result<(), RegistryError> {
        if self.make.trim().is_empty() {
            return Err(RegistryError::invalid("make must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(RegistryError::invalid("model must not be empty"));
        }
        let max_year = registered_at.year() + 1;
        if !(MIN_MODEL_YEAR..=max_year).contains(&self.year) {
            return Err(RegistryError::invalid(format!(
                "year {} outside {MIN_MODEL_YEAR}..={max_year}",
                self.year
            )));
        }
        Ok(())
    }
}

/// How to reach an owner. Free-form; no format checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerContact {
    pub phone: String,
    pub email: String,
}

impl OwnerContact {
    pub fn new(phone: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            email: email.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OwnershipEvent
// ---------------------------------------------------------------------------

/// One immutable transfer of ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipEvent {
    owner_name: String,
    owner_address: String,
    owner_contact: OwnerContact,
    transferred_at: DateTime<Utc>,
}

impl OwnershipEvent {
    /// Build a transfer record. Fails with `InvalidInput` if `owner_name` is blank.
    pub fn new(
        owner_name: impl Into<String>,
        owner_address: impl Into<String>,
        owner_contact: OwnerContact,
        transferred_at: DateTime<Utc>,
    ) -> Result<Self, RegistryError> {
        let owner_name = owner_name.into();
        if owner_name.trim().is_empty() {
            return Err(RegistryError::invalid("owner name must not be empty"));
        }
        Ok(Self {
            owner_name,
            owner_address: owner_address.into(),
            owner_contact,
            transferred_at,
        })
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn owner_address(&self) -> &str {
        &self.owner_address
    }

    pub fn owner_contact(&self) -> &OwnerContact {
        &self.owner_contact
    }

    pub fn transferred_at(&self) -> DateTime<Utc> {
        self.transferred_at
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A registrable vehicle and its ownership history.
///
/// `id` is `Some` only after a store has persisted the asset. `registered_at`
/// has no setter and `ownership_history` is read-only here; history grows
/// through the engine's atomic append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    id: Option<Identifier>,
    external_key: String,
    attributes: VehicleAttributes,
    registered_at: DateTime<Utc>,
    ownership_history: Vec<OwnershipEvent>,
}

impl Asset {
    /// Build an unpersisted asset with an empty history.
    ///
    /// Uniqueness of `external_key` is not checked here or anywhere in this
    /// crate.
    pub fn new(
        external_key: impl Into<String>,
        attributes: VehicleAttributes,
        registered_at: DateTime<Utc>,
    ) -> Result<Self, RegistryError> {
        let external_key = external_key.into();
        validate_external_key(&external_key)?;
        attributes.validate(registered_at)?;
        Ok(Self {
            id: None,
            external_key,
            attributes,
            registered_at,
            ownership_history: Vec::new(),
        })
    }

    pub fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    pub fn external_key(&self) -> &str {
        &self.external_key
    }

    pub fn attributes(&self) -> &VehicleAttributes {
        &self.attributes
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Oldest transfer first.
    pub fn ownership_history(&self) -> &[OwnershipEvent] {
        &self.ownership_history
    }

    /// The most recent owner, if any transfer has been recorded.
    pub fn current_owner(&self) -> Option<&OwnershipEvent> {
        self.ownership_history.last()
    }

    pub fn set_external_key(&mut self, external_key: impl Into<String>) -> Result<(), RegistryError> {
        let external_key = external_key.into();
        validate_external_key(&external_key)?;
        self.external_key = external_key;
        Ok(())
    }

    pub fn set_attributes(&mut self, attributes: VehicleAttributes) -> Result<(), RegistryError> {
        attributes.validate(self.registered_at)?;
        self.attributes = attributes;
        Ok(())
    }

    pub(crate) fn with_id(mut self, id: Identifier) -> Self {
        self.id = Some(id);
        self
    }

    /// Reassemble a stored asset. Used by the document decoder only.
    pub(crate) fn from_parts(
        id: Option<Identifier>,
        external_key: String,
        attributes: VehicleAttributes,
        registered_at: DateTime<Utc>,
        ownership_history: Vec<OwnershipEvent>,
    ) -> Result<Self, RegistryError> {
        let mut asset = Self::new(external_key, attributes, registered_at)?;
        asset.id = id;
        asset.ownership_history = ownership_history;
        Ok(asset)
    }
}

fn validate_external_key(external_key: &str) -> Result<(), RegistryError> {
    if external_key.trim().is_empty() {
        return Err(RegistryError::invalid("external key (VIN) must not be empty"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
