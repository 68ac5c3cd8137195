//! Storage field mapping for registry records.
//!
//! Every read and write goes through the constants below; entity field names
//! never leak into storage.
//!
//! ```text
//! {
//!   "_id": "<identifier>",
//!   "vin": "...", "make": "...", "model": "...", "year": 2015,
//!   "registration_date": "<rfc3339>",
//!   "owners": [
//!     { "name": "...", "address": "...", "phone_number": "...",
//!       "email": "...", "transfer_date": "<rfc3339>" }
//!   ]
//! }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::types::{Asset, Identifier, OwnerContact, OwnershipEvent, VehicleAttributes};

/// A stored record: field name to JSON value.
pub type Document = Map<String, Value>;

pub const ID: &str = "_id";
pub const EXTERNAL_KEY: &str = "vin";
pub const MAKE: &str = "make";
pub const MODEL: &str = "model";
pub const YEAR: &str = "year";
pub const REGISTERED_AT: &str = "registration_date";
pub const OWNERSHIP_HISTORY: &str = "owners";

pub const OWNER_NAME: &str = "name";
pub const OWNER_ADDRESS: &str = "address";
pub const OWNER_PHONE: &str = "phone_number";
pub const OWNER_EMAIL: &str = "email";
pub const TRANSFERRED_AT: &str = "transfer_date";

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

impl Asset {
    /// Encode for storage. `_id` is written only when the asset has one.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        if let Some(id) = self.id() {
            doc.insert(ID.into(), Value::String(id.to_string()));
        }
        doc.insert(EXTERNAL_KEY.into(), Value::String(self.external_key().to_owned()));
        let attrs = self.attributes();
        doc.insert(MAKE.into(), Value::String(attrs.make.clone()));
        doc.insert(MODEL.into(), Value::String(attrs.model.clone()));
        doc.insert(YEAR.into(), Value::from(attrs.year));
        doc.insert(REGISTERED_AT.into(), timestamp(self.registered_at()));
        doc.insert(
            OWNERSHIP_HISTORY.into(),
            Value::Array(
                self.ownership_history()
                    .iter()
                    .map(|e| Value::Object(e.to_document()))
                    .collect(),
            ),
        );
        doc
    }

    /// Decode a stored record. A missing `owners` field reads as empty history.
    pub fn from_document(doc: &Document) -> Result<Self, StorageError> {
        let id = match doc.get(ID) {
            None | Some(Value::Null) => None,
            Some(_) => {
                let raw = str_field(doc, ID)?;
                Some(Identifier::parse(raw).map_err(|e| StorageError::malformed(e.to_string()))?)
            }
        };
        let year = doc
            .get(YEAR)
            .and_then(Value::as_i64)
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| StorageError::malformed(format!("field `{YEAR}` must be an integer")))?;
        let attributes = VehicleAttributes::new(str_field(doc, MAKE)?, str_field(doc, MODEL)?, year);

        let history = match doc.get(OWNERSHIP_HISTORY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(owner) => OwnershipEvent::from_document(owner),
                    _ => Err(StorageError::malformed(format!(
                        "`{OWNERSHIP_HISTORY}` entries must be documents"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(StorageError::malformed(format!(
                    "field `{OWNERSHIP_HISTORY}` must be an array"
                )))
            }
        };

        Asset::from_parts(
            id,
            str_field(doc, EXTERNAL_KEY)?.to_owned(),
            attributes,
            time_field(doc, REGISTERED_AT)?,
            history,
        )
        .map_err(|e| StorageError::malformed(e.to_string()))
    }
}

impl OwnershipEvent {
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(OWNER_NAME.into(), Value::String(self.owner_name().to_owned()));
        doc.insert(OWNER_ADDRESS.into(), Value::String(self.owner_address().to_owned()));
        doc.insert(OWNER_PHONE.into(), Value::String(self.owner_contact().phone.clone()));
        doc.insert(OWNER_EMAIL.into(), Value::String(self.owner_contact().email.clone()));
        doc.insert(TRANSFERRED_AT.into(), timestamp(self.transferred_at()));
        doc
    }

    /// Contact and address fields default to empty strings when absent.
    pub fn from_document(doc: &Document) -> Result<Self, StorageError> {
        OwnershipEvent::new(
            str_field(doc, OWNER_NAME)?,
            opt_str_field(doc, OWNER_ADDRESS)?,
            OwnerContact::new(opt_str_field(doc, OWNER_PHONE)?, opt_str_field(doc, OWNER_EMAIL)?),
            time_field(doc, TRANSFERRED_AT)?,
        )
        .map_err(|e| StorageError::malformed(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn str_field<'a>(doc: &'a Document, field: &str) -> Result<&'a str, StorageError> {
    doc.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| StorageError::malformed(format!("field `{field}` must be a string")))
}

fn opt_str_field<'a>(doc: &'a Document, field: &str) -> Result<&'a str, StorageError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(""),
        Some(_) => str_field(doc, field),
    }
}

fn time_field(doc: &Document, field: &str) -> Result<DateTime<Utc>, StorageError> {
    let raw = str_field(doc, field)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::malformed(format!("field `{field}`: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, h, 0, 0).unwrap()
    }

    fn john() -> OwnershipEvent {
        OwnershipEvent::new(
            "John Doe",
            "123 Main St",
            OwnerContact::new("000-111-2222", "john.doe@email.com"),
            at(10),
        )
        .unwrap()
    }

    #[test]
    fn asset_uses_storage_field_names() {
        let asset = Asset::new("VIN-A", VehicleAttributes::new("Mahindra", "Bolero", 2015), at(9))
            .unwrap();
        let doc = Value::Object(asset.to_document());
        assert_eq!(
            doc,
            json!({
                "vin": "VIN-A",
                "make": "Mahindra",
                "model": "Bolero",
                "year": 2015,
                "registration_date": "2023-06-01T09:00:00Z",
                "owners": []
            })
        );
    }

    #[test]
    fn owner_uses_storage_field_names() {
        let doc = Value::Object(john().to_document());
        assert_eq!(
            doc,
            json!({
                "name": "John Doe",
                "address": "123 Main St",
                "phone_number": "000-111-2222",
                "email": "john.doe@email.com",
                "transfer_date": "2023-06-01T10:00:00Z"
            })
        );
    }

    #[test]
    fn stored_document_decodes_with_id_and_history() {
        let doc = json!({
            "_id": "64b7f0c2a1e3d4f5a6b7c8d9",
            "vin": "1A2B3C4D5E6F7G8H9I",
            "make": "Suzuki",
            "model": "Bolero",
            "year": 2015,
            "registration_date": "2023-06-01T09:00:00Z",
            "owners": [
                { "name": "John Doe", "address": "123 Main St",
                  "phone_number": "000-111-2222", "email": "john.doe@email.com",
                  "transfer_date": "2023-06-01T10:00:00Z" },
                { "name": "Jack Man", "transfer_date": "2023-06-01T11:00:00Z" }
            ]
        });
        let Value::Object(doc) = doc else { unreachable!() };

        let asset = Asset::from_document(&doc).expect("decode");
        assert_eq!(asset.id().map(Identifier::as_str), Some("64b7f0c2a1e3d4f5a6b7c8d9"));
        assert_eq!(asset.attributes().make, "Suzuki");
        assert_eq!(asset.ownership_history().len(), 2);
        assert_eq!(asset.ownership_history()[0], john());
        assert_eq!(asset.current_owner().unwrap().owner_name(), "Jack Man");
        assert_eq!(asset.current_owner().unwrap().owner_address(), "");
    }

    #[test]
    fn missing_owners_field_reads_as_empty_history() {
        let Value::Object(doc) = json!({
            "vin": "VIN-A", "make": "Mahindra", "model": "Bolero", "year": 2015,
            "registration_date": "2023-06-01T09:00:00Z"
        }) else {
            unreachable!()
        };
        let asset = Asset::from_document(&doc).expect("decode");
        assert!(asset.ownership_history().is_empty());
        assert!(asset.id().is_none());
    }

    #[test]
    fn wrong_field_types_are_malformed() {
        let Value::Object(doc) = json!({
            "vin": "VIN-A", "make": "Mahindra", "model": "Bolero", "year": "2015",
            "registration_date": "2023-06-01T09:00:00Z"
        }) else {
            unreachable!()
        };
        let err = Asset::from_document(&doc).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }), "got: {err}");
        assert!(err.to_string().contains("year"));

        let Value::Object(doc) = json!({
            "vin": "VIN-A", "make": "Mahindra", "model": "Bolero", "year": 2015,
            "registration_date": "yesterday", "owners": {}
        }) else {
            unreachable!()
        };
        assert!(matches!(
            Asset::from_document(&doc),
            Err(StorageError::Malformed { .. })
        ));
    }

    #[test]
    fn subsecond_timestamps_survive_mapping() {
        let precise = at(12) + chrono::Duration::nanoseconds(123_456_789);
        let event = OwnershipEvent::new("Jack Man", "", OwnerContact::default(), precise).unwrap();
        let decoded = OwnershipEvent::from_document(&event.to_document()).expect("decode");
        assert_eq!(decoded.transferred_at(), precise);
    }
}
