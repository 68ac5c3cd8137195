//! Storage collaborator contract.
//!
//! The engine needs exactly three primitives from a document store. Each
//! targeted primitive reports how many records it matched (`0` or `1`) so the
//! caller can tell a missing record from a successful write.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;
use crate::error::StorageError;
use crate::types::Identifier;

/// Number of records a targeted primitive matched.
pub type MatchedCount = u64;

/// A document store holding one collection of registry records.
///
/// A handle is opened once, shared by every concurrent operation, and closed
/// when the last clone is dropped.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a new record and assign it a fresh identifier, written to `_id`.
    async fn insert(&self, record: Document) -> Result<Identifier, StorageError>;

    /// Replace the whole record matching `id`. The stored `_id` stays `id`.
    async fn replace_one(
        &self,
        id: &Identifier,
        record: Document,
    ) -> Result<MatchedCount, StorageError>;

    /// Append `element` to the array `field` of the record matching `id`.
    ///
    /// Must be race-free: concurrent appends to one record each land exactly
    /// once, in the order the store serializes them. An absent field becomes
    /// a one-element array; a non-array field is `Malformed`.
    async fn atomic_append(
        &self,
        id: &Identifier,
        field: &str,
        element: Value,
    ) -> Result<MatchedCount, StorageError>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn insert(&self, record: Document) -> Result<Identifier, StorageError> {
        (**self).insert(record).await
    }

    async fn replace_one(
        &self,
        id: &Identifier,
        record: Document,
    ) -> Result<MatchedCount, StorageError> {
        (**self).replace_one(id, record).await
    }

    async fn atomic_append(
        &self,
        id: &Identifier,
        field: &str,
        element: Value,
    ) -> Result<MatchedCount, StorageError> {
        (**self).atomic_append(id, field, element).await
    }
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Box<S> {
    async fn insert(&self, record: Document) -> Result<Identifier, StorageError> {
        (**self).insert(record).await
    }

    async fn replace_one(
        &self,
        id: &Identifier,
        record: Document,
    ) -> Result<MatchedCount, StorageError> {
        (**self).replace_one(id, record).await
    }

    async fn atomic_append(
        &self,
        id: &Identifier,
        field: &str,
        element: Value,
    ) -> Result<MatchedCount, StorageError> {
        (**self).atomic_append(id, field, element).await
    }
}

/// Push `element` onto `doc[field]`, creating the array if absent.
///
/// Shared by stores that implement the append as a locked in-place edit.
pub fn append_to_field(
    doc: &mut Document,
    field: &str,
    element: Value,
) -> Result<(), StorageError> {
    let slot = doc.entry(field.to_owned()).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => {
            items.push(element);
            Ok(())
        }
        _ => Err(StorageError::malformed(format!(
            "cannot append to non-array field `{field}`"
        ))),
    }
}
