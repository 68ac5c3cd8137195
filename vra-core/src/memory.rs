//! In-process document store.
//!
//! Every primitive runs under one mutex, so appends to the same record are
//! serialized in lock-acquisition order.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{self, Document};
use crate::error::StorageError;
use crate::storage::{append_to_field, MatchedCount, Storage};
use crate::types::Identifier;

/// A [`Storage`] backed by a `HashMap`. Records are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Identifier, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a copy of the stored document matching `id`.
    pub fn find_one(&self, id: &Identifier) -> Result<Option<Document>, StorageError> {
        Ok(self.lock()?.get(id).cloned())
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Identifier, Document>>, StorageError> {
        self.records.lock().map_err(|_| StorageError::Unreachable {
            reason: "memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn insert(&self, mut record: Document) -> Result<Identifier, StorageError> {
        let id = Identifier::generate();
        record.insert(document::ID.to_owned(), Value::String(id.to_string()));
        self.lock()?.insert(id.clone(), record);
        Ok(id)
    }

    async fn replace_one(
        &self,
        id: &Identifier,
        mut record: Document,
    ) -> Result<MatchedCount, StorageError> {
        let mut records = self.lock()?;
        match records.get_mut(id) {
            Some(slot) => {
                record.insert(document::ID.to_owned(), Value::String(id.to_string()));
                *slot = record;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn atomic_append(
        &self,
        id: &Identifier,
        field: &str,
        element: Value,
    ) -> Result<MatchedCount, StorageError> {
        let mut records = self.lock()?;
        match records.get_mut(id) {
            Some(doc) => {
                append_to_field(doc, field, element)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(vin: &str) -> Document {
        let Value::Object(doc) = json!({ "vin": vin }) else {
            unreachable!()
        };
        doc
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids_and_writes_id_field() {
        let store = MemoryStore::new();
        let a = store.insert(doc("VIN-A")).await.expect("insert a");
        let b = store.insert(doc("VIN-A")).await.expect("insert b");
        assert_ne!(a, b);
        assert_eq!(store.len().unwrap(), 2);

        let stored = store.find_one(&a).unwrap().expect("stored");
        assert_eq!(stored["_id"], json!(a.as_str()));
    }

    #[tokio::test]
    async fn replace_one_keeps_matched_id() {
        let store = MemoryStore::new();
        let id = store.insert(doc("VIN-A")).await.unwrap();
        let mut replacement = doc("VIN-B");
        replacement.insert("_id".into(), json!("someone-else"));

        assert_eq!(store.replace_one(&id, replacement).await.unwrap(), 1);
        let stored = store.find_one(&id).unwrap().unwrap();
        assert_eq!(stored["vin"], json!("VIN-B"));
        assert_eq!(stored["_id"], json!(id.as_str()));
    }

    #[tokio::test]
    async fn missing_record_matches_zero() {
        let store = MemoryStore::new();
        let ghost = Identifier::generate();
        assert_eq!(store.replace_one(&ghost, doc("VIN-A")).await.unwrap(), 0);
        assert_eq!(
            store.atomic_append(&ghost, "owners", json!({})).await.unwrap(),
            0
        );
        assert!(store.is_empty().unwrap(), "zero-match writes must not create records");
    }
}
