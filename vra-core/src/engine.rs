//! Registry engine: register, update and transfer ownership.
//!
//! # Storage calls
//!
//! ```text
//! register            -> Storage::insert         (one new record)
//! update              -> Storage::replace_one    (whole-record overwrite)
//! transfer_ownership  -> Storage::atomic_append  (push onto `owners`)
//! ```
//!
//! Each operation validates first, then issues exactly one primitive. There
//! are no retries and no engine-side read-modify-write; errors surface
//! unchanged as [`RegistryError`].

use std::sync::Arc;

use serde_json::Value;

use crate::document;
use crate::error::RegistryError;
use crate::storage::{MatchedCount, Storage};
use crate::types::{Asset, Identifier, OwnershipEvent};

/// Stateless mediator between callers and a shared storage handle.
///
/// Cloning is cheap and every clone talks to the same store.
pub struct RegistryEngine<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for RegistryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Storage + ?Sized> RegistryEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Register
    // -----------------------------------------------------------------------

    /// Persist a new asset and return it with its storage-assigned id.
    ///
    /// Duplicate external keys are accepted; uniqueness belongs to the store.
    #[tracing::instrument(name = "registry.register", skip_all, fields(vin = %asset.external_key()))]
    pub async fn register(&self, asset: Asset) -> Result<Asset, RegistryError> {
        if let Some(id) = asset.id() {
            return Err(RegistryError::invalid(format!(
                "asset is already registered as {id}"
            )));
        }

        let id = self.store.insert(asset.to_document()).await.map_err(|e| {
            tracing::error!(error = %e, "insert failed");
            RegistryError::from(e)
        })?;

        tracing::info!(id = %id, "asset registered");
        Ok(asset.with_id(id))
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Overwrite the record matching `id` with `asset`, history included.
    ///
    /// No merge happens: a stale or empty `ownership_history` replaces what
    /// is stored. Carry history and `registered_at` forward from a prior read
    /// when they must survive.
    #[tracing::instrument(name = "registry.update", skip_all, fields(id = %id))]
    pub async fn update(&self, id: &Identifier, asset: Asset) -> Result<(), RegistryError> {
        if let Some(own) = asset.id() {
            if own != id {
                return Err(RegistryError::invalid(format!(
                    "asset identifier {own} does not match target {id}"
                )));
            }
        }

        let matched = self
            .store
            .replace_one(id, asset.to_document())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "replace failed");
                RegistryError::from(e)
            })?;

        expect_match(id, matched)?;
        tracing::info!(history = asset.ownership_history().len(), "asset replaced");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transfer ownership
    // -----------------------------------------------------------------------

    /// Append `new_owner` to the record's history in one atomic store call.
    ///
    /// `transferred_at` is taken as given; ordering across events is the
    /// caller's concern.
    #[tracing::instrument(name = "registry.transfer_ownership", skip_all, fields(id = %id))]
    pub async fn transfer_ownership(
        &self,
        id: &Identifier,
        new_owner: OwnershipEvent,
    ) -> Result<(), RegistryError> {
        let transferred_at = new_owner.transferred_at();
        let element = Value::Object(new_owner.to_document());
        let matched = self
            .store
            .atomic_append(id, document::OWNERSHIP_HISTORY, element)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "append failed");
                RegistryError::from(e)
            })?;

        expect_match(id, matched)?;
        tracing::info!(%transferred_at, "ownership transferred");
        Ok(())
    }
}

fn expect_match(id: &Identifier, matched: MatchedCount) -> Result<(), RegistryError> {
    if matched == 0 {
        tracing::warn!("no record matched");
        return Err(RegistryError::NotFound { id: id.clone() });
    }
    Ok(())
}
