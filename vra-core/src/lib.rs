//! Vehicle registry core: record model, storage contract, mutation engine.
//!
//! - [`types`]: [`Asset`], [`OwnershipEvent`], [`Identifier`]
//! - [`document`]: storage field mapping
//! - [`storage`]: the [`Storage`] trait a document store implements
//! - [`engine`]: [`RegistryEngine`] (register / update / transfer ownership)
//! - [`memory`]: [`MemoryStore`], an in-process [`Storage`]
//! - [`error`]: [`RegistryError`], [`StorageError`]

pub mod document;
pub mod engine;
pub mod error;
pub mod memory;
pub mod storage;
pub mod types;

pub use document::Document;
pub use engine::RegistryEngine;
pub use error::{RegistryError, StorageError};
pub use memory::MemoryStore;
pub use storage::{MatchedCount, Storage};
pub use types::{Asset, Identifier, OwnerContact, OwnershipEvent, VehicleAttributes};
