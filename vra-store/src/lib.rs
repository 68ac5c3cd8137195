//! # vra-store
//!
//! File-backed document store for the vehicle registry.
//!
//! Open a [`FileStore`] with [`FileStore::open_at`] (explicit home, used by
//! tests) or [`FileStore::open`] (the user's home directory) and hand it to a
//! [`vra_core::RegistryEngine`].

pub mod error;
pub mod file_store;
pub mod paths;

pub use error::FileStoreError;
pub use file_store::FileStore;
pub use paths::DEFAULT_COLLECTION;
