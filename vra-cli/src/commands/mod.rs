pub mod register;
pub mod show;
pub mod transfer;
pub mod update;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use vra_core::RegistryEngine;
use vra_store::{FileStore, DEFAULT_COLLECTION};

pub type Engine = RegistryEngine<FileStore>;

/// Where records are stored.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Base directory holding `.vra/` (defaults to the home directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Collection to operate on.
    #[arg(long, global = true, default_value = DEFAULT_COLLECTION)]
    pub collection: String,
}

impl StoreArgs {
    pub fn open_engine(&self) -> Result<Engine> {
        let home = match &self.home {
            Some(home) => home.clone(),
            None => dirs::home_dir().context("could not determine home directory")?,
        };
        let store = FileStore::open_at(&home, &self.collection).with_context(|| {
            format!(
                "failed to open collection '{}' under {}",
                self.collection,
                home.display()
            )
        })?;
        Ok(RegistryEngine::new(Arc::new(store)))
    }
}
