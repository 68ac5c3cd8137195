//! `vra update <ID> [--vin ..] [--make ..] [--model ..] [--year ..]`
//!
//! The engine replaces whole records, so this command reads the current
//! record first and carries its registration date and ownership history
//! forward.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use vra_core::{Asset, Identifier, RegistryError, VehicleAttributes};

use super::Engine;

/// Replace a vehicle's details.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Identifier printed by `vra register`.
    pub id: Identifier,

    #[arg(long)]
    pub vin: Option<String>,

    #[arg(long)]
    pub make: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,
}

impl UpdateArgs {
    pub async fn run(self, engine: &Engine) -> Result<()> {
        let current = engine
            .store()
            .find_one(&self.id)
            .await
            .with_context(|| format!("failed to read {}", self.id))?;

        let asset = match current {
            Some(doc) => {
                let mut asset = Asset::from_document(&doc)
                    .with_context(|| format!("stored record {} is malformed", self.id))?;
                if let Some(vin) = self.vin {
                    asset.set_external_key(vin).context("invalid VIN")?;
                }
                let current = asset.attributes().clone();
                asset
                    .set_attributes(VehicleAttributes::new(
                        self.make.unwrap_or(current.make),
                        self.model.unwrap_or(current.model),
                        self.year.unwrap_or(current.year),
                    ))
                    .context("invalid vehicle details")?;
                asset
            }
            // Nothing to carry forward: a full set of fields still goes
            // through the engine so its NotFound is what the user sees.
            None => match (self.vin, self.make, self.model, self.year) {
                (Some(vin), Some(make), Some(model), Some(year)) => {
                    Asset::new(vin, VehicleAttributes::new(make, model, year), Utc::now())
                        .context("invalid vehicle")?
                }
                _ => return Err(RegistryError::NotFound { id: self.id }.into()),
            },
        };

        engine
            .update(&self.id, asset)
            .await
            .with_context(|| format!("failed to update {}", self.id))?;

        println!("{} Updated {}", "✓".green().bold(), self.id);
        Ok(())
    }
}
