//! `vra register --vin <VIN> --make <MAKE> --model <MODEL> --year <YEAR>`

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use vra_core::{Asset, VehicleAttributes};

use super::Engine;

/// Register a new vehicle.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Vehicle identification number. Not checked for uniqueness.
    #[arg(long)]
    pub vin: String,

    #[arg(long)]
    pub make: String,

    #[arg(long)]
    pub model: String,

    /// Model year.
    #[arg(long)]
    pub year: i32,
}

impl RegisterArgs {
    pub async fn run(self, engine: &Engine) -> Result<()> {
        let attributes = VehicleAttributes::new(self.make, self.model, self.year);
        let asset = Asset::new(self.vin, attributes, Utc::now()).context("invalid vehicle")?;

        let registered = engine
            .register(asset)
            .await
            .context("failed to register vehicle")?;
        let id = registered
            .id()
            .context("store returned a record without an id")?;

        println!(
            "{} Registered '{}' ({} {} {})",
            "✓".green().bold(),
            registered.external_key(),
            registered.attributes().make,
            registered.attributes().model,
            registered.attributes().year,
        );
        println!("  id: {id}");
        Ok(())
    }
}
