//! `vra transfer <ID> --name <NAME> [--address ..] [--phone ..] [--email ..]`

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use vra_core::{Identifier, OwnerContact, OwnershipEvent};

use super::Engine;

/// Record a transfer of ownership, stamped with the current time.
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Identifier printed by `vra register`.
    pub id: Identifier,

    /// New owner's name.
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    #[arg(long, default_value = "")]
    pub email: String,
}

impl TransferArgs {
    pub async fn run(self, engine: &Engine) -> Result<()> {
        let event = OwnershipEvent::new(
            self.name,
            self.address,
            OwnerContact::new(self.phone, self.email),
            Utc::now(),
        )
        .context("invalid owner")?;
        let owner = event.owner_name().to_owned();

        engine
            .transfer_ownership(&self.id, event)
            .await
            .with_context(|| format!("failed to transfer ownership of {}", self.id))?;

        println!(
            "{} Transferred {} to '{}'",
            "✓".green().bold(),
            self.id,
            owner
        );
        Ok(())
    }
}
