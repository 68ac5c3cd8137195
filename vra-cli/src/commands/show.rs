//! `vra show <ID> [--json]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use vra_core::{Asset, Identifier, RegistryError};

use super::Engine;

/// Show a vehicle and its ownership history.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Identifier printed by `vra register`.
    pub id: Identifier,

    /// Print the stored document as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct OwnerRow {
    #[tabled(rename = "#")]
    seq: usize,
    #[tabled(rename = "owner")]
    name: String,
    #[tabled(rename = "address")]
    address: String,
    #[tabled(rename = "phone")]
    phone: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "transferred")]
    transferred_at: String,
}

impl ShowArgs {
    pub async fn run(self, engine: &Engine) -> Result<()> {
        let doc = engine
            .store()
            .find_one(&self.id)
            .await
            .with_context(|| format!("failed to read {}", self.id))?
            .ok_or_else(|| RegistryError::NotFound {
                id: self.id.clone(),
            })?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&doc)?);
            return Ok(());
        }

        let asset = Asset::from_document(&doc)
            .with_context(|| format!("stored record {} is malformed", self.id))?;
        print_asset(&self.id, &asset);
        Ok(())
    }
}

fn print_asset(id: &Identifier, asset: &Asset) {
    let attrs = asset.attributes();
    println!("{}", asset.external_key().bold());
    println!("  id:         {id}");
    println!("  vehicle:    {} {} ({})", attrs.make, attrs.model, attrs.year);
    println!("  registered: {}", asset.registered_at().to_rfc3339());

    let history = asset.ownership_history();
    if history.is_empty() {
        println!("  {}", "no ownership transfers recorded".bright_black());
        return;
    }

    let rows: Vec<OwnerRow> = history
        .iter()
        .enumerate()
        .map(|(i, e)| OwnerRow {
            seq: i + 1,
            name: e.owner_name().to_owned(),
            address: e.owner_address().to_owned(),
            phone: e.owner_contact().phone.clone(),
            email: e.owner_contact().email.clone(),
            transferred_at: e.transferred_at().to_rfc3339(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
