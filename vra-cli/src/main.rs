//! vra — vehicle registry CLI.
//!
//! # Usage
//!
//! ```text
//! vra register --vin <VIN> --make <MAKE> --model <MODEL> --year <YEAR>
//! vra update <ID> [--vin ..] [--make ..] [--model ..] [--year ..]
//! vra transfer <ID> --name <NAME> [--address ..] [--phone ..] [--email ..]
//! vra show <ID> [--json]
//! ```
//!
//! Global options: `--home <DIR>` (default: the user's home directory) and
//! `--collection <NAME>` (default: `vehicles`). Records live under
//! `<home>/.vra/collections/<collection>/`.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{
    register::RegisterArgs, show::ShowArgs, transfer::TransferArgs, update::UpdateArgs,
    StoreArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "vra",
    version,
    about = "Register vehicles and record ownership transfers",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new vehicle and print its assigned id.
    Register(RegisterArgs),

    /// Replace a vehicle's details, keeping its ownership history.
    Update(UpdateArgs),

    /// Record a transfer of ownership to a new owner.
    Transfer(TransferArgs),

    /// Show a vehicle and its ownership history.
    Show(ShowArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let engine = cli.store.open_engine()?;
        match cli.command {
            Commands::Register(args) => args.run(&engine).await,
            Commands::Update(args) => args.run(&engine).await,
            Commands::Transfer(args) => args.run(&engine).await,
            Commands::Show(args) => args.run(&engine).await,
        }
    })
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
