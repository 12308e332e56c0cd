//! # Shop Seeder CLI (`shop-seed`)
//!
//! Seeds a document database with one synthetic grocery store and its
//! summary embedding.
//!
//! ## Usage
//!
//! ```bash
//! shop-seed [--config ./config/seed.toml] [command]
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | *(none)* / `shop-seed run` | Ping, clear the collection, generate, embed, and insert one shop |
//! | `shop-seed ping` | Connectivity check only |
//! | `shop-seed preview` | Generate and summarize a shop without touching the database |
//! | `shop-seed init` | Create the SQLite schema and register the vector index |
//! | `shop-seed schema` | Print the format instructions sent to the model |
//!
//! Secrets come from the environment: `MONGODB_ATLAS_URI`,
//! `GOOGLE_API_KEY`, `OPENAI_API_KEY`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use shop_seeder::config::{self, Config};
use shop_seeder::error::{SeedError, SeedResult};
use shop_seeder::{logging, migrate, ping, seed};
use shop_seeder_core::schema::{self, SchemaError};

/// Seed a document database with an AI-generated grocery store and its
/// vector embedding.
#[derive(Parser)]
#[command(name = "shop-seed", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional: when the file does not exist, built-in defaults are used
    /// and only the environment secrets are required.
    #[arg(long, global = true, default_value = "./config/seed.toml")]
    config: PathBuf,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the seeding pipeline (the default).
    ///
    /// Pings the database, clears the target collection, generates one
    /// shop with the language model, embeds its summary, and inserts it.
    Run,

    /// Check database connectivity and exit.
    Ping,

    /// Generate and summarize a shop without writing anything.
    ///
    /// Prints the summary line followed by the validated record as JSON.
    Preview,

    /// Initialize the SQLite backend.
    ///
    /// Creates the tables and registers the configured vector index.
    /// Idempotent.
    Init,

    /// Print the output format instructions included in the prompt.
    Schema,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind(), "{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> SeedResult<()> {
    let command = cli.command.unwrap_or(Commands::Run);

    if let Commands::Schema = command {
        println!("{}", schema::format_instructions());
        return Ok(());
    }

    let cfg: Config = config::load_config(&cli.config).map_err(SeedError::Config)?;

    match command {
        Commands::Run => {
            let report = seed::run_seed(&cfg).await?;
            tracing::info!(
                shop = %report.shop_name,
                products = report.products,
                dims = report.dims,
                "database seeding completed"
            );
        }
        Commands::Ping => ping::run_ping(&cfg).await?,
        Commands::Preview => {
            let (shop, summary) = seed::run_preview(&cfg).await?;
            let json = serde_json::to_string_pretty(&shop)
                .map_err(|e| SeedError::Generation(SchemaError::from(e).into()))?;
            println!("{}", summary);
            println!("{}", json);
        }
        Commands::Init => migrate::run_migrations(&cfg)
            .await
            .map_err(SeedError::Store)?,
        Commands::Schema => {}
    }

    Ok(())
}
