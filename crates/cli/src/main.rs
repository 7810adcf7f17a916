//! Multiverse CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog database migrations
//! mv-cli migrate
//!
//! # Load the embedded demo catalog (or a YAML file of the same shape)
//! mv-cli seed
//! mv-cli seed --file catalog.yaml
//!
//! # Check an attribute payload against a shop type's schema
//! mv-cli validate --shop-type brewery '{"degre_alcool": 5.2, "amertume_ibu": 25, "stock": 50}'
//! mv-cli validate --shop-type teaShop --update @patch.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog database
//! - `validate` - Validate and normalize an attribute payload

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mv-cli")]
#[command(author, version, about = "Multiverse catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog database
    Seed {
        /// YAML catalog file (defaults to the embedded demo catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Validate an attribute payload and print its normalized form
    Validate {
        /// Shop type (`brewery`, `teaShop`, `beautyShop`, `herbShop`)
        #[arg(short, long)]
        shop_type: String,

        /// Check only the supplied fields, as for a partial update
        #[arg(short, long)]
        update: bool,

        /// JSON payload, or `@path` to read it from a file
        input: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
        Commands::Validate {
            shop_type,
            update,
            input,
        } => commands::validate::run(&shop_type, update, &input)?,
    }
    Ok(())
}
