//! Mebel CLI - catalogue and basket tools.
//!
//! # Usage
//!
//! ```bash
//! # Validate the bundled catalogue document
//! mebel-cli catalogue check
//!
//! # Validate a deployed document
//! mebel-cli catalogue check --source https://example.com/db.json
//!
//! # List what a category key resolves to
//! mebel-cli catalogue list kitchen
//! mebel-cli catalogue list спальни
//!
//! # Inspect or empty a visitor's persisted basket
//! mebel-cli basket show .mebel/visitors/<visitor-id>
//! mebel-cli basket clear .mebel/visitors/<visitor-id>
//! ```
//!
//! # Commands
//!
//! - `catalogue check` - Validate a catalogue document
//! - `catalogue list` - List a category or the descriptor listing
//! - `basket show` / `basket clear` - Inspect or empty a persisted basket

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mebel-cli")]
#[command(author, version, about = "Mebel storefront CLI tools")]
struct Cli {
    /// Catalogue document URL or path (defaults to `CATALOGUE_SOURCE`, then
    /// the bundled db.json)
    #[arg(long, global = true)]
    source: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the catalogue document
    Catalogue {
        #[command(subcommand)]
        action: CatalogueAction,
    },
    /// Inspect persisted baskets
    Basket {
        #[command(subcommand)]
        action: BasketAction,
    },
}

#[derive(Subcommand)]
enum CatalogueAction {
    /// Validate the document and report flagged keys
    Check,
    /// List a category's products, or the descriptors for `all`
    List {
        /// Category key (English slug or Russian label)
        #[arg(default_value = "all")]
        category: String,
    },
}

#[derive(Subcommand)]
enum BasketAction {
    /// Show a visitor's basket with totals
    Show {
        /// Visitor storage directory
        dir: PathBuf,
    },
    /// Empty a visitor's basket
    Clear {
        /// Visitor storage directory
        dir: PathBuf,
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
    let client = commands::catalogue_client(cli.source.as_deref())?;

    match cli.command {
        Commands::Catalogue { action } => match action {
            CatalogueAction::Check => commands::catalogue::check(&client).await?,
            CatalogueAction::List { category } => {
                commands::catalogue::list(client, &category).await?;
            }
        },
        Commands::Basket { action } => match action {
            BasketAction::Show { dir } => commands::basket::show(client, &dir).await?,
            BasketAction::Clear { dir } => commands::basket::clear(client, &dir)?,
        },
    }
    Ok(())
}
