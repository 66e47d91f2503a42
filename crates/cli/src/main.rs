//! AFROVIBZ CLI - catalog and credential tools.
//!
//! # Usage
//!
//! ```bash
//! # Print the active catalog
//! afv-cli catalog list --category fashion --sort price_asc
//!
//! # Export the demo catalog for AFROVIBZ_CATALOG_PATH
//! afv-cli catalog export --output catalog.json
//!
//! # Hash a password for the account table
//! afv-cli hash-password 'correct horse battery staple'
//!
//! # Render the invoice template for a sample order
//! afv-cli invoice preview
//! ```
//!
//! # Commands
//!
//! - `catalog list` - Print products as a table
//! - `catalog export` - Dump the catalog as JSON or YAML
//! - `hash-password` - Print an Argon2id PHC hash
//! - `invoice preview` - Render a sample invoice

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use afrovibz_core::Category;
use afrovibz_storefront::services::catalog::SortOrder;

mod commands;

use commands::catalog::ExportFormat;

#[derive(Parser)]
#[command(name = "afv-cli")]
#[command(author, version, about = "AFROVIBZ CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and export the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Print an Argon2id hash for a password
    HashPassword {
        /// Password to hash
        password: String,
    },
    /// Invoice tools
    Invoice {
        #[command(subcommand)]
        action: InvoiceAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Print products as a table
    List {
        /// Catalog file (default: `AFROVIBZ_CATALOG_PATH` or the demo catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Only this category (fashion, tech)
        #[arg(short, long)]
        category: Option<Category>,

        /// Free-text search
        #[arg(short, long)]
        q: Option<String>,

        /// Sort order (featured, newest, `price_asc`, `price_desc`, rating, name)
        #[arg(short, long, default_value = "featured")]
        sort: SortOrder,

        /// Include draft and archived products
        #[arg(long)]
        all: bool,
    },
    /// Write the catalog as JSON or YAML
    Export {
        /// Catalog file (default: `AFROVIBZ_CATALOG_PATH` or the demo catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
}

#[derive(Subcommand)]
enum InvoiceAction {
    /// Render the invoice template for a sample order
    Preview {
        /// Store URL printed in the header
        #[arg(long, default_value = "http://localhost:3000")]
        store_url: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                catalog,
                category,
                q,
                sort,
                all,
            } => {
                let products = commands::catalog::load(catalog)?;
                commands::catalog::list(&products, category, q, sort, all)?;
            }
            CatalogAction::Export {
                catalog,
                output,
                format,
            } => {
                let products = commands::catalog::load(catalog)?;
                commands::catalog::export(&products, output.as_deref(), format).await?;
            }
        },
        Commands::HashPassword { password } => commands::password::hash(&password)?,
        Commands::Invoice { action } => match action {
            InvoiceAction::Preview { store_url } => {
                commands::invoice::preview(&store_url).await?;
            }
        },
    }
    Ok(())
}
