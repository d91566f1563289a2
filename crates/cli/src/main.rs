//! Bazaar CLI - Database migrations and operations tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations (schema + session store)
//! bazaar-cli migrate
//!
//! # List sell requests
//! bazaar-cli sell list --status submitted --limit 20
//!
//! # Check whether payments would be enabled
//! bazaar-cli payments check
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect sell requests
    Sell {
        #[command(subcommand)]
        action: SellAction,
    },
    /// Payment gateway tools
    Payments {
        #[command(subcommand)]
        action: PaymentsAction,
    },
}

#[derive(Subcommand)]
enum SellAction {
    /// List sell requests, oldest first
    List {
        /// Only show this status (submitted, reviewed, approved, rejected, completed)
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of rows
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },
}

#[derive(Subcommand)]
enum PaymentsAction {
    /// Report whether payment credentials are configured
    Check,
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
        Commands::Sell { action } => match action {
            SellAction::List { status, limit } => {
                commands::sell::list(status.as_deref(), limit).await?;
            }
        },
        Commands::Payments { action } => match action {
            PaymentsAction::Check => commands::payments::check()?,
        },
    }
    Ok(())
}
