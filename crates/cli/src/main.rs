//! Libra Shkollore CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! libra-cli migrate
//!
//! # Load the sample textbook catalog (skips books already present)
//! libra-cli seed
//!
//! # Replace the whole catalog with the sample books
//! libra-cli seed --replace
//!
//! # Hash the admin password for ADMIN_PASSWORD_HASH (reads stdin)
//! libra-cli hash-password
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "libra-cli")]
#[command(author, version, about = "Libra Shkollore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load the sample textbook catalog
    Seed {
        /// Delete every existing product first, even ones in past orders
        #[arg(long)]
        replace: bool,
    },
    /// Print an Argon2 hash for ADMIN_PASSWORD_HASH
    HashPassword,
}

#[tokio::main]
async fn main() {
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
        Commands::Seed { replace } => {
            commands::seed::catalog(replace).await?;
        }
        Commands::HashPassword => commands::password::hash_from_stdin()?,
    }
    Ok(())
}
