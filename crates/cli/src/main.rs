//! Pantry CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pantry-cli migrate
//!
//! # Delete one user's pantry items
//! pantry-cli clear --user alice
//!
//! # Delete every pantry item (asks for --yes)
//! pantry-cli clear --all --yes
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pantry-cli")]
#[command(author, version, about = "Pantry server CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Delete pantry items
    Clear {
        /// Only delete items owned by this user
        #[arg(short, long, conflicts_with = "all")]
        user: Option<String>,

        /// Delete items for every user
        #[arg(long, requires = "yes")]
        all: bool,

        /// Confirm a global clear
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Clear { user, all, yes: _ } => match (user, all) {
            (Some(user), _) => {
                commands::clear::for_user(&user).await?;
            }
            (None, true) => {
                commands::clear::all().await?;
            }
            (None, false) => {
                return Err("pass --user <id> or --all --yes".into());
            }
        },
    }
    Ok(())
}
