//! EZElectronics CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ez-cli migrate
//!
//! # Create a user
//! ez-cli user create -u admin -n Ada -s Lovelace -r Admin -p secret
//!
//! # Insert the demo catalog
//! ez-cli seed
//! ```
//!
//! The database is taken from `EZ_DATABASE_URL` (or `DATABASE_URL`), the
//! same variable the server reads.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ez-cli")]
#[command(author, version, about = "EZElectronics CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Insert a small demo catalog (skips models that already exist)
    Seed,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Unique username
        #[arg(short, long)]
        username: String,

        /// First name
        #[arg(short, long)]
        name: String,

        /// Last name
        #[arg(short, long)]
        surname: String,

        /// Role (`Customer`, `Manager`, `Admin`)
        #[arg(short, long, default_value = "Customer")]
        role: String,

        /// Password
        #[arg(short, long)]
        password: String,
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
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                name,
                surname,
                role,
                password,
            } => {
                commands::user::create(&username, &name, &surname, &role, &password).await?;
            }
        },
        Commands::Seed => {
            commands::seed::demo_catalog().await?;
        }
    }
    Ok(())
}
