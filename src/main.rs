mod calendar;
mod client;
mod commands;
mod config;
mod models;
mod projection;
mod web;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use models::Resource;

/// Hotel admin dashboard — browse a hotel-management backend and project reservations.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print detailed API responses
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start web dashboard server
    Serve {
        /// Path to config file
        #[arg(short = 'c', long, default_value = "config.toml")]
        config: PathBuf,

        /// Listen address (e.g. "0.0.0.0:3000")
        #[arg(short = 'a', long, default_value = "0.0.0.0:3010")]
        addr: String,
    },

    /// Show reservations per month and next month's projection
    Projection {
        /// Path to config file
        #[arg(short = 'c', long, default_value = "config.toml")]
        config: PathBuf,
    },

    /// Show occupied date ranges of a room as calendar blocks
    Calendar {
        /// Room ID as known to the backend
        #[arg(value_name = "ROOM")]
        room: String,

        /// Path to config file
        #[arg(short = 'c', long, default_value = "config.toml")]
        config: PathBuf,
    },

    /// List all records of a resource
    ///
    /// Examples:
    ///   list rooms
    ///   list reservations -v
    List {
        #[arg(value_enum, value_name = "RESOURCE")]
        resource: Resource,

        /// Path to config file
        #[arg(short = 'c', long, default_value = "config.toml")]
        config: PathBuf,
    },

    /// Check credentials and show the session token's claims
    Login {
        /// Path to config file
        #[arg(short = 'c', long, default_value = "config.toml")]
        config: PathBuf,

        /// Override username from config
        #[arg(short = 'u', long)]
        user: Option<String>,

        /// Override password from config
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "hotel_dashboard=debug,tower_http=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &cli.command {
        Command::Serve { config, addr } => {
            let cfg = config::load_config(config)?;
            web::serve(cfg, config, addr).await?;
        }
        Command::Projection { config } => {
            commands::run_projection(config).await?;
        }
        Command::Calendar { room, config } => {
            commands::run_calendar(config, room).await?;
        }
        Command::List { resource, config } => {
            commands::run_list(config, *resource, cli.verbose).await?;
        }
        Command::Login {
            config,
            user,
            password,
        } => {
            let cfg = config::load_config(config)?;
            let (login, pass) = commands::resolve_credentials(user, password, &cfg.api)?;
            commands::run_login(&cfg.api.base_url, login, pass, cli.verbose).await?;
        }
    }

    Ok(())
}
