mod commands;
pub mod error;
pub mod utils;


use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::{self, Config};
use error::CliResult;

#[derive(Parser)]
#[command(name = "leadgress")]
#[command(author, version, about = "Lead capture service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Host address to bind to
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// SQLite database file (default: LEADGRESS_DB env)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Browser origin allowed to call the API (repeatable)
        #[arg(long = "allowed-origin")]
        allowed_origins: Vec<String>,
    },
    /// Create the leads table if needed and report the schema in use
    Migrate {
        /// SQLite database file (default: LEADGRESS_DB env)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Lead inspection commands
    Leads {
        #[command(subcommand)]
        command: LeadCommands,
    },
}

#[derive(Subcommand)]
enum LeadCommands {
    /// List the most recent leads
    List {
        /// SQLite database file (default: LEADGRESS_DB env)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Maximum number of leads (1-200, default 50)
        #[arg(long)]
        limit: Option<String>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

/// Apply command-line overrides on top of the environment configuration.
fn serve_config(
    config: Config,
    host: Option<IpAddr>,
    port: Option<u16>,
    db: Option<PathBuf>,
    allowed_origins: Vec<String>,
) -> Config {
    let mut config = config;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(db) = db {
        config = config.with_db_path(db);
    }
    if !allowed_origins.is_empty() {
        config = config.with_allowed_origins(allowed_origins);
    }
    config
}

async fn execute(cli: Cli, config: Config) -> CliResult<Option<String>> {
    match cli.command {
        Commands::Serve {
            host,
            port,
            db,
            allowed_origins,
        } => {
            let config = serve_config(config, host, port, db, allowed_origins);
            commands::serve::serve(config).await?;
            Ok(None)
        }
        Commands::Migrate { db } => {
            let path = utils::require_db_path(db, config.db_path)?;
            commands::migrate::migrate(&path).await.map(Some)
        }
        Commands::Leads { command } => match command {
            LeadCommands::List { db, limit, format } => {
                let path = utils::require_db_path(db, config.db_path)?;
                commands::leads::list_leads(&path, limit.as_deref(), &format)
                    .await
                    .map(Some)
            }
        },
    }
}

pub async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    api::init_tracing();

    if let Some(output) = execute(cli, Config::new()).await? {
        println!("{}", output);
    }
    Ok(())
}
