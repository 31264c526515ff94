//! routeadm CLI
//!
//! Command-line console for egress rules and routes of the routeadm backend

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use routeadm_api::models::{Egress, Route};
use routeadm_client::{ClientConfig, EgressService, FileStore, HttpClient};
use routeadm_core::{StandardService, resources};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{EgressCommand, RouteCommand};
use config::CliConfig;
use output::LoginHint;

/// routeadm console
#[derive(Parser, Debug)]
#[command(name = "routeadm", version, about)]
struct Cli {
    /// Config file (overrides ROUTEADM_CONFIG and the default locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage egress rules
    #[command(subcommand)]
    Egress(EgressCommand),

    /// Manage routes
    #[command(subcommand)]
    Routes(RouteCommand),

    /// Store a bearer token for later commands
    Login {
        #[arg(long)]
        token: String,
    },

    /// Forget the stored session
    Logout,

    /// Inspect or change the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Persist a new backend base URL
    SetBaseUrl { url: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    let (mut config, source) = match &cli.config {
        Some(path) => (CliConfig::load(path)?, Some(path.clone())),
        None => CliConfig::load_default()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::debug!(source = ?source, base_url = %config.base_url, "configuration loaded");

    let success = match cli.command {
        Commands::Config(command) => return run_config(&command, config, source),
        Commands::Egress(command) => {
            let client = connect(&config)?;
            let service: Arc<dyn StandardService<Egress>> =
                Arc::new(resources::egress(EgressService::new(client))?);
            commands::run(service, "egress rule", config.page_size, command.into()).await?
        }
        Commands::Routes(command) => {
            let client = connect(&config)?;
            let service: Arc<dyn StandardService<Route>> = Arc::new(resources::routes(client));
            commands::run(service, "route", config.page_size, command.into()).await?
        }
        Commands::Login { token } => {
            connect(&config)?.sign_in(&token)?;
            println!("signed in");
            true
        }
        Commands::Logout => {
            connect(&config)?.sign_out()?;
            println!("signed out");
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Build the HTTP client from the effective configuration
fn connect(config: &CliConfig) -> Result<HttpClient> {
    let client_config = ClientConfig::new(&config.base_url)?.with_timeout(config.timeout());
    let store = FileStore::open(config.session_path())?;
    Ok(HttpClient::with_redirect(
        client_config,
        Arc::new(store),
        Arc::new(LoginHint),
    ))
}

fn run_config(
    command: &ConfigCommand,
    mut config: CliConfig,
    source: Option<PathBuf>,
) -> Result<ExitCode> {
    match command {
        ConfigCommand::Show => {
            if let Some(path) = &source {
                println!("# {}", path.display());
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommand::SetBaseUrl { url } => {
            // Validates the URL the same way the client will
            ClientConfig::new(url)?;
            config.base_url.clone_from(url);
            let path = source.unwrap_or_else(config::default_save_path);
            config.save(&path)?;
            println!("base_url set to {url} in {}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
