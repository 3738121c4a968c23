use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use model_admin::ModelAdminConfig;
use runtime::{AppConfig, CliArgs};
use std::path::PathBuf;
use std::sync::Arc;

mod auth;
mod demo;
mod request_id;
mod server;
mod trace;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Name of the `modules:` entry holding [`ModelAdminConfig`].
const MODULE_NAME: &str = "model_admin";

/// ModelAdmin Server - listing and permission engine for model admins
#[derive(Parser)]
#[command(name = "modeladmin-server")]
#[command(about = "ModelAdmin Server - listing and permission engine for model admins")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Figment skips missing files silently; an explicit path must exist.
    if let Some(path) = &cli.config {
        if !path.is_file() {
            bail!("config file not found: {}", path.display());
        }
    }

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, config.home_dir());
    tracing::info!("ModelAdmin Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let admin_config = config.module_config::<ModelAdminConfig>(MODULE_NAME)?;
    tracing::info!(url_prefix = %admin_config.url_prefix, "Initializing model admins...");

    let demo = demo::build(&admin_config)?;
    let router = server::build_router(
        &demo.registry,
        Arc::new(demo.users),
        server::request_timeout(&config.server),
    );
    server::serve(&config.server, router).await
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let admin_config = config.module_config::<ModelAdminConfig>(MODULE_NAME)?;
    let demo = demo::build(&admin_config)?;

    tracing::info!(admins = demo.registry.len(), "Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
