use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use housekeeping::config::HousekeepingConfig;
use housekeeping::domain::service::UiPorts;
use housekeeping::infra::storage::InMemoryDocumentStore;
use housekeeping::infra::ui::{FixedConfirmer, TracingLoadingIndicator, TracingNotifier};
use housekeeping::module::HousekeepingPorts;
use housekeeping::Housekeeping;
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use tokio::net::TcpListener;

mod shutdown;
mod web;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// RoomCheck Server - housekeeping checklist backend and front-end host
#[derive(Parser)]
#[command(name = "roomcheck-server")]
#[command(about = "RoomCheck Server - housekeeping checklist backend and front-end host")]
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

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("RoomCheck Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config).await,
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let hk_config: HousekeepingConfig = config.module_config("housekeeping")?;

    // Headless host: toasts and spinners go to the log, confirmations are declined.
    let housekeeping = Housekeeping::default();
    housekeeping.init(
        &hk_config,
        HousekeepingPorts {
            store: Arc::new(InMemoryDocumentStore::new()),
            ui: UiPorts {
                notifier: Arc::new(TracingNotifier),
                loading: Arc::new(TracingLoadingIndicator),
                confirmer: Arc::new(FixedConfirmer(false)),
            },
            session: None,
        },
    )?;

    let static_root = config.static_root();
    if !static_root.is_dir() {
        tracing::warn!(
            "Static directory {} does not exist; every asset will be 404",
            static_root.display()
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind HTTP listener on {addr}"))?;
    tracing::info!("Serving {} at http://{}/", static_root.display(), addr);

    let grace = (config.server.timeout_sec > 0)
        .then(|| Duration::from_secs(config.server.timeout_sec));
    let served = web::serve_until(
        listener,
        web::router(static_root, REQUEST_TIMEOUT),
        shutdown::wait_for_shutdown(),
        grace,
    )
    .await;

    housekeeping.stop().await;
    tracing::info!("RoomCheck Server stopped");
    served
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already normalized & created home_dir
    let _: HousekeepingConfig = config.module_config("housekeeping")?;
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
