// src/main.rs - HTTP bridge and one-shot status queries
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use flashforge_rs::config::{self, Config, PORT_ENV};
use flashforge_rs::printer::{Printer, PrinterClient};
use flashforge_rs::web::api::{AppStateInner, create_router};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Status bridge for FlashForge printers
#[derive(Parser, Debug)]
#[command(name = "flashforge-server", version, about = "Query FlashForge printers and serve their status over HTTP.")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "flashforge.toml")]
    config: PathBuf,

    /// Log protocol traffic at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API for every configured printer (default)
    Serve,
    /// Print machine information as JSON
    Info(QueryArgs),
    /// Print job progress as JSON
    Progress(QueryArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Configured printer id, or a host name / IP address
    target: String,

    /// Protocol port when TARGET is not a configured printer
    #[arg(long)]
    port: Option<u16>,

    /// Exchange timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config).await,
        Commands::Info(args) => {
            let client = resolve_client(&cli.config, &args)?;
            let info = client.get_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        Commands::Progress(args) => {
            let client = resolve_client(&cli.config, &args)?;
            let progress = client.get_progress().await?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
            Ok(())
        }
    }
}

async fn serve(config_path: &Path) -> Result<(), BoxError> {
    let path = config_path.to_string_lossy();
    tracing::info!("Loading configuration from: {}", path);
    let mut config = config::load_config(&path)?;
    config.apply_port_override(std::env::var(PORT_ENV).ok().as_deref())?;

    if config.printers.is_empty() {
        tracing::warn!("No printers configured in {}", path);
    }
    for printer in &config.printers {
        tracing::info!("Printer {} at {}:{}", printer.id(), printer.host, printer.port);
    }

    let app = create_router(AppStateInner::from_config(&config));
    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// A configured printer when TARGET names one, otherwise a client for TARGET as a host.
fn resolve_client(config_path: &Path, args: &QueryArgs) -> Result<PrinterClient, BoxError> {
    let config = if config_path.exists() {
        config::load_config(&config_path.to_string_lossy())?
    } else {
        Config::default()
    };

    let mut client = match config.printer(&args.target) {
        Some(printer) => PrinterClient::from_config(printer),
        None => PrinterClient::new(args.target.clone()),
    };
    if let Some(port) = args.port {
        client = client.with_port(port);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        client = client.with_timeout(Duration::from_millis(timeout_ms));
    }
    tracing::debug!("Querying {} at {}", client.id(), client.endpoint());
    Ok(client)
}
