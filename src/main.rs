use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use zure::{report, router, OverpassExploreService};
use zure_core::config::Config;
use zure_core::wire::{DirectionInput, ExploreRequest, ExploreResponse};

#[derive(Parser)]
#[command(name = "zure", about = "zure: find named places near a position")]
struct Cli {
    /// Read configuration from this file instead of ~/.config/zure/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the explore endpoint.
    Serve {
        /// Listen address, overriding `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one search and print the result.
    Explore {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// OSM tag as key=value; repeatable.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Category label such as "cafe" or "park"; repeatable.
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long)]
        radius: Option<f64>,
        /// Degrees or a compass name.
        #[arg(long)]
        direction: Option<String>,
        #[arg(long)]
        direction_range: Option<f64>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// List the category labels accepted by `--category`.
    Categories,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// The `/api/explore` response body.
    Json,
    /// One line per place with its category label.
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let service = Arc::new(OverpassExploreService::from_config(&config)?);
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            tracing::info!(
                addr = %listener.local_addr()?,
                mirrors = config.upstream.mirrors.len(),
                "zure listening"
            );
            axum::serve(listener, router(service))
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Command::Explore {
            lat,
            lng,
            tags,
            categories,
            radius,
            direction,
            direction_range,
            format,
        } => {
            let service = OverpassExploreService::from_config(&config)?;
            let request = ExploreRequest {
                current_lat: Some(lat),
                current_lng: Some(lng),
                radius,
                osm_tags: tags,
                categories,
                direction: direction.map(DirectionInput::Named),
                direction_range,
                ..Default::default()
            };
            let success = service.explore(&request).await?;
            match format {
                Format::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&ExploreResponse::Success(success))?
                ),
                Format::Text => print!("{}", report::explore_text(&success)),
            }
        }
        Command::Categories => print!("{}", report::categories_text()),
    }
    Ok(())
}

fn init_tracing(log_file: Option<&std::path::Path>) -> anyhow::Result<()> {
    let filter =
        || EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter())
                .init();
            tracing::info!(path = %path.display(), "zure log started");
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter())
                .init();
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
