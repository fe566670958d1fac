//! frm-gw (Gateway) - HTTP orchestration service for the Flood Relief
//! Mapper
//!
//! Accepts a place name, drives the external geospatial tools (DEM
//! generation, road extraction, overlay composition, satellite fetch,
//! path planning, flood segmentation) in a fixed sequence, and serves
//! the resulting artifacts to the frontend.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frm_gw::config::Config;
use frm_gw::tools::Toolset;
use frm_gw::{build_router, AppState};

/// Command-line arguments for frm-gw
#[derive(Parser, Debug)]
#[command(name = "frm-gw")]
#[command(about = "Gateway service for the Flood Relief Mapper")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "FRM_GW_PORT")]
    port: Option<u16>,

    /// Root folder for pipeline artifacts
    #[arg(short, long, env = "FRM_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frm_gw=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Flood Relief Mapper gateway (frm-gw) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let config = Config::resolve(args.root_folder.as_deref(), args.port, args.config.as_deref())?;
    config.ensure_directories()?;

    info!("Root folder: {}", config.root_folder.display());

    let tools = Toolset::from_config(&config.tools, &config.artifacts);
    let port = config.port;
    let state = AppState::new(config, tools);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("frm-gw listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve when the process should shut down
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler we just run until killed
        tracing::error!("Failed to install ctrl-c handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
