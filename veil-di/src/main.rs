//! veil-di (Document Ingestion) - upload gate and processing workflow service
//!
//! Serves the JSON/SSE API the browser dashboard uses to upload documents
//! and walk them through Detection → Policy Advisor → Masking → QA.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};
use veil_common::events::EventBus;
use veil_di::config::{
    log_directives, CliOverrides, ServiceConfig, DEFAULT_LOG_LEVEL, ENV_CONFIG, ENV_LOG_LEVEL,
    ENV_PORT,
};
use veil_di::{build_router, AppState};

/// EventBus capacity; upload ticks are the busiest producer
const EVENT_BUS_CAPACITY: usize = 1000;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "veil-di")]
#[command(about = "Veil Document Ingestion service", long_about = None)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = ENV_PORT)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = ENV_LOG_LEVEL)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging comes up before config loading so its warnings are visible.
    // RUST_LOG wins outright; otherwise the TOML level is applied once known.
    let rust_log = EnvFilter::try_from_default_env().ok();
    let honor_toml_level = rust_log.is_none();
    let bootstrap_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let (filter, filter_handle) = reload::Layer::new(
        rust_log.unwrap_or_else(|| EnvFilter::new(log_directives(&bootstrap_level))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::resolve(&CliOverrides {
        config: args.config,
        port: args.port,
        bind_address: args.bind_address,
        log_level: args.log_level,
    })
    .context("Failed to resolve configuration")?;

    if honor_toml_level && config.log_level != bootstrap_level {
        filter_handle
            .reload(EnvFilter::new(log_directives(&config.log_level)))
            .context("Failed to apply configured log level")?;
    }

    info!(
        "Starting Veil Document Ingestion (veil-di) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &config.config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using defaults"),
    }
    info!(
        tick_ms = config.upload.tick_interval_ms,
        step = config.upload.progress_step,
        settle_ms = config.upload.settle_delay_ms,
        auto_start = config.upload.auto_start_workflow,
        "Upload gate configured"
    );

    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    let state = AppState::new(config.upload.clone(), config.qa.clone(), event_bus);
    let app = build_router(state);

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
