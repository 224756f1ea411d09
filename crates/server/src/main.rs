//! Readom server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use readom_core::config::AppConfig;
use readom_items::{ItemCache, ItemStore};
use readom_server::handlers::spawn_retention_task;
use readom_server::{AppState, MeteredSource, create_router};
use readom_upstream::HackerNewsClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Readom - A Hacker News API cache with visit statistics
#[derive(Parser, Debug)]
#[command(name = "readomd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "READOM_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Readom API Server v{}", env!("CARGO_PKG_VERSION"));

    // Every setting has a default, so the config file is optional.
    let mut figment = Figment::new();
    if std::path::Path::new(&args.config).exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::info!(
            config_path = %args.config,
            "No config file found, using defaults and environment"
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("READOM_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    readom_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    // The counter store starts even if its backend is down; visits are
    // dropped until a reconnect succeeds.
    let counter = readom_counter::from_config(&config.counter)
        .await
        .context("failed to initialize counter store")?;
    tracing::info!(
        backend = counter.backend_name(),
        state = ?counter.connection_state(),
        "Counter store initialized"
    );

    let item_store = readom_items::from_config(&config.items)
        .await
        .context("failed to initialize item store")?;
    item_store
        .health_check()
        .await
        .context("item store health check failed")?;
    tracing::info!("Item store initialized");

    let client =
        HackerNewsClient::from_config(&config.upstream).context("invalid upstream configuration")?;
    tracing::info!(base_url = %client.base_url(), "Upstream client initialized");

    let items = ItemCache::new(item_store, Arc::new(MeteredSource::new(client)));
    let state = AppState::new(config.clone(), counter, items);

    if let Some(interval) = config.retention.auto_interval() {
        spawn_retention_task(state.items.clone(), state.retention_policy(), interval);
    }

    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}
