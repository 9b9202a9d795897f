use std::sync::Arc;

use clap::Parser;
mod cli;
mod find;
mod web;
mod wifi;
use tracing::info;
use wte_common::{GlobalConfig, redact};
use wte_core::{AppState, Params, Providers, register_gateway_providers, router};
use wte_gateway::{MapsClient, MapsClientConfig};
use wte_provider_core::no_updates;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("wte failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    info!(
        host = %config.host,
        port = config.port,
        api_key = %redact(&config.api_key),
        mode = %config.mode,
        proxy = %config.proxy.as_deref().unwrap_or(""),
        "config loaded"
    );

    let providers = Arc::new(build_providers(&config)?);
    match &cli.command {
        Command::Serve(_) => serve(&config, providers).await,
        Command::Find(args) => find::run(&providers, args).await,
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wte=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_providers(config: &GlobalConfig) -> anyhow::Result<Providers> {
    let client = MapsClient::new(MapsClientConfig::from_global(config))?;
    let providers = Providers::new(config.mode);
    providers.configure(Params::new(Arc::new(client)), no_updates);
    register_gateway_providers(&providers)?;
    info!(providers = providers.len(), "providers registered");
    Ok(providers)
}

async fn serve(config: &GlobalConfig, providers: Arc<Providers>) -> anyhow::Result<()> {
    let app = axum::Router::new()
        .merge(router(Arc::new(AppState::new(providers))))
        .fallback(axum::routing::get(web::static_fallback));

    let bind = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(addr = %bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}
