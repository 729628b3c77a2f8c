mod cli;
mod config_file;
mod listener;
mod watcher;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use oproxy_core::{Core, SnapshotStore, UpstreamClientConfig, WreqUpstreamClient};
use oproxy_router::gateway_router;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::listener::bind_with_retry;
use crate::watcher::ConfigWatcher;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    if let Err(err) = run(cli).await {
        eprintln!("oproxy failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config_file::load_or_create(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.hostname = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let snapshot = config.snapshot()?;
    info!(
        path = %cli.config.display(),
        models = snapshot.len(),
        hostname = %config.server.hostname,
        port = config.server.port,
        proxy = %config.server.proxy.as_deref().unwrap_or(""),
        "config loaded"
    );
    let store = Arc::new(SnapshotStore::new(snapshot));

    let client = WreqUpstreamClient::new(UpstreamClientConfig::from_server(&config.server))
        .context("build upstream client")?;
    let core = Core::new(store.loader(), Arc::new(client));
    let app = gateway_router(&core);

    let listener = bind_with_retry(
        &config.server.hostname,
        config.server.port,
        config.server.max_port_attempts,
    )
    .await
    .with_context(|| format!("bind {}:{}", config.server.hostname, config.server.port))?;
    info!(addr = %listener.local_addr()?, "listening");

    let _watcher = match ConfigWatcher::start(cli.config.clone(), store.clone()) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            warn!(error = %format_args!("{err:#}"), "config watcher unavailable, reload disabled");
            None
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shutdown complete");
    Ok(())
}

const LOG_TARGETS: &[&str] = &["oproxy", "oproxy_core", "oproxy_router"];

fn default_directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new(default_directives("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directives("info")))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
