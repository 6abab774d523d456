//! fluid-watch - Resilient watcher for Fluid resource collections
//!
//! Composition root: wires the WebSocket transport and the list client into
//! one watch session and reports connectivity and refreshes until stopped.

mod adapters;
mod application;
mod config;
mod domain;
mod infrastructure;

use crate::adapters::{ListClient, WebSocketTransport};
use crate::application::{WatchHooks, WatchParams, WatchSession};
use crate::config::load_config;
use crate::domain::endpoint::WatchTarget;
use crate::domain::ports::WatchTransport;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    tracing::info!(
        "starting fluid-watch resource={} namespace={} cluster={}",
        cfg.resource_plural,
        if cfg.namespace.is_empty() { "<all>" } else { &cfg.namespace },
        cfg.cluster
    );

    let target = WatchTarget::new(cfg.resource_plural.clone())
        .namespace(cfg.namespace.clone())
        .cluster(cfg.cluster.clone());

    let params = WatchParams::new(target.clone())
        .debounce_window(Duration::from_millis(cfg.debounce_ms))
        .poll_interval(Duration::from_millis(cfg.poll_interval_ms))
        .bootstrap_window(Duration::from_millis(cfg.bootstrap_window_ms))
        .backoff(cfg.backoff());

    let transport: Arc<dyn WatchTransport> = Arc::new(WebSocketTransport::new(cfg.ws_base.clone()));
    let list_client = Arc::new(ListClient::new(cfg.http_base.clone()));

    // The reload hook re-fetches the collection and reports its size.
    let reload_target = target.clone();
    let hooks = WatchHooks::new(move || {
        let client = list_client.clone();
        let target = reload_target.clone();
        tokio::spawn(async move {
            match client.fetch(&target).await {
                Ok(summary) => tracing::info!(
                    resource = %target.resource_plural,
                    items = summary.total(),
                    "collection reloaded"
                ),
                Err(e) => tracing::warn!(error = %e, "collection reload failed"),
            }
        });
    })
    .on_deleted(|| tracing::info!("resource deleted, clearing dependent selections"));

    let mut session = WatchSession::start(params, transport, hooks);

    // Report connectivity transitions until shutdown.
    let mut connectivity = session.connectivity();
    let reporter = tokio::spawn(async move {
        while connectivity.changed().await.is_ok() {
            let connected = *connectivity.borrow();
            tracing::info!(connected, "push channel connectivity changed");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    session.stop().await;
    reporter.abort();

    Ok(())
}
