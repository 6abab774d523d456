use crate::infrastructure::BackoffPolicy;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Gateway endpoints
    pub http_base: String,
    pub ws_base: String,

    // Watch target
    pub cluster: String,
    pub namespace: String,
    pub resource_plural: String,

    // Session tuning
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
    pub bootstrap_window_ms: u64,
    pub max_reconnect_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_base: "http://127.0.0.1:8080".to_string(),
            ws_base: "ws://127.0.0.1:8080".to_string(),
            cluster: "host".to_string(),
            namespace: String::new(),
            resource_plural: "datasets".to_string(),
            debounce_ms: 1000,
            poll_interval_ms: 15_000,
            bootstrap_window_ms: 2000,
            max_reconnect_attempts: 5,
            backoff_base_ms: 1000,
            backoff_cap_ms: 10_000,
            debug: false,
        }
    }
}

impl Config {
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            base: Duration::from_millis(self.backoff_base_ms),
            cap: Duration::from_millis(self.backoff_cap_ms),
            max_attempts: self.max_reconnect_attempts,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let http_base = std::env::var("FLUIDWATCH_HTTP_BASE")
        .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

    let ws_base = std::env::var("FLUIDWATCH_WS_BASE")
        .unwrap_or_else(|_| "ws://127.0.0.1:8080".to_string());

    let cluster = std::env::var("FLUIDWATCH_CLUSTER").unwrap_or_else(|_| "host".to_string());

    let namespace = std::env::var("FLUIDWATCH_NAMESPACE").unwrap_or_default();

    let resource_plural =
        std::env::var("FLUIDWATCH_RESOURCE_PLURAL").unwrap_or_else(|_| "datasets".to_string());

    let debounce_ms = std::env::var("FLUIDWATCH_DEBOUNCE_MS")
        .unwrap_or_else(|_| "1000".to_string())
        .parse()
        .unwrap_or(1000);

    let poll_interval_ms = std::env::var("FLUIDWATCH_POLL_INTERVAL_MS")
        .unwrap_or_else(|_| "15000".to_string())
        .parse()
        .unwrap_or(15_000);

    let bootstrap_window_ms = std::env::var("FLUIDWATCH_BOOTSTRAP_WINDOW_MS")
        .unwrap_or_else(|_| "2000".to_string())
        .parse()
        .unwrap_or(2000);

    let max_reconnect_attempts = std::env::var("FLUIDWATCH_MAX_RECONNECT_ATTEMPTS")
        .unwrap_or_else(|_| "5".to_string())
        .parse()
        .unwrap_or(5);

    let backoff_base_ms = std::env::var("FLUIDWATCH_BACKOFF_BASE_MS")
        .unwrap_or_else(|_| "1000".to_string())
        .parse()
        .unwrap_or(1000);

    let backoff_cap_ms = std::env::var("FLUIDWATCH_BACKOFF_CAP_MS")
        .unwrap_or_else(|_| "10000".to_string())
        .parse()
        .unwrap_or(10_000);

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        http_base,
        ws_base,
        cluster,
        namespace,
        resource_plural,
        debounce_ms,
        poll_interval_ms,
        bootstrap_window_ms,
        max_reconnect_attempts,
        backoff_base_ms,
        backoff_cap_ms,
        debug,
    })
}
