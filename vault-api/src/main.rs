//! Vault API Server
//!
//! HTTP interface to the envelope vault: seal JSON payloads into records,
//! fetch records by id, and decrypt them with the server's master key.
//!
//! Configuration (environment variables):
//!   VAULT_MASTER_KEY        - Master key, 64 hex characters (required)
//!   VAULT_PORT              - Listen port (default: 3000)
//!   VAULT_LOG_FORMAT        - "json" for structured logging, "pretty" for dev
//!   VAULT_MAX_BODY_BYTES    - Request body limit (default: 1048576)
//!   VAULT_RATE_LIMIT_RPS    - Requests per second per IP (default: 20)
//!   VAULT_RATE_LIMIT_BURST  - Burst capacity per IP (default: 50)
//!
//! Routes:
//!   GET  /health
//!   POST /api/records                    {"party_id": "...", "payload": {...}}
//!   GET  /api/records/:id
//!   POST /api/records/:id/decrypt
//!   GET  /api/parties/:party_id/records

mod config;
mod rate_limit;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use config::{Config, LogFormat};
use rate_limit::RateLimiter;
use routes::{AppState, Shared};
use vault_store::{InMemoryStore, TracingAuditSink, Vault};

fn init_logging(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vault_api=info,vault_store=info,tower_http=info".into());
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
    }
}

#[tokio::main]
async fn main() {
    init_logging(LogFormat::from_lookup(|name| std::env::var(name).ok()));

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let vault = Vault::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(TracingAuditSink),
        config.master_key,
    );

    let state: Shared = Arc::new(AppState {
        vault,
        rate_limiter: RateLimiter::new(config.rate_limit_rps, config.rate_limit_burst),
    });

    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.rate_limiter.cleanup().await;
            let clients = cleanup_state.rate_limiter.tracked_clients().await;
            tracing::debug!(clients, "rate limiter cleanup");
        }
    });

    let app = routes::app(state, config.max_body_bytes);

    tracing::info!(
        port = config.port,
        max_body_bytes = config.max_body_bytes,
        rate_rps = config.rate_limit_rps,
        rate_burst = config.rate_limit_burst,
        "starting Vault API Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, "bind failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}
