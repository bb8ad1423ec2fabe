//! Tasktrail HTTP server.
//!
//! Reads configuration from the environment, installs the tracing
//! subscriber and serves the API until interrupted. With `DATABASE_URL`
//! unset the server keeps all state in memory.

use eyre::WrapErr;
use tasktrail::api::{self, AppState};
use tasktrail::config::AppConfig;
use tasktrail::persistence::build_pool;
use tasktrail::telemetry;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = AppConfig::from_env().wrap_err("reading configuration")?;
    telemetry::init(config.log_format).wrap_err("installing tracing subscriber")?;

    let app = match &config.database_url {
        Some(url) => {
            let pool = build_pool(url, config.db_pool_size)
                .wrap_err("connecting to PostgreSQL")?;
            info!(event = "server.backend", backend = "postgres", "Using PostgreSQL storage");
            api::router(AppState::postgres(&pool))
        }
        None => {
            warn!(
                event = "server.backend",
                backend = "memory",
                "DATABASE_URL is unset; state will not survive a restart"
            );
            api::router(AppState::in_memory())
        }
    };

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .wrap_err_with(|| format!("binding {}", config.bind_addr))?;
    info!(event = "server.listening", addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("serving HTTP")?;
    info!(event = "server.stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(event = "server.signal_error", error = %err, "Failed to listen for shutdown signal");
    }
}
