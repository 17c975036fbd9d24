use std::env;

use gatehouse_server::config::load_config;
use gatehouse_server::{observability, routes, state};

#[tokio::main]
async fn main() {
    // Load .env if present, for local development.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    let config_path = resolve_config_path();
    let config = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    observability::init_tracing(&config.logging.level);

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(2);
    }
    tracing::info!(path = %config_path, "configuration loaded");

    let api_state = match state::build_state(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Startup error: {e}");
            std::process::exit(2);
        }
    };

    let app = routes::router(api_state);

    let listener = match tokio::net::TcpListener::bind(&config.server.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind {}: {e}", config.server.bind_addr);
            std::process::exit(2);
        }
    };
    tracing::info!(addr = %config.server.bind_addr, "gatehouse listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Config path from `--config <path>`, `GATEHOUSE_CONFIG`, or the default.
fn resolve_config_path() -> String {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return path;
            }
        }
    }
    env::var("GATEHOUSE_CONFIG").unwrap_or_else(|_| "gatehouse.toml".to_string())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
