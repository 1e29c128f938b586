//! Mintbay Gateway binary.

use mintbay_gateway::{create_router, jobs, AppState, Config};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mintbay Gateway");

    let config: Config = config::Config::builder()
        .add_source(config::File::with_name("gateway").required(false))
        .add_source(
            config::Environment::with_prefix("MINTBAY")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("content_gateways")
                .with_list_parse_key("ledger_endpoints"),
        )
        .build()
        .and_then(|c| c.try_deserialize())
        .unwrap_or_else(|e| {
            // Fall back only when no config exists; parsing errors fail hard.
            let err_str = format!("{e}");
            if err_str.contains("not found") || err_str.contains("missing field") {
                warn!(error = %e, "No config file found, using defaults");
                Config::default()
            } else {
                error!(error = %e, "FATAL: Config error — fix env vars or gateway.toml");
                std::process::exit(1);
            }
        });

    info!(
        authority = %config.authority_account,
        ledger_endpoints = config.ledger_endpoints.len(),
        content_gateways = config.content_gateways.len(),
        "Configuration loaded"
    );

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(config)?);

    let cancel = CancellationToken::new();

    let state_bg = Arc::clone(&state);
    let cancel_bg = cancel.clone();
    tokio::spawn(async move {
        jobs::run_refresher(state_bg, cancel_bg).await;
    });

    let app = create_router(state.clone());

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Graceful shutdown: stop the refresher, drain settling actions ---
    info!("HTTP server stopped, draining in-flight actions...");
    cancel.cancel();

    let drain_deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(30);
    loop {
        let in_flight = state
            .executes_in_flight
            .load(std::sync::atomic::Ordering::Relaxed);
        if in_flight == 0 {
            info!("All in-flight actions drained");
            break;
        }
        if tokio::time::Instant::now() >= drain_deadline {
            warn!(
                remaining = in_flight,
                "Drain timeout — some actions may be lost"
            );
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    info!("Gateway shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
