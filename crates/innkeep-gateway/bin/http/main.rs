mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use innkeep_booking::{BookingService, CatalogService, Generator, SeqGenerator, UlidGenerator};
use innkeep_core::{Store, SystemClock};
use innkeep_gateway::{App, AppState};
use innkeep_storage::{InMemoryStore, MySqlStore};
use innkeep_telemetry::TelemetryConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let _telemetry = innkeep_telemetry::init(
        TelemetryConfig::builder()
            .service_name("innkeep-gateway")
            .format(config.log_format.into())
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )
    .context("failed to initialize telemetry")?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        booking_id_prefix = %config.booking_id_prefix,
        "starting innkeep gateway"
    );

    let prefix = config.booking_id_prefix.as_str();
    let state = match config.storage {
        StorageBackendArg::InMemory => build_state(Arc::new(InMemoryStore::new()), prefix, |p| {
            SeqGenerator::with_prefix(p)
        }),
        StorageBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let store = MySqlStore::connect(dsn)
                .await
                .context("failed to connect to mysql")?;
            store.migrate().await.context("failed to migrate schema")?;
            build_state(Arc::new(store), prefix, |p| UlidGenerator::with_prefix(p))
        }
    };

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server failed")?;

    info!("gateway stopped");
    Ok(())
}

/// Wires both services over one store. Hotel and room ids use fixed
/// prefixes; booking ids use `booking_prefix`.
fn build_state<S, G>(store: Arc<S>, booking_prefix: &str, ids: impl Fn(&str) -> G) -> AppState
where
    S: Store,
    G: Generator,
{
    let catalog = CatalogService::new(store.clone(), ids("ht"), ids("rm"), SystemClock);
    let bookings = BookingService::new(store, ids(booking_prefix), SystemClock);
    AppState::new(Arc::new(catalog), Arc::new(bookings))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
