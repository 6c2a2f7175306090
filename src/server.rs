//! HTTP server initialization and runtime setup.
//!
//! Owns the record store lifecycle: the store handle is built here, injected
//! into the application state, and closed once the server has drained.

use crate::config::{Config, StorageBackend};
use crate::domain::repositories::{OwnerRepository, ShortCodeRepository};
use crate::infrastructure::persistence::{InMemoryStore, PgOwnerRepository, PgRecordRepository};
use crate::infrastructure::rate_limit::GovernorRateLimiter;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Store handles for the configured backend.
struct Stores {
    records: Arc<dyn ShortCodeRepository>,
    owners: Arc<dyn OwnerRepository>,
    /// Set for Postgres; closed on shutdown.
    pool: Option<Arc<PgPool>>,
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Record store (PostgreSQL pool + migrations, or in-memory)
/// - Anonymous rate limiter and its sweep task
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let stores = open_stores(&config).await?;

    let per_minute = NonZeroU32::new(config.anon_rate_per_minute)
        .context("ANON_RATE_PER_MINUTE must be greater than 0")?;
    let burst =
        NonZeroU32::new(config.anon_rate_burst).context("ANON_RATE_BURST must be greater than 0")?;
    let limiter = Arc::new(GovernorRateLimiter::new(per_minute, burst));
    spawn_limiter_sweep(limiter.clone());

    let state = AppState::new(
        stores.records.clone(),
        stores.owners.clone(),
        limiter,
        &config,
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(pool) = stores.pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn open_stores(config: &Config) -> Result<Stores> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;

            let pool = Arc::new(pool);
            Ok(Stores {
                records: Arc::new(PgRecordRepository::new(pool.clone())),
                owners: Arc::new(PgOwnerRepository::new(pool.clone())),
                pool: Some(pool),
            })
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; records are lost on restart");
            let store = Arc::new(InMemoryStore::new());
            Ok(Stores {
                records: store.clone(),
                owners: store,
                pool: None,
            })
        }
    }
}

/// Periodically drops limiter buckets that have fully refilled.
fn spawn_limiter_sweep(limiter: Arc<GovernorRateLimiter>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            limiter.retain_recent();
            tracing::debug!(tracked = limiter.tracked_keys(), "Rate limiter swept");
        }
    });
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
