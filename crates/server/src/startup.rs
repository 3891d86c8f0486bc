use std::{future::Future, net::SocketAddr};

use axum::Router;
use configs::{AppConfig, StorageBackend};
use models::FieldLimits;
use service::{open_store, RecordService};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Open the configured store and wrap it in handler state.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    if cfg.storage.backend == StorageBackend::File {
        common::env::ensure_data_dir(&cfg.storage.path)
            .await
            .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    }
    let store = open_store(&cfg.storage).await?;
    let limits = FieldLimits { max_field_chars: cfg.storage.max_field_chars };
    service::metrics::init();
    info!(backend = ?cfg.storage.backend, path = %cfg.storage.path.display(), "record store ready");
    Ok(AppState { records: RecordService::new(store, limits) })
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app = routes::build_router(state);

    let addr: SocketAddr = cfg
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("{}: {e}", cfg.bind_addr())))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, "starting record registry server");

    serve(listener, app, shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
