use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use registry_core::{
    CoreConfig, PatientService,
    config::{patient_data_dir_from_env_value, store_kind_from_env_value},
    open_store,
};

const DEFAULT_REST_ADDR: &str = "0.0.0.0:5000";

/// Main entry point for the patient registry
///
/// Resolves configuration from the environment once, opens the patient store once, and serves
/// the REST API until Ctrl+C.
///
/// # Environment Variables
/// - `REGISTRY_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `PATIENT_DATA_DIR`: Directory for patient documents (default: "patient_data")
/// - `PATIENT_STORE`: `file` (default) or `memory`
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration is invalid, the store cannot be opened, or the
///   server fails to bind or run
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registry=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("REGISTRY_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = CoreConfig::new(
        patient_data_dir_from_env_value(std::env::var("PATIENT_DATA_DIR").ok()),
        store_kind_from_env_value(std::env::var("PATIENT_STORE").ok())?,
    )?;
    tracing::info!(
        dir = %cfg.patient_data_dir().display(),
        store = %cfg.store_kind(),
        "patient data configured"
    );

    let store = open_store(&cfg)?;
    let app = api_rest::router(PatientService::new(store));

    tracing::info!("++ Starting patient registry REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr)
        .await
        .with_context(|| format!("failed to bind {rest_addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("-- Patient registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(signal::ctrl_c()).await
}

/// Resolves when `signal` fires. If the signal cannot be listened for, the server keeps running.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler, shutdown signal disabled");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_follows_the_signal() {
        let waited =
            tokio::time::timeout(Duration::from_millis(100), wait_for_shutdown(async { Ok(()) }))
                .await;
        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_server_running() {
        let failing = async { Err(std::io::Error::other("no signal driver")) };
        let waited =
            tokio::time::timeout(Duration::from_millis(100), wait_for_shutdown(failing)).await;
        assert!(waited.is_err(), "server shut down on a listener error");
    }
}
