//! Host startup sequence.
//!
//! # Responsibilities
//! - Install logging and metrics from configuration
//! - Build the gateway for the current build mode
//! - Run the admin surface (if enabled) until shutdown
//!
//! # Design Decisions
//! - Ordered startup: observability first, then the gateway, then listeners
//! - The gateway's own shutdown signal stops every listener

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::admin::{self, AdminState};
use crate::config::{GatewayConfig, ObservabilityConfig};
use crate::gateway::{Gateway, HandlerRegistry, InitError};
use crate::lifecycle::signals;
use crate::observability::{logging, metrics};
use crate::security::BuildMode;

/// Errors that abort host startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
    #[error("failed to build gateway: {0}")]
    Gateway(#[from] InitError),
    #[error("invalid address '{0}'")]
    Address(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the tracing subscriber and, when enabled, the metrics exporter.
pub fn init_observability(config: &ObservabilityConfig) -> Result<(), StartupError> {
    logging::init_logging(config)?;

    if config.metrics_enabled {
        let addr: SocketAddr = config
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address(config.metrics_address.clone()))?;
        metrics::init_metrics(addr);
    }
    Ok(())
}

/// Build a shareable gateway, reading the build mode from the environment.
pub fn build_gateway(
    config: GatewayConfig,
    handlers: HandlerRegistry,
) -> Result<Arc<Gateway>, StartupError> {
    let gateway = Gateway::new(config, BuildMode::from_env(), handlers)?;
    Ok(Arc::new(gateway))
}

/// Run a gateway host until a termination signal arrives.
pub async fn run(config: GatewayConfig, handlers: HandlerRegistry) -> Result<(), StartupError> {
    init_observability(&config.observability)?;

    let admin_config = config.admin.clone();
    let gateway = build_gateway(config, handlers)?;
    tracing::info!(
        build_mode = ?gateway.build_mode(),
        channels = gateway.handlers().len(),
        "Gateway host starting"
    );

    tokio::spawn(signals::shutdown_on_signal(gateway.clone()));

    if admin_config.enabled {
        let listener = TcpListener::bind(&admin_config.bind_address).await?;
        admin::serve(listener, AdminState::new(gateway, admin_config.api_key)).await?;
    } else {
        crate::lifecycle::shutdown::wait_for(gateway.subscribe_shutdown()).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
