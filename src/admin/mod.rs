//! Read-and-clear introspection surface over HTTP.
//!
//! # Design Decisions
//! - Every route sits behind the bearer-token middleware
//! - Nothing here can admit a call or loosen a policy; it only reads or
//!   clears accumulated audit and performance data

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::gateway::Gateway;

/// Shared state for admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub gateway: Arc<Gateway>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(gateway: Arc<Gateway>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            gateway,
            api_key: api_key.into(),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/audit", get(get_audit).delete(clear_audit))
        .route("/admin/audit/stats", get(get_audit_stats))
        .route("/admin/performance", get(get_performance).delete(clear_performance))
        .route("/admin/performance/recent", get(get_recent_samples))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin router until the gateway shuts down.
pub async fn serve(listener: TcpListener, state: AdminState) -> std::io::Result<()> {
    let shutdown = state.gateway.subscribe_shutdown();
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(crate::lifecycle::shutdown::wait_for(shutdown))
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
