use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::audit::{AuditEntry, SecurityStats};
use crate::performance::{ChannelStats, PerformanceSample};
use crate::security::BuildMode;

const DEFAULT_RECENT_LIMIT: usize = 100;

#[derive(Serialize)]
pub struct GatewayStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub build_mode: BuildMode,
    pub channels: Vec<String>,
    pub audit_entries: usize,
    pub audit_capacity: usize,
    pub in_flight: usize,
}

/// Per-channel statistics with the derived error rate.
#[derive(Serialize)]
pub struct ChannelPerformance {
    #[serde(flatten)]
    pub stats: ChannelStats,
    pub error_rate: f64,
}

impl From<ChannelStats> for ChannelPerformance {
    fn from(stats: ChannelStats) -> Self {
        Self {
            error_rate: stats.error_rate(),
            stats,
        }
    }
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub top: Option<usize>,
}

#[derive(Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<GatewayStatus> {
    let gateway = &state.gateway;
    Json(GatewayStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if gateway.is_shut_down() {
            "shut_down"
        } else {
            "operational"
        },
        build_mode: gateway.build_mode(),
        channels: gateway
            .handlers()
            .channels()
            .into_iter()
            .map(String::from)
            .collect(),
        audit_entries: gateway.audit().len(),
        audit_capacity: gateway.audit().capacity(),
        in_flight: gateway.performance().in_flight(),
    })
}

pub async fn get_audit(State(state): State<AdminState>) -> Json<Vec<AuditEntry>> {
    Json(state.gateway.audit().entries())
}

pub async fn get_audit_stats(
    State(state): State<AdminState>,
    Query(query): Query<StatsQuery>,
) -> Json<SecurityStats> {
    let audit = state.gateway.audit();
    Json(match query.top {
        Some(top) => audit.stats_top(top),
        None => audit.stats(),
    })
}

pub async fn get_performance(
    State(state): State<AdminState>,
) -> Json<HashMap<String, ChannelPerformance>> {
    let stats = state
        .gateway
        .performance()
        .all_stats()
        .into_iter()
        .map(|(channel, stats)| (channel, stats.into()))
        .collect();
    Json(stats)
}

pub async fn get_recent_samples(
    State(state): State<AdminState>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<PerformanceSample>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Json(state.gateway.performance().recent_samples(limit))
}

pub async fn clear_audit(State(state): State<AdminState>) -> StatusCode {
    state.gateway.audit().clear();
    tracing::info!("Audit log cleared via admin API");
    StatusCode::NO_CONTENT
}

pub async fn clear_performance(State(state): State<AdminState>) -> StatusCode {
    state.gateway.performance().clear();
    tracing::info!("Performance data cleared via admin API");
    StatusCode::NO_CONTENT
}
