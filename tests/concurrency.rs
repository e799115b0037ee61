//! Many concurrent callers sharing one gateway.

use std::sync::Arc;

use ipc_gateway::audit::AuditDecision;
use ipc_gateway::config::GatewayConfig;
use ipc_gateway::gateway::GatewayError;
use ipc_gateway::security::{BuildMode, SecurityViolation};
use serde_json::json;

mod common;

const TASKS: usize = 50;
const CALLS_PER_TASK: usize = 10;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_audit_entries_lost() {
    let mut config = GatewayConfig::default();
    config.rate_limit.max_calls = 10_000;
    let (gateway, forwarded) = common::gateway_with(config, BuildMode::Development);
    let gateway = Arc::new(gateway);

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let gateway = gateway.clone();
        handles.push(tokio::spawn(async move {
            for call in 0..CALLS_PER_TASK {
                let key = format!("task-{task}-call-{call}");
                gateway
                    .invoke("config:get", vec![json!(key)], &common::origin())
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let total = TASKS * CALLS_PER_TASK;
    assert_eq!(gateway.audit().len(), total);
    assert_eq!(forwarded.len(), total);
    assert!(gateway
        .audit()
        .entries()
        .iter()
        .all(|e| e.decision == AuditDecision::Allowed));

    let stats = gateway.performance().channel_stats("config:get").unwrap();
    assert_eq!(stats.total_calls, total as u64);
    assert_eq!(gateway.performance().in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rate_window_not_miscounted() {
    let (gateway, forwarded) = common::gateway();
    let gateway = Arc::new(gateway);

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let gateway = gateway.clone();
        handles.push(tokio::spawn(async move {
            let mut admitted = 0usize;
            let mut limited = 0usize;
            for _ in 0..CALLS_PER_TASK {
                match gateway
                    .invoke("window:minimize", vec![], &common::origin())
                    .await
                {
                    Ok(_) => admitted += 1,
                    Err(GatewayError::Security(SecurityViolation::RateLimitExceeded)) => {
                        limited += 1
                    }
                    Err(other) => panic!("unexpected rejection: {other}"),
                }
            }
            (admitted, limited)
        }));
    }

    let mut admitted = 0;
    let mut limited = 0;
    for handle in handles {
        let (a, l) = handle.await.unwrap();
        admitted += a;
        limited += l;
    }

    // 500 calls against the default 100-per-window limit.
    assert_eq!(admitted, 100);
    assert_eq!(limited, TASKS * CALLS_PER_TASK - 100);
    assert_eq!(forwarded.len(), 100);
    // Rejected attempts still count against the window.
    assert_eq!(
        gateway.rate_limiter().current_count("window:minimize") as usize,
        TASKS * CALLS_PER_TASK
    );

    let stats = gateway.audit().stats();
    assert_eq!(stats.allowed, 100);
    assert_eq!(stats.blocked, limited);
}
