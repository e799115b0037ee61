//! Admin router: authentication and read/clear behaviour.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::AUTHORIZATION, Method, Request, StatusCode};
use axum::Router;
use ipc_gateway::admin::{setup_admin_router, AdminState};
use ipc_gateway::gateway::Gateway;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

const API_KEY: &str = "test-admin-key";

fn router() -> (Router, Arc<Gateway>) {
    let (gateway, _) = common::gateway();
    let gateway = Arc::new(gateway);
    let router = setup_admin_router(AdminState::new(gateway.clone(), API_KEY));
    (router, gateway)
}

fn request(method: Method, uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header(AUTHORIZATION, format!("Bearer {key}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn populate(gateway: &Gateway) {
    let origin = common::origin();
    gateway.invoke("config:get", vec![json!("theme")], &origin).await.unwrap();
    gateway.invoke("config:get", vec![json!("")], &origin).await.unwrap_err();
    gateway.invoke("nope:nope", vec![], &origin).await.unwrap_err();
}

#[tokio::test]
async fn test_requests_without_valid_token_rejected() {
    let (router, _) = router();
    for key in [None, Some("wrong-key")] {
        let response = router
            .clone()
            .oneshot(request(Method::GET, "/admin/status", key))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = router
        .oneshot(request(Method::DELETE, "/admin/audit", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_reports_gateway_state() {
    let (router, gateway) = router();
    populate(&gateway).await;

    let response = router
        .oneshot(request(Method::GET, "/admin/status", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let status = body_json(response).await;
    assert_eq!(status["status"], "operational");
    assert_eq!(status["build_mode"], "development");
    assert_eq!(status["audit_entries"], 3);
    assert!(status["channels"]
        .as_array()
        .unwrap()
        .contains(&json!("config:get")));
}

#[tokio::test]
async fn test_audit_and_stats() {
    let (router, gateway) = router();
    populate(&gateway).await;

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/admin/audit", Some(API_KEY)))
        .await
        .unwrap();
    let entries = body_json(response).await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["decision"], "allowed");
    assert_eq!(entries[1]["reason"], "Validation: Key must not be empty");
    assert_eq!(entries[2]["context"]["session_id"], "session-test");

    let response = router
        .oneshot(request(Method::GET, "/admin/audit/stats?top=1", Some(API_KEY)))
        .await
        .unwrap();
    let stats = body_json(response).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["blocked"], 2);
    assert_eq!(stats["top_blocked_channels"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_performance_endpoints() {
    let (router, gateway) = router();
    populate(&gateway).await;

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/admin/performance", Some(API_KEY)))
        .await
        .unwrap();
    let stats = body_json(response).await;
    assert_eq!(stats["config:get"]["total_calls"], 1);
    assert_eq!(stats["config:get"]["successful_calls"], 1);
    assert_eq!(stats["config:get"]["error_rate"], 0.0);

    let response = router
        .oneshot(request(
            Method::GET,
            "/admin/performance/recent?limit=5",
            Some(API_KEY),
        ))
        .await
        .unwrap();
    let recent = body_json(response).await;
    assert_eq!(recent.as_array().unwrap().len(), 1);
    assert_eq!(recent[0]["channel"], "config:get");
}

#[tokio::test]
async fn test_delete_clears_state() {
    let (router, gateway) = router();
    populate(&gateway).await;
    assert_eq!(gateway.audit().len(), 3);

    let response = router
        .clone()
        .oneshot(request(Method::DELETE, "/admin/audit", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(gateway.audit().is_empty());

    let response = router
        .oneshot(request(Method::DELETE, "/admin/performance", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(gateway.performance().all_stats().is_empty());
    assert!(gateway.performance().recent_samples(10).is_empty());
}
