//! Integration tests for the portal router.
//!
//! These drive the full Axum service with in-process requests and verify
//! the streamed page end to end, including the spill delivery strategy.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use confportal_core::{DeliveryStrategy, EngineConfig};
use confportal_html::{Parameter, ParameterGroup, ParameterKind};
use confportal_web::{create_router, AppState, PortalConfig, PortalState};

fn demo_state(engine: EngineConfig) -> AppState {
    let system = vec![ParameterGroup::new("system", "System")
        .with_param(Parameter::new("name", "Device name", ParameterKind::Text).with_value("probe-1"))
        .with_param(Parameter::new(
            "portal_pass",
            "Portal password",
            ParameterKind::Password,
        ))];
    let custom = vec![ParameterGroup::new("mqtt", "MQTT")
        .with_param(
            Parameter::new("mqtt_host", "Broker host", ParameterKind::Text).with_value("10.0.0.2"),
        )
        .with_param(
            Parameter::new(
                "mqtt_port",
                "Broker port",
                ParameterKind::Number {
                    min: Some(1),
                    max: Some(65535),
                },
            )
            .with_value("1883"),
        )
        .with_param(Parameter::new("mqtt_tls", "Use TLS", ParameterKind::Checkbox).with_value("true"))];

    let config = PortalConfig {
        title: "Config probe-1".to_string(),
        config_version: "v3".to_string(),
        update_path: Some("/update".to_string()),
        engine,
    };
    Arc::new(PortalState::new(config, system, custom))
}

async fn get_page(state: AppState) -> (StatusCode, axum::http::HeaderMap, String) {
    let app = create_router(state);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/config")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_config_page_streams_complete_document() {
    let (status, headers, html) = get_page(demo_state(EngineConfig::default())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(headers[header::PRAGMA], "no-cache");

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.ends_with("</body></html>"));
    assert!(html.contains("<title>Config probe-1</title>"));
    assert!(html.contains("name=\"mqtt_host\""));
    assert!(html.contains("value=\"10.0.0.2\""));
    assert!(html.contains("config version: v3"));
    assert!(html.contains("href=\"/update\""));
}

#[tokio::test]
async fn test_small_buffer_streams_identical_page() {
    let (_, _, reference) = get_page(demo_state(EngineConfig::default())).await;
    let (_, _, tiny) = get_page(demo_state(EngineConfig {
        buffer_capacity: 192,
        ..EngineConfig::default()
    }))
    .await;
    assert_eq!(reference, tiny);
}

#[tokio::test]
async fn test_spill_strategy_serves_page_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let scratch = dir.path().join("portal.scratch");
    let engine = EngineConfig {
        buffer_capacity: 256,
        strategy: DeliveryStrategy::Spill {
            scratch_path: scratch,
        },
    };

    let (status, _, html) = get_page(demo_state(engine)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.ends_with("</body></html>"));
    assert!(html.contains("name=\"mqtt_host\""));

    // Every per-pass scratch file was removed after draining.
    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_save_applies_values_and_keeps_secret() {
    let state = demo_state(EngineConfig::default());
    let app = create_router(state.clone());

    let form = "portalSave=1&name=probe-2&portal_pass=&mqtt_host=broker.local&mqtt_port=8883";
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Configuration saved."));

    let system = state.system.read().await;
    assert_eq!(system[0].params[0].value, "probe-2");
    // Empty password submission kept the stored secret untouched.
    assert_eq!(system[0].params[1].value, "");

    let custom = state.custom.read().await;
    assert_eq!(custom[0].params[0].value, "broker.local");
    assert_eq!(custom[0].params[1].value, "8883");
    // The checkbox was absent from the submission, so it is now off.
    assert_eq!(custom[0].params[2].value, "false");
}

#[tokio::test]
async fn test_saved_values_render_on_next_visit() {
    let state = demo_state(EngineConfig::default());
    let app = create_router(state.clone());

    let form = "portalSave=1&mqtt_host=broker.local";
    let _ = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    let (_, _, html) = get_page(state).await;
    assert!(html.contains("value=\"broker.local\""));
}

#[tokio::test]
async fn test_post_without_save_marker_redirects() {
    let app = create_router(demo_state(EngineConfig::default()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=whatever"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/config");
}

#[tokio::test]
async fn test_root_redirects_to_config() {
    let app = create_router(demo_state(EngineConfig::default()));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/config");
}
