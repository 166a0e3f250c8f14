//! End-to-end checks against the axum router.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use fpolicy_core::SettingsSnapshot;
use fpolicy_gateway::{
    app_state::AppState,
    config,
    router::build_router,
    settings::{FileProvider, SettingsProvider},
};

const TWO_FEATURES: &str = r#"
version: 1
catalog:
  features: ["camera", "geolocation"]
"#;

const ADMIN: &str = "admin:\n  enabled: true\n  token: \"s3cret\"\n";

fn app(yaml: &str) -> (Router, AppState) {
    let cfg = config::load_from_str(yaml).unwrap();
    let state = AppState::new(cfg).unwrap();
    (build_router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn policy(resp: &axum::response::Response) -> Option<&str> {
    resp.headers()
        .get("feature-policy")
        .map(|v| v.to_str().unwrap())
}

fn put_settings(body: &str, token: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method(Method::PUT)
        .uri("/v1/settings")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    req.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn defaults_on_every_response() {
    let (app, _) = app(TWO_FEATURES);
    for uri in ["/", "/healthz", "/v1/settings", "/does-not-exist"] {
        let resp = send(&app, get(uri)).await;
        assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'self'"), "{uri}");
    }
}

#[tokio::test]
async fn initial_override_applies() {
    let yaml = format!("{TWO_FEATURES}settings:\n  initial:\n    camera: [\"*\"]\n");
    let (app, _) = app(&yaml);
    let resp = send(&app, get("/")).await;
    assert_eq!(policy(&resp), Some("camera *; geolocation 'self'"));
}

#[tokio::test]
async fn put_settings_replaces_snapshot() {
    let (app, state) = app(&format!("{TWO_FEATURES}{ADMIN}"));
    let req = put_settings(r#"{"geolocation":["'none'"],"camera":["bogus"]}"#, Some("s3cret"));
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'none'"));
    let body = body_json(resp).await;
    assert_eq!(body["directive"], "camera 'self'; geolocation 'none'");

    assert_eq!(
        state.metrics().settings_updates.get(&[("source", "api")]),
        1
    );
    assert_eq!(
        state.metrics().override_fallbacks.get(&[("feature", "camera")]),
        1
    );
}

#[tokio::test]
async fn put_non_mapping_clears_settings() {
    let yaml = format!("{TWO_FEATURES}{ADMIN}settings:\n  initial:\n    camera: [\"*\"]\n");
    let (app, _) = app(&yaml);
    let resp = send(&app, put_settings("[1,2,3]", Some("s3cret"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["settings"], json!({}));

    let resp = send(&app, get("/v1/settings")).await;
    assert_eq!(body_json(resp).await, json!({}));
}

#[tokio::test]
async fn put_settings_invalid_json_is_json_error() {
    let (app, _) = app(&format!("{TWO_FEATURES}{ADMIN}"));
    let resp = send(&app, put_settings("{not json", Some("s3cret"))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'self'"));
    let body = body_json(resp).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["msg"].as_str().unwrap().starts_with("bad request:"));

    let req = Request::builder()
        .method(Method::PUT)
        .uri("/v1/settings")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"camera":["*"]}"#))
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn put_settings_requires_admin_token() {
    let (app, state) = app(&format!("{TWO_FEATURES}{ADMIN}"));
    for token in [None, Some("wrong")] {
        let resp = send(&app, put_settings(r#"{"camera":["*"]}"#, token)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'self'"));
        assert_eq!(body_json(resp).await["code"], "AUTH_FAILED");
    }
    assert_eq!(state.metrics().auth_failures.get(&[]), 2);
    assert_eq!(body_json(send(&app, get("/v1/settings")).await).await, json!({}));
}

#[tokio::test]
async fn writes_not_mounted_without_admin() {
    let (app, _) = app(TWO_FEATURES);
    let resp = send(&app, put_settings(r#"{"camera":["*"]}"#, Some("s3cret"))).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'self'"));

    let resp = send(&app, get("/")).await;
    assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'self'"));
}

#[tokio::test]
async fn policies_endpoint_reports_sources() {
    let yaml = format!("{TWO_FEATURES}settings:\n  initial:\n    camera: [\"'none'\"]\n    geolocation: 5\n");
    let (app, _) = app(&yaml);
    let body = body_json(send(&app, get("/v1/policies")).await).await;
    assert_eq!(body["header"], "Feature-Policy");
    assert_eq!(body["directive"], "camera 'none'; geolocation 'self'");
    assert_eq!(body["features"][0]["feature"]["name"], "camera");
    assert_eq!(body["features"][0]["source"], "override");
    assert_eq!(body["features"][1]["source"], "malformed_override");
}

#[tokio::test]
async fn admin_form_round_trip() {
    let (app, _) = app(&format!("{TWO_FEATURES}{ADMIN}"));

    let page = body_text(send(&app, get("/admin/feature-policies")).await).await;
    assert!(page.contains("<h1>Feature Policies</h1>"));
    assert!(page.contains("<select id=\"geolocation\" name=\"geolocation\">"));
    assert!(page.contains("name=\"_token\""));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/admin/feature-policies")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("camera=%27none%27&geolocation=*&teleport=*&_token=s3cret"))
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/admin/feature-policies");
    assert_eq!(policy(&resp), Some("camera 'none'; geolocation *"));

    let body = body_json(send(&app, get("/v1/settings")).await).await;
    assert_eq!(body, json!({"camera": ["'none'"], "geolocation": ["*"]}));
}

#[tokio::test]
async fn admin_form_rejects_missing_token() {
    let (app, _) = app(&format!("{TWO_FEATURES}{ADMIN}"));
    let req = Request::builder()
        .method(Method::POST)
        .uri("/admin/feature-policies")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("camera=*&_token=nope"))
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'self'"));
}

#[tokio::test]
async fn admin_can_be_disabled() {
    let yaml = format!("{TWO_FEATURES}admin:\n  enabled: false\n");
    let (app, _) = app(&yaml);
    let resp = send(&app, get("/admin/feature-policies")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(policy(&resp).is_some());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/admin/feature-policies")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("camera=*"))
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'self'"));
}

#[tokio::test]
async fn header_disabled_sends_nothing() {
    let yaml = format!("{TWO_FEATURES}header:\n  enabled: false\n");
    let (app, _) = app(&yaml);
    assert!(policy(&send(&app, get("/")).await).is_none());
}

fn own_header_app(yaml: &str) -> Router {
    let cfg = config::load_from_str(yaml).unwrap();
    let state = AppState::new(cfg).unwrap();
    Router::new()
        .route(
            "/own",
            axum::routing::get(|| async { ([("feature-policy", "usb 'none'")], "x") }),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            fpolicy_gateway::transport::header::feature_policy_header,
        ))
}

#[tokio::test]
async fn if_not_present_keeps_handler_header() {
    let app = own_header_app(TWO_FEATURES);
    let resp = send(&app, get("/own")).await;
    assert_eq!(policy(&resp), Some("usb 'none'"));
}

#[tokio::test]
async fn overriding_mode_replaces_handler_header() {
    let yaml = format!("{TWO_FEATURES}header:\n  mode: overriding\n");
    let app = own_header_app(&yaml);
    let resp = send(&app, get("/own")).await;
    assert_eq!(policy(&resp), Some("camera 'self'; geolocation 'self'"));
}

#[tokio::test]
async fn empty_catalog_sends_no_header() {
    let (app, state) = app("version: 1\ncatalog:\n  features: []\n");
    let resp = send(&app, get("/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(policy(&resp).is_none());
    assert_eq!(state.metrics().headers_skipped.get(&[("reason", "empty")]), 1);

    let body = body_json(send(&app, get("/v1/policies")).await).await;
    assert_eq!(body["directive"], "");
}

#[tokio::test]
async fn file_provider_is_read_per_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let cfg = config::load_from_str(TWO_FEATURES).unwrap();
    let provider: Arc<dyn SettingsProvider> = Arc::new(FileProvider::new(&path));
    let state = AppState::with_provider(cfg, provider).unwrap();
    let app = build_router(state);

    // missing file => defaults
    assert_eq!(
        policy(&send(&app, get("/")).await),
        Some("camera 'self'; geolocation 'self'")
    );

    std::fs::write(&path, r#"{"camera":["*"]}"#).unwrap();
    assert_eq!(
        policy(&send(&app, get("/")).await),
        Some("camera *; geolocation 'self'")
    );

    // garbage => defaults, header still sent
    std::fs::write(&path, "not json").unwrap();
    assert_eq!(
        policy(&send(&app, get("/")).await),
        Some("camera 'self'; geolocation 'self'")
    );

    // non-mapping json => defaults
    std::fs::write(&path, r#"["*"]"#).unwrap();
    assert_eq!(
        policy(&send(&app, get("/")).await),
        Some("camera 'self'; geolocation 'self'")
    );
}

#[tokio::test]
async fn file_provider_persists_replace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let provider = FileProvider::new(&path);

    let mut s = SettingsSnapshot::new();
    s.set("camera", fpolicy_core::Origin::None);
    provider.replace(s.clone()).await.unwrap();

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"camera": ["'none'"]}));
    assert_eq!(provider.get_option().await.unwrap(), s);
}

#[tokio::test]
async fn metrics_endpoint_counts_headers() {
    let (app, _) = app(TWO_FEATURES);
    send(&app, get("/")).await;
    let text = body_text(send(&app, get("/metrics")).await).await;
    assert!(text.contains("fpolicy_headers_attached_total 1"));
}
