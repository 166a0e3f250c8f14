//! Axum router wiring.
//!
//! Every route, including ops and admin, passes through the
//! `Feature-Policy` middleware.

use axum::{
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse},
    routing::{get, MethodRouter},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route("/v1/policies", get(transport::api::get_policies))
        .route("/v1/settings", settings_route(&state));

    if state.cfg().admin.enabled {
        router = router.route(
            transport::admin::ADMIN_PATH,
            get(transport::admin::render).post(transport::admin::submit),
        );
    }

    router
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            transport::header::feature_policy_header,
        ))
        .with_state(state)
}

/// Writes exist only with admin enabled; the handler checks the token.
fn settings_route(state: &AppState) -> MethodRouter<AppState> {
    let route = get(transport::api::get_settings);
    if state.cfg().admin.enabled {
        route.put(transport::api::put_settings)
    } else {
        route
    }
}

async fn index() -> Html<&'static str> {
    Html("<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>fpolicy</title></head><body><p>Feature-Policy gateway</p></body></html>\n")
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}
