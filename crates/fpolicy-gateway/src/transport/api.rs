//! JSON settings API.
//!
//! - `GET /v1/policies` : catalog with resolved origins and the directive
//! - `GET /v1/settings` : stored snapshot
//! - `PUT /v1/settings` : replace snapshot (non-mapping bodies become `{}`);
//!   admin only, mounted when `admin.enabled`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};

use fpolicy_core::error::FpolicyError;
use fpolicy_core::{join, resolve, SettingsSnapshot, HEADER_NAME};

use super::{authorize, ApiError};
use crate::app_state::AppState;

pub async fn get_policies(State(state): State<AppState>) -> Json<Value> {
    let settings = state.load_settings().await;
    let resolved = resolve(state.catalog(), &settings);
    Json(json!({
        "header": HEADER_NAME,
        "directive": join(&resolved),
        "features": resolved,
    }))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsSnapshot> {
    Json(state.load_settings().await)
}

pub async fn put_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers, None)?;
    let Json(body) = body.map_err(|e| FpolicyError::BadRequest(e.body_text()))?;
    let snapshot = SettingsSnapshot::sanitize(body);
    state.store_settings(snapshot.clone(), "api").await?;
    Ok(Json(json!({
        "settings": snapshot,
        "directive": fpolicy_core::build(state.catalog(), &snapshot),
    })))
}
