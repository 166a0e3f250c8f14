//! HTTP surfaces: the response-header middleware, the admin form and the
//! JSON settings API.

pub mod admin;
pub mod api;
pub mod header;

use axum::{
    http::{header as http_header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use fpolicy_core::error::{ClientCode, FpolicyError};

use crate::app_state::AppState;

/// Check admin credentials before any write.
///
/// Accepts `Authorization: Bearer <token>`, or `form_token` when the request
/// came from the admin form.
pub fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    form_token: Option<&str>,
) -> Result<(), ApiError> {
    let bearer = headers
        .get(http_header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    if state.cfg().admin.accepts(bearer.or(form_token)) {
        return Ok(());
    }
    state.metrics().auth_failures.inc(&[]);
    tracing::warn!("settings write rejected: bad or missing admin token");
    Err(ApiError(FpolicyError::AuthFailed))
}

/// Error wrapper rendered as `{ "code": ..., "msg": ... }`.
#[derive(Debug)]
pub struct ApiError(pub FpolicyError);

impl From<FpolicyError> for ApiError {
    fn from(e: FpolicyError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
            ClientCode::AuthFailed => StatusCode::UNAUTHORIZED,
            ClientCode::NotFound => StatusCode::NOT_FOUND,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "code": code.as_str(), "msg": self.0.to_string() }))).into_response()
    }
}
