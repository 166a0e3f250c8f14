//! `Feature-Policy` response header middleware.
//!
//! Runs after the inner handler so the header reflects settings written by
//! that same request. Never fails the response.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use fpolicy_core::{join, resolve, OverrideSource};

use crate::app_state::AppState;
use crate::config::HeaderMode;

static FEATURE_POLICY: HeaderName = HeaderName::from_static("feature-policy");

pub async fn feature_policy_header(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let mut resp = next.run(req).await;

    let header_cfg = &state.cfg().header;
    if !header_cfg.enabled {
        return resp;
    }

    let settings = state.load_settings().await;
    let resolved = resolve(state.catalog(), &settings);
    for r in resolved
        .iter()
        .filter(|r| r.source == OverrideSource::MalformedOverride)
    {
        state
            .metrics()
            .override_fallbacks
            .inc(&[("feature", r.feature.name.as_str())]);
    }

    let directive = join(&resolved);
    if directive.is_empty() {
        state.metrics().headers_skipped.inc(&[("reason", "empty")]);
        return resp;
    }

    let value = match HeaderValue::from_str(&directive) {
        Ok(v) => v,
        Err(e) => {
            state.metrics().headers_skipped.inc(&[("reason", "invalid")]);
            tracing::warn!(error = %e, "directive is not a valid header value");
            return resp;
        }
    };

    let headers = resp.headers_mut();
    match header_cfg.mode {
        HeaderMode::IfNotPresent if headers.contains_key(&FEATURE_POLICY) => {
            state.metrics().headers_skipped.inc(&[("reason", "present")]);
        }
        _ => {
            headers.insert(FEATURE_POLICY.clone(), value);
            state.metrics().headers_attached.inc(&[]);
        }
    }
    resp
}
