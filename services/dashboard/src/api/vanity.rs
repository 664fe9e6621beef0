//! Vanity redirect fallback.
//!
//! Any path the router does not own is looked up in the current snapshot's
//! vanity map. A hit answers 301 with headers that keep browsers and proxies
//! from caching the redirect, so a registry change takes effect immediately.
use crate::api::error::{ApiError, api_not_found};
use crate::app::AppState;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

pub(crate) async fn vanity_redirect(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, ApiError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(api_not_found("no such route"));
    }
    let target = state
        .snapshot
        .current()
        .and_then(|loaded| loaded.vanity.resolve(uri.path()));
    let Some(target) = target else {
        metrics::counter!("dashboard_vanity_requests_total", "result" => "miss").increment(1);
        return Err(api_not_found("no such route"));
    };

    let Ok(location) = HeaderValue::from_str(&target.url) else {
        tracing::warn!(path = %uri.path(), url = %target.url, "vanity target is not a valid header value");
        metrics::counter!("dashboard_vanity_requests_total", "result" => "invalid").increment(1);
        return Err(api_not_found("no such route"));
    };
    metrics::counter!("dashboard_vanity_requests_total", "result" => "hit").increment(1);
    tracing::debug!(path = %uri.path(), url = %target.url, "vanity redirect");

    let status = StatusCode::from_u16(target.status).unwrap_or(StatusCode::MOVED_PERMANENTLY);
    let mut response = status.into_response();
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    for (name, value) in target.cache_headers() {
        headers.insert(name, HeaderValue::from_static(value));
    }
    Ok(response)
}
