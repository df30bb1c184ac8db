//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn a successful origin response into a calendar download
//! - Strip connection-level headers that belong to the origin hop
//! - Overwrite Content-Type, Content-Disposition and Cache-Control
//! - Collapse any non-success origin status into a plain 404
//!
//! # Design Decisions
//! - Body is fully buffered as text; no streaming
//! - The three overwritten headers are replaced, never appended, so running the
//!   transform twice yields the same header set
//! - Content-Length is dropped and recomputed by the server from the body

use axum::body::Body;
use axum::http::header::{
    HeaderName, CACHE_CONTROL, CONNECTION, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::error::ProxyError;

/// Content type of every successful response.
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Cache directive of every successful response.
pub const CALENDAR_CACHE_CONTROL: &str = "public, max-age=3600";

/// Body of the response sent when the origin does not succeed.
pub const NOT_FOUND_BODY: &str = "Not found";

const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Last `/`-delimited segment of a path; empty when the path ends in `/`.
pub fn last_path_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Content-Disposition value offering `filename` as an attachment.
///
/// The same literal goes into both the plain and the `filename*` form.
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"; filename*=UTF-8''{filename}")
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// Derive the downstream header set from the origin's headers.
pub fn calendar_headers(upstream: &HeaderMap, path: &str) -> Result<HeaderMap, ProxyError> {
    let disposition = content_disposition(last_path_segment(path));
    let disposition = HeaderValue::from_str(&disposition).map_err(|source| {
        ProxyError::InvalidHeader {
            name: CONTENT_DISPOSITION,
            source,
        }
    })?;

    let mut headers = upstream.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(CONTENT_LENGTH);

    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CALENDAR_CONTENT_TYPE));
    headers.insert(CONTENT_DISPOSITION, disposition);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(CALENDAR_CACHE_CONTROL));
    Ok(headers)
}

/// Assemble the downstream response for a successful fetch.
pub fn calendar_response(status: StatusCode, headers: HeaderMap, body: String) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Response sent whenever the origin answers outside 2xx.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}
