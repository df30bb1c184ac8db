//! Errors raised while proxying a single request.
//!
//! An origin answering with a non-success status is not an error: it is
//! collapsed into a plain 404 by the handler. What lands here is everything the
//! handler cannot turn into a calendar response itself, and the server maps it
//! onto a gateway status.

use axum::http::header::{HeaderName, InvalidHeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while proxying a request to the origin.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connecting to the origin or reading its body failed.
    #[error("origin request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Base URL plus inbound path did not form a valid URL.
    #[error("invalid origin URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A header value derived from the inbound path is not representable.
    #[error("invalid {name} header value: {source}")]
    InvalidHeader {
        name: HeaderName,
        #[source]
        source: InvalidHeaderValue,
    },
}

impl ProxyError {
    /// Status code reported to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::InvalidUrl { .. } | ProxyError::InvalidHeader { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(error = %self, status = %status, "Proxy request failed");

        let message = match status {
            StatusCode::GATEWAY_TIMEOUT => "Origin timed out",
            StatusCode::BAD_GATEWAY => "Origin request failed",
            _ => "Bad request",
        };
        (status, message).into_response()
    }
}
