use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use common::HeaderError;
use thiserror::Error;
use tracing::warn;

use crate::observability::{REJECTED_TOTAL, UPSTREAM_ERRORS_TOTAL};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request shape rejected before forwarding.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Header(#[from] HeaderError),
    /// The server could not be reached or did not answer in time.
    #[error("server unavailable: {0}")]
    Upstream(String),
}

impl GatewayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Header(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let title = match &self {
            Self::Validation(_) => "Validation Error",
            Self::Header(_) => "Bad Request",
            Self::Upstream(_) => "Bad Gateway",
        };
        match &self {
            Self::Upstream(_) => UPSTREAM_ERRORS_TOTAL.inc(),
            _ => REJECTED_TOTAL.inc(),
        }
        warn!(status = status.as_u16(), error = %self, "request not forwarded");
        let body = ErrorBody { error: title.to_string(), message: Some(self.to_string()) };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(GatewayError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::from(HeaderError::Missing).status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::Upstream("refused".into()).status(), StatusCode::BAD_GATEWAY);
    }
}
