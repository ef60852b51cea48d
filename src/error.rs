use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for the portal bridge.
///
/// Every upstream-facing failure is converted into one of these kinds at the
/// bridge boundary; no raw transport error crosses into the application layer.
/// Captcha/credential rejections are not here: they are classified login
/// outcomes and travel in-band as `{ success: false }` payloads.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("upstream portal unavailable: {0}")]
    UpstreamUnavailable(anyhow::Error),

    #[error("upstream portal timed out")]
    UpstreamTimeout,

    #[error("no portal session established")]
    SessionMissing,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("portal session expired")]
    SessionExpired,

    #[error("unparseable response from portal")]
    InvalidUpstreamResponse,
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            success: bool,
            message: &'static str,
        }

        // Classified failures map to short human-readable messages; raw
        // upstream text is never surfaced to the caller.
        let (status, message) = match &self {
            BridgeError::MissingField(_) => (StatusCode::BAD_REQUEST, "Missing required fields"),
            BridgeError::SessionMissing => (StatusCode::UNAUTHORIZED, "Session ID required"),
            BridgeError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "Session expired. Please login again.",
            ),
            BridgeError::InvalidUpstreamResponse => (
                StatusCode::UNAUTHORIZED,
                "Invalid response from server. Session may have expired.",
            ),
            BridgeError::UpstreamUnavailable(_) => (
                StatusCode::BAD_GATEWAY,
                "The examination portal is unreachable. Please try again later.",
            ),
            BridgeError::UpstreamTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "The examination portal took too long to respond. Please try again.",
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "portal bridge failure");
        }

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
