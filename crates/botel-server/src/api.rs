//! Connection-details endpoint.

use crate::AppState;
use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use botel_voice::VoiceError;
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl From<VoiceError> for ApiError {
    fn from(e: VoiceError) -> Self {
        match e {
            VoiceError::NotConfigured => ApiError::ServiceUnavailable(e.to_string()),
            other => ApiError::InternalServerError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `POST /api/connection-details`.
///
/// Every call creates a new room and participant. The request body is
/// ignored. Responses are never cached since each token is single-use.
pub async fn connection_details_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let details = state.voice_service.issue_connection_details().map_err(|e| {
        tracing::error!(%request_id, "failed to issue connection details: {}", e);
        ApiError::from(e)
    })?;

    tracing::debug!(%request_id, room = %details.room_name, "connection details issued");

    Ok(([(header::CACHE_CONTROL, "no-store")], Json(details)).into_response())
}
