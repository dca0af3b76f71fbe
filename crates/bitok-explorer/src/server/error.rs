use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use bitok_core::CoreError;

use crate::render::error_body;

// ==============================================================================
// Error Type
// ==============================================================================

pub(crate) enum AppError {
    NotFound(String),
    Core(CoreError),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": msg }),
            ),
            Self::Core(err) => {
                if matches!(err, CoreError::Rpc(_)) {
                    tracing::warn!(error = %err, "node request failed");
                }
                error_body(&err)
            }
        };

        (status, Json(body)).into_response()
    }
}
