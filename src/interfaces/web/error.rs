use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::core::bots::BotError;

impl BotError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BotError::Validation(_) | BotError::AlreadyRunning(_) | BotError::NotRunning(_) => {
                StatusCode::BAD_REQUEST
            }
            BotError::NotFound(_) => StatusCode::NOT_FOUND,
            BotError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            BotError::Io(_) | BotError::Corrupt(_) | BotError::Spawn { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (
            status,
            Json(serde_json::json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
