use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use trogon_core::error::BookingError;

/// HTTP wrapper around the domain error taxonomy. Each failure kind maps to
/// its own status code; internal detail leaves the process only outside
/// production mode.
#[derive(Debug)]
pub struct ApiError(pub BookingError);

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err {
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::PaymentNotSettled { .. } => StatusCode::PAYMENT_REQUIRED,
            BookingError::InsufficientInventory { .. } => StatusCode::CONFLICT,
            BookingError::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
            BookingError::Database(_) | BookingError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut body = json!({
            "error": err.code(),
            "message": client_message(&err),
        });

        if status.is_server_error() {
            // Correlation id: logged alongside the full error, returned to the
            // client for support requests.
            let reference = Uuid::new_v4();
            tracing::error!(%reference, error = %err, "request failed");
            body["reference"] = json!(reference.to_string());
            if !is_production() {
                body["details"] = json!(err.to_string());
            }
        }

        (status, Json(body)).into_response()
    }
}

/// Database and internal errors are summarized for the client; everything
/// else is already written to be shown.
fn client_message(err: &BookingError) -> String {
    match err {
        BookingError::Database(_) => "A database error occurred".to_string(),
        BookingError::Internal(_) => "An internal error occurred".to_string(),
        other => other.to_string(),
    }
}

fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|mode| mode == "production")
        .unwrap_or(false)
}
