//! Error conversions
//!
//! Renders `AppError` as the JSON error envelope.

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // 5xx の詳細はクライアントに返さない
        let message = if self.is_server_error() {
            self.kind().as_str()
        } else {
            self.message()
        };

        let body = serde_json::json!({
            "statusCode": self.status_code(),
            "errorCode": self.code(),
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        });

        (status, Json(body)).into_response()
    }
}
