use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use knowbatch::report::ReportError;
use serde_json::json;
use tracing::error;

/// Errors a handler can return, each mapped to a status code and a JSON body.
pub enum AppError {
    /// Failures of the report flow itself.
    Report(ReportError),
    /// The multipart body could not be read (including oversized uploads).
    Upload(MultipartError),
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::Report(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Upload(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Report(err) => {
                error!("ReportError: {:?}", err);
                match err {
                    ReportError::Generation(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to generate content: {e}"),
                    ),
                    ReportError::Table(e) => (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read CSV file: {e}"),
                    ),
                    ReportError::Batch(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
                }
            }
            AppError::Upload(err) => {
                error!("Upload error: {}", err.body_text());
                (err.status(), err.body_text())
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));
        (status_code, body).into_response()
    }
}
