//! Error handling

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::dataset::IngestError;
use crate::detection::DetectError;
use crate::quiz::QuizError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Upload errors
    #[error("Could not parse upload: {0}")]
    Parse(String),

    #[error("No numeric features found. Please upload a dataset with numeric values.")]
    NoNumericFeatures,

    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    // Detection errors
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    // Request errors
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, level, error_message) = match &self {
            AppError::Parse(_) => (StatusCode::BAD_REQUEST, "error", message.as_str()),
            AppError::NoNumericFeatures => {
                tracing::warn!("Upload has no numeric features, detection skipped");
                (StatusCode::UNPROCESSABLE_ENTITY, "warning", message.as_str())
            }
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "error", message.as_str()),
            AppError::ModelFit(msg) => {
                tracing::error!("Model fit error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "error", "Threat detection failed")
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "error", msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "error", msg.as_str()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "error", msg.as_str()),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "error", "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
            "level": level,
        }));

        (status, body).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Parse(msg) => AppError::Parse(msg),
            IngestError::NoNumericFeatures => AppError::NoNumericFeatures,
            IngestError::Write(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<DetectError> for AppError {
    fn from(err: DetectError) -> Self {
        AppError::ModelFit(err.to_string())
    }
}

impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::UnknownQuestion(_) => AppError::NotFound(err.to_string()),
            QuizError::AnswerCount { .. } => AppError::ValidationError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest(err.body_text())
        }
    }
}
