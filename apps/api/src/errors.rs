use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::orchestrator::FeedbackGenerationError;
use crate::extraction::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Narrative generation failed. The partial analysis is still returned to the
    /// client, along with the extracted text when the resume came from an upload.
    #[error("{error}")]
    FeedbackGeneration {
        #[source]
        error: FeedbackGenerationError,
        extracted_text: Option<String>,
    },

    #[error("Service at capacity: {0}")]
    Capacity(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FeedbackGenerationError> for AppError {
    fn from(error: FeedbackGenerationError) -> Self {
        AppError::FeedbackGeneration {
            error,
            extracted_text: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extraction(e) => {
                tracing::warn!("Extraction error: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    e.to_string(),
                )
            }
            AppError::FeedbackGeneration { error, .. } => {
                tracing::error!("Feedback generation error: {}", error.reason);
                (
                    StatusCode::BAD_GATEWAY,
                    "FEEDBACK_GENERATION_ERROR",
                    "AI feedback could not be generated. Scores and section analysis are still available; try again to get suggestions.".to_string(),
                )
            }
            AppError::Capacity(msg) => {
                tracing::warn!("Capacity reached: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, "CAPACITY_EXCEEDED", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        if let AppError::FeedbackGeneration {
            error,
            extracted_text,
        } = &self
        {
            body["partial_result"] = serde_json::to_value(&error.partial).unwrap_or_default();
            if let Some(text) = extracted_text {
                body["resume_text"] = json!(text);
            }
        }

        (status, Json(body)).into_response()
    }
}
