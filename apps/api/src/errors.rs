use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extractor::MissingDocument;

/// Shown with every failed analysis.
pub const REMEDIATION_HINT: &str =
    "Details: Please make sure your PDF is not password protected and is readable.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Please upload a resume first")]
    MissingDocument(#[from] MissingDocument),

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    /// Extraction or model failure. `message` is the original description.
    #[error("{prefix}: {message}")]
    AnalysisFailed {
        prefix: &'static str,
        message: String,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, hint) = match &self {
            AppError::MissingDocument(_) => (StatusCode::BAD_REQUEST, "MISSING_DOCUMENT", None),
            AppError::PayloadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", None)
            }
            AppError::UnsupportedMediaType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                None,
            ),
            AppError::AnalysisFailed { .. } => {
                tracing::error!("{message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    Some(REMEDIATION_HINT),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(hint) = hint {
            error["hint"] = json!(hint);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
