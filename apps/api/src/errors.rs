use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::screening::criteria::CriteriaError;
use crate::screening::parser::ProfileParseError;
use crate::workflow::forwarder::ForwardError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Profile parse error: {0}")]
    ProfileParse(#[from] ProfileParseError),

    #[error("AI rate limited: {0}")]
    RateLimited(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::RateLimited { .. } => AppError::RateLimited(e.to_string()),
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl From<CriteriaError> for AppError {
    fn from(e: CriteriaError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
        }
    }
}

impl From<ForwardError> for AppError {
    fn from(e: ForwardError) -> Self {
        AppError::Webhook(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                format!("Upload exceeds the configured size limit: {msg}"),
            ),
            AppError::ProfileParse(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PROFILE_PARSE_ERROR",
                format!("Could not read a candidate profile from the AI response: {e}"),
            ),
            AppError::RateLimited(msg) => {
                tracing::warn!("AI rate limit not recovered: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "AI_RATE_LIMITED",
                    "The AI service is rate limiting requests. Try again later.".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    format!("Unexpected AI error: {msg}"),
                )
            }
            AppError::Webhook(msg) => {
                tracing::error!("Webhook error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "WEBHOOK_ERROR",
                    "The recruitment workflow could not be reached".to_string(),
                )
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

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_retries_map_to_503() {
        let err = AppError::from(LlmError::RateLimited { retries: 3 });
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_other_llm_errors_map_to_502() {
        let err = AppError::from(LlmError::Api {
            status: 400,
            message: "bad key".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_parse_failure_maps_to_422() {
        let err = AppError::from(ProfileParseError::NoJsonObject);
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_oversized_upload_maps_to_413() {
        let err = AppError::PayloadTooLarge("length limit exceeded".to_string());
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_criteria_error_maps_to_400() {
        let err = AppError::from(CriteriaError::UnknownSkill("Rust".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
