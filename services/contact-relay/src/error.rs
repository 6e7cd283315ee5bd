// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact endpoint and their HTTP mapping.

use crate::handlers::rate_limit_headers;
use crate::mailer::DispatchError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contact_form::ValidationErrors;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const SEND_FAILED: &str = "Failed to send message. Please try again later.";
pub const UNEXPECTED: &str = "An unexpected error occurred. Please try again later.";

/// Everything the contact endpoint can answer with besides success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Too many requests. Please try again later.")]
    RateLimited { limit: u32, retry_after: Duration },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Method not allowed. Use POST to submit contact forms.")]
    MethodNotAllowed,

    #[error("Unexpected internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::MalformedBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Dispatch(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// One field-level problem in a 400 response.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ErrorDetail>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    fn validation(details: Vec<ErrorDetail>) -> Self {
        Self {
            success: false,
            error: "Validation failed".to_string(),
            details: Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            Self::RateLimited { limit, retry_after } => {
                let retry_secs = retry_after.as_secs();
                let mut headers = rate_limit_headers(limit, 0, retry_secs);
                headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_secs));

                let body = ErrorResponse::new(
                    ApiError::RateLimited { limit, retry_after }.to_string(),
                );
                (status, headers, Json(body)).into_response()
            }
            Self::MalformedBody(_) => {
                let body = ErrorResponse::validation(vec![ErrorDetail {
                    field: "body".to_string(),
                    message: "Request body must be a JSON object".to_string(),
                }]);
                (status, Json(body)).into_response()
            }
            Self::Validation(errors) => {
                let details = errors
                    .into_errors()
                    .into_iter()
                    .map(|e| ErrorDetail {
                        field: e.field.to_string(),
                        message: e.message,
                    })
                    .collect();
                (status, Json(ErrorResponse::validation(details))).into_response()
            }
            // Transport details stay in the server log
            Self::Dispatch(_) => (status, Json(ErrorResponse::new(SEND_FAILED))).into_response(),
            Self::MethodNotAllowed => (
                status,
                [(header::ALLOW, "POST, OPTIONS")],
                Json(ErrorResponse::new(
                    ApiError::MethodNotAllowed.to_string(),
                )),
            )
                .into_response(),
            Self::Internal => (status, Json(ErrorResponse::new(UNEXPECTED))).into_response(),
        }
    }
}
