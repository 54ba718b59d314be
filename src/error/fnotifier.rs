use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::FormRejection,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error as ThisError;

use super::IsRetryable;
use super::oauth::OauthError;

/// Required fields of a contact form submission, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Gmail,
    Description,
}

impl FormField {
    /// The form key the field is submitted under.
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Gmail => "gmail",
            FormField::Description => "description",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, ThisError)]
pub enum FnotifierError {
    #[error("{0} is not provided")]
    MissingField(FormField),

    /// The body could not be read as a url-encoded or multipart form.
    #[error("Invalid form body: {0}")]
    InvalidForm(String),

    #[error("Authorization code is not provided")]
    MissingAuthorizationCode,

    #[error("Spreadsheet client is not authorized yet")]
    SheetsNotReady,

    #[error("Spreadsheet client is already authorized")]
    AlreadyAuthorized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error(transparent)]
    Oauth(#[from] OauthError),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<FormRejection> for FnotifierError {
    fn from(rejection: FormRejection) -> Self {
        FnotifierError::InvalidForm(rejection.body_text())
    }
}

impl From<MultipartRejection> for FnotifierError {
    fn from(rejection: MultipartRejection) -> Self {
        FnotifierError::InvalidForm(rejection.body_text())
    }
}

impl From<MultipartError> for FnotifierError {
    fn from(err: MultipartError) -> Self {
        FnotifierError::InvalidForm(err.body_text())
    }
}

impl IsRetryable for FnotifierError {
    /// True only when resending cannot duplicate a side effect upstream.
    ///
    /// `values:append` is not idempotent, so a timeout or a 5xx (the row may already be
    /// committed) is final; only a request that never got past connecting is resent.
    fn is_retryable(&self) -> bool {
        match self {
            FnotifierError::ReqwestError(e) => e.is_connect(),
            FnotifierError::Oauth(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl IntoResponse for FnotifierError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            FnotifierError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "MISSING_FIELD".to_string(),
                    message: format!("{field} is not provided"),
                    details: Some(Value::String(field.as_str().to_string())),
                },
            ),

            FnotifierError::InvalidForm(reason) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "INVALID_FORM".to_string(),
                    message: "Request body must be a url-encoded or multipart form.".to_string(),
                    details: Some(Value::String(reason)),
                },
            ),

            FnotifierError::MissingAuthorizationCode => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "MISSING_CODE".to_string(),
                    message: "Query parameter `code` is required.".to_string(),
                    details: None,
                },
            ),

            FnotifierError::Oauth(OauthError::Flow { code, message }) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code,
                    message,
                    details: None,
                },
            ),

            FnotifierError::SheetsNotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorObject {
                    code: "SHEETS_NOT_READY".to_string(),
                    message: "Spreadsheet client is not authorized yet; retry later.".to_string(),
                    details: None,
                },
            ),

            FnotifierError::AlreadyAuthorized => (
                StatusCode::CONFLICT,
                ApiErrorObject {
                    code: "ALREADY_AUTHORIZED".to_string(),
                    message: "Spreadsheet client is already authorized.".to_string(),
                    details: None,
                },
            ),

            FnotifierError::Config(_)
            | FnotifierError::UpstreamStatus(_)
            | FnotifierError::Telegram(_)
            | FnotifierError::Oauth(_)
            | FnotifierError::ReqwestError(_)
            | FnotifierError::JsonError(_)
            | FnotifierError::IoError(_)
            | FnotifierError::UrlError(_)
            | FnotifierError::UnexpectedError(_)
            | FnotifierError::RactorError(_)
            | FnotifierError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorObject,
}
