use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors raised while fetching a form, building a response and submitting it.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The form could not be downloaded or its structure could not be read.
    Fetch(String),
    /// The answer selection does not fit the form.
    Validation(String),
    /// Run parameters are out of range.
    Config(String),
    /// A single POST failed. Never aborts a run.
    Submission(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Fetch(msg) => write!(f, "Fetch error: {msg}"),
            Error::Validation(msg) => write!(f, "Validation error: {msg}"),
            Error::Config(msg) => write!(f, "Config error: {msg}"),
            Error::Submission(msg) => write!(f, "Submission error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::BadGateway(msg) => write!(f, "Bad Gateway: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::BadGateway(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Fetch(msg) | Error::Submission(msg) => AppError::BadGateway(msg),
            Error::Validation(msg) | Error::Config(msg) => AppError::BadRequest(msg),
        }
    }
}
