//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every store, service and handler reports failures through it, so the mapping from
//! failure kind to HTTP status lives in exactly one place.
//!
//! `AppError` implements `actix_web::error::ResponseError`, turning application errors
//! into JSON bodies of the form `{"error": "<message>"}`. Storage and internal failures
//! are logged with their detail and answered with a generic message.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors` and
//! `jsonwebtoken::errors::Error` allow use of the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned to clients for any failure whose detail must stay server-side.
pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or incomplete client input (HTTP 400).
    BadRequest(String),
    /// Missing, invalid or expired credentials or token (HTTP 401).
    Unauthorized(String),
    /// Entity absent, or not owned by the caller (HTTP 404).
    NotFound(String),
    /// Attempt to create something that must be unique, such as a username (HTTP 400).
    AlreadyExists(String),
    /// Database or connectivity failure (HTTP 500).
    /// The detail is logged but never sent to the client.
    StorageError(String),
    /// Any other unexpected server-side failure (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::AlreadyExists(msg) => write!(f, "Already Exists: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StorageError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg) => msg.as_str(),
            AppError::StorageError(detail) | AppError::InternalServerError(detail) => {
                log::error!("{}: {}", self.status_code(), detail);
                GENERIC_INTERNAL_MESSAGE
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` becomes `AppError::NotFound`; every other database
/// error becomes `AppError::StorageError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::StorageError(error.to_string()),
        }
    }
}

/// Failed payload validation is a plain client error.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::BadRequest(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(error: AppError) -> serde_json::Value {
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(AppError::BadRequest("x".into()).error_response().status(), 400);
        assert_eq!(AppError::Unauthorized("x".into()).error_response().status(), 401);
        assert_eq!(AppError::NotFound("x".into()).error_response().status(), 404);
        assert_eq!(AppError::AlreadyExists("x".into()).error_response().status(), 400);
        assert_eq!(AppError::StorageError("x".into()).error_response().status(), 500);
        assert_eq!(
            AppError::InternalServerError("x".into()).error_response().status(),
            500
        );
    }

    #[actix_rt::test]
    async fn test_client_errors_carry_their_message() {
        let json = body_json(AppError::NotFound("Task not found".into())).await;
        assert_eq!(json["error"], "Task not found");
    }

    #[actix_rt::test]
    async fn test_storage_detail_is_not_leaked() {
        let json = body_json(AppError::StorageError(
            "connection refused at 10.0.0.5:5432".into(),
        ))
        .await;
        assert_eq!(json["error"], GENERIC_INTERNAL_MESSAGE);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::PoolTimedOut),
            AppError::StorageError(_)
        ));
    }
}
