//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. Every failure path in the credential and session-token flows is
//! an explicit `Result` branch carrying one of these variants; nothing is
//! signalled by panicking or by out-of-band control transfer.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can bubble
//! errors with `?` and still produce the uniform JSON envelope
//! `{"statusCode": .., "message": .., "data": null}`. `From` implementations
//! cover `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError`.

use actix_web::{
    error::{JsonPayloadError, ResponseError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed input, including empty required fields (HTTP 400).
    BadRequest(String),
    /// Authentication failure: bad password, or a missing/malformed/expired/
    /// stale token (HTTP 401).
    Unauthorized(String),
    /// A requested resource or login identifier does not resolve (HTTP 404).
    NotFound(String),
    /// A uniqueness constraint was violated, e.g. duplicate username or email
    /// at registration (HTTP 409).
    Conflict(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Error originating from the persistence layer (HTTP 500).
    DatabaseError(String),
    /// Failed input validation from the `validator` derives (HTTP 400).
    ValidationError(String),
}

impl AppError {
    /// Numeric status code used in the response envelope.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg)
            | AppError::ValidationError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into the uniform JSON error envelope.
///
/// No internal detail beyond the variant's message reaches the client; database
/// errors in particular are reported with a generic message.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let message = match self {
            AppError::DatabaseError(_) => "Internal server error",
            _ => self.message(),
        };
        HttpResponse::build(status).json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "data": null
        }))
    }
}

/// Error handler for `web::JsonConfig`.
///
/// A body missing a required field is answered exactly like one where the
/// field is present but blank: 400 with the uniform envelope. Without this,
/// the Json extractor replies with a plain-text serde message that leaks the
/// parse position.
pub fn json_error_handler(_err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest("All fields are required".into()).into()
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Unique-constraint violations become `Conflict`, `RowNotFound` becomes
/// `NotFound`, everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("User already exists".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT processing failures (malformed, bad signature, expired) all surface as
/// `Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        let response = error.error_response();
        assert_eq!(response.status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        let response = error.error_response();
        assert_eq!(response.status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        let response = error.error_response();
        assert_eq!(response.status(), 404);

        let error = AppError::Conflict("User already exists".into());
        let response = error.error_response();
        assert_eq!(response.status(), 409);

        let error = AppError::InternalServerError("Server error".into());
        let response = error.error_response();
        assert_eq!(response.status(), 500);

        // Validation failures map to 400, matching the wire contract for
        // missing/empty fields.
        let error = AppError::ValidationError("username: too short".into());
        let response = error.error_response();
        assert_eq!(response.status(), 400);
    }

    #[test]
    fn test_json_error_handler_uses_envelope() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let err = json_error_handler(JsonPayloadError::ContentType, &req);

        let response = err.error_response();
        assert_eq!(response.status(), 400);
    }
}
