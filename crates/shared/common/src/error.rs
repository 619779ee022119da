//! Unified error handling for HTTP and gRPC.
//!
//! Provides a single error envelope that can be converted to:
//! - Axum HTTP responses (REST adapter)
//! - Tonic gRPC status codes (RPC adapter)
//!
//! Both conversions classify errors the same way: not found, caller error,
//! or internal failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tonic::Status;
use uuid::Uuid;

/// Stable code for a missing entity
pub const CODE_NOT_FOUND: &str = "US-000404";
/// Stable code for invalid caller input
pub const CODE_BAD_REQUEST: &str = "US-000400";
/// Stable code for internal failures
pub const CODE_SYSTEM: &str = "US-000418";

/// Message for a request that names no user
pub const EMPTY_USER_ID: &str = "user uuid must not be empty";

const NOT_FOUND_MESSAGE: &str = "not found";
const BAD_REQUEST_DEVELOPER_MESSAGE: &str = "something wrong with user data";
const SYSTEM_MESSAGE: &str = "internal system error";
const SYSTEM_DEVELOPER_MESSAGE: &str = "something wrong with application logic";

/// Application error types with support for both HTTP and gRPC.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("not found")]
    NotFound,

    // Caller errors
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("failed to {operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("{0}")]
    Internal(String),
}

/// Transport-independent classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    System,
}

/// Error response body for HTTP
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error envelope carried inside [`ErrorResponse`].
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    /// Stable error code
    pub code: String,
    /// Message safe to show to end users
    pub message: String,
    /// Diagnostic hint for API consumers
    pub developer_message: String,
}

impl AppError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound => ErrorKind::NotFound,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorKind::BadRequest,
            _ => ErrorKind::System,
        }
    }

    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => CODE_NOT_FOUND,
            ErrorKind::BadRequest => CODE_BAD_REQUEST,
            ErrorKind::System => CODE_SYSTEM,
        }
    }

    /// Get HTTP status code.
    ///
    /// Internal failures use 418 so that logic errors stand apart from
    /// ordinary 500s emitted by the server stack itself.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::System => StatusCode::IM_A_TEAPOT,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::NotFound => NOT_FOUND_MESSAGE.to_string(),
            _ => SYSTEM_MESSAGE.to_string(),
        }
    }

    /// Get the diagnostic message that accompanies the user message.
    pub fn developer_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => NOT_FOUND_MESSAGE,
            ErrorKind::BadRequest => BAD_REQUEST_DEVELOPER_MESSAGE,
            ErrorKind::System => SYSTEM_DEVELOPER_MESSAGE,
        }
    }

    /// Attach the failed operation to an internal error.
    ///
    /// Not-found and caller errors pass through unchanged so adapters can
    /// map them precisely; everything else is wrapped with its cause kept
    /// as the error source.
    pub fn context(self, operation: &'static str) -> Self {
        match self.kind() {
            ErrorKind::NotFound | ErrorKind::BadRequest => self,
            ErrorKind::System => AppError::Operation {
                operation,
                source: Box::new(self),
            },
        }
    }

    /// Write internal failures to the log before they are hidden from the caller.
    fn log_if_internal(&self) {
        if self.kind() == ErrorKind::System {
            tracing::error!(error = %self, "Internal error");
        }
    }

    fn envelope(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
                developer_message: self.developer_message().to_string(),
            },
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log_if_internal();
        (self.status(), Json(self.envelope())).into_response()
    }
}

// =============================================================================
// gRPC Status (Tonic)
// =============================================================================

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        err.log_if_internal();
        let code = match err.kind() {
            ErrorKind::NotFound => tonic::Code::NotFound,
            ErrorKind::BadRequest => tonic::Code::InvalidArgument,
            ErrorKind::System => tonic::Code::Internal,
        };

        Status::new(code, err.user_message())
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Password(msg) => AppError::BadRequest(msg),
            DomainError::Hashing(msg) => AppError::Internal(format!("password hashing failed: {}", msg)),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Parse a user identifier received on the wire.
///
/// Empty or malformed identifiers are caller errors on every transport.
pub fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    if raw.is_empty() {
        return Err(AppError::validation(EMPTY_USER_ID));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::validation("invalid user uuid"))
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
