//! Application error type and its HTTP mapping.
//!
//! Every fallible operation in the service and repository layers returns
//! [`AppError`]. Handlers return it directly and axum renders it through
//! [`IntoResponse`] as:
//!
//! ```json
//! { "error": { "code": "invalid_url", "message": "Invalid URL", "details": {} } }
//! ```
//!
//! Store failures never leak driver text to the client; the underlying
//! error is logged server-side instead.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::db_error::is_unique_violation_on_code;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Target URL is malformed, missing or not `http`/`https`.
    #[error("{message}")]
    InvalidUrl { message: String, details: Value },

    /// Short code does not match the 6-8 alphanumeric pattern, or is reserved.
    #[error("{message}")]
    InvalidCodeFormat { message: String, details: Value },

    /// Short code is already taken.
    #[error("{message}")]
    CodeConflict { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Malformed request body or query string.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Persistence failed or timed out.
    ///
    /// `not_sent` is set only when the statement never reached the
    /// database, so repeating it cannot apply it twice.
    #[error("{message}")]
    StoreUnavailable {
        message: String,
        details: Value,
        not_sent: bool,
    },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn invalid_url(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidUrl {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_code_format(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidCodeFormat {
            message: message.into(),
            details,
        }
    }

    pub fn code_conflict(message: impl Into<String>, details: Value) -> Self {
        Self::CodeConflict {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
            not_sent: false,
        }
    }

    /// A store failure that happened before the statement was sent, such as
    /// waiting too long for a pooled connection.
    pub fn store_not_reached(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
            not_sent: true,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns true for failures of the link store itself.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::StoreUnavailable { .. })
    }

    /// Returns true when the failed operation is known not to have been
    /// applied, so it is safe to run again.
    pub fn is_safe_to_retry(&self) -> bool {
        matches!(self, AppError::StoreUnavailable { not_sent: true, .. })
    }

    /// HTTP status this error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl { .. }
            | AppError::InvalidCodeFormat { .. }
            | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::CodeConflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::InvalidUrl { message, details } => ("invalid_url", message, details),
            AppError::InvalidCodeFormat { message, details } => {
                ("invalid_code_format", message, details)
            }
            AppError::CodeConflict { message, details } => ("code_conflict", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Validation { message, details } => ("invalid_request", message, details),
            AppError::StoreUnavailable { message, details, .. } => {
                ("store_unavailable", message, details)
            }
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation_on_code(&e) {
            return AppError::code_conflict("Code already exists", json!({}));
        }

        match e {
            sqlx::Error::RowNotFound
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => {
                tracing::error!(error = %e, "Unexpected link store result");
                AppError::internal("Internal server error", json!({}))
            }
            sqlx::Error::PoolTimedOut => {
                tracing::error!(error = %e, "No link store connection available");
                AppError::store_not_reached("Storage temporarily unavailable", json!({}))
            }
            _ => {
                tracing::error!(error = %e, "Link store error");
                AppError::store_unavailable("Storage temporarily unavailable", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = e.field_errors().keys().map(|k| k.to_string()).collect();
        AppError::bad_request("Invalid request parameters", json!({ "fields": fields }))
    }
}
