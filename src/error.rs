//! Error types for storage, service and HTTP layers.
//!
//! - [`StorageError`] is returned by every [`crate::domain::repositories::UrlRepository`]
//!   implementation.
//! - [`ServiceError`] is returned by [`crate::application::services::UrlService`] and wraps
//!   storage failures with the context of the operation that failed.
//! - [`AppError`] is the HTTP-facing error rendered as a JSON body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Errors produced by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend has no connection to check (memory and file storage).
    ///
    /// Callers treat this as "nothing to ping" rather than as an outage.
    #[error("{backend} storage does not support database connection check")]
    PingNotSupported { backend: &'static str },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("file storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Returns true for the well-known "no database to check" ping result.
    pub fn is_ping_not_supported(&self) -> bool {
        matches!(self, Self::PingNotSupported { .. })
    }
}

/// Errors produced by the shortening service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("error finding URL {url}: {source}")]
    Lookup {
        url: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to generate short ID: check the configured ID length")]
    Generation,

    #[error("no free short ID found after {attempts} attempts")]
    IdsExhausted { attempts: usize },

    #[error("error saving URL {url} as {short_id}: {source}")]
    Persist {
        short_id: String,
        url: String,
        #[source]
        source: StorageError,
    },

    #[error("error saving batch of {count} URLs: {source}")]
    PersistBatch {
        count: usize,
        #[source]
        source: StorageError,
    },

    #[error("error fetching URLs for user {user_id}: {source}")]
    Fetch {
        user_id: String,
        #[source]
        source: StorageError,
    },

    #[error("delete pipeline stopped before dispatching all IDs")]
    DeletePipeline,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error description embedded in JSON error bodies.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    Gone { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, &String, &Value) {
        match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::Unauthorized { message, details } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", message, details)
            }
            AppError::Gone { message, details } => (StatusCode::GONE, "gone", message, details),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code, message, details) = self.parts();
        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        tracing::error!(error = %e, "service error");

        match e {
            ServiceError::Generation => {
                AppError::internal("Failed to generate short ID", json!({}))
            }
            ServiceError::IdsExhausted { attempts } => AppError::internal(
                "Failed to generate short ID",
                json!({ "attempts": attempts }),
            ),
            _ => AppError::internal("Storage error", json!({})),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!({ "reason": e.to_string() }))
    }
}
