//! # API Error Type
//!
//! Every handler returns `ApiResult<T>`. Failures from the lower layers are
//! converted here and rendered as JSON.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError ─► CoreError ─► DbError ─► ApiError ─► HTTP response   │
//! │                                                                         │
//! │  VALIDATION_ERROR   400   bad input, nothing changed                   │
//! │  UNAUTHORIZED       401   missing, invalid, expired or revoked session │
//! │  FORBIDDEN          403   not an administrator                         │
//! │  NOT_FOUND          404   medicine, employee or cart line              │
//! │  CONFLICT           409   duplicate username, medicine still in use    │
//! │  INSUFFICIENT_STOCK 409   cart add exceeds stock                       │
//! │  CHECKOUT_ABORTED   409   commit rolled back, names the failing line   │
//! │  INTERNAL_ERROR     500   store failure (details only in the log)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! { "error": "Medicine not found: 42", "code": "NOT_FOUND" }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use medicare_core::{CoreError, ValidationError};
use medicare_db::DbError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InsufficientStock,
    CheckoutAborted,
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict | ErrorCode::InsufficientStock | ErrorCode::CheckoutAborted => {
                StatusCode::CONFLICT
            }
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An error on its way to the client.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Structured context, e.g. the failing line of an aborted checkout.
    pub details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// The client only ever sees a generic message.
    pub fn internal() -> Self {
        ApiError::new(ErrorCode::InternalError, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
            details: self.details.as_ref(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                warn!(%message, "Foreign key violation");
                ApiError::conflict("Record is referenced by recorded sales")
            }
            DbError::CheckViolation { message } => {
                warn!(%message, "Check constraint violation");
                ApiError::validation("Value violates a store constraint")
            }
            DbError::Domain(core) => ApiError::from(core),
            DbError::ConnectionFailed(e)
            | DbError::MigrationFailed(e)
            | DbError::QueryFailed(e)
            | DbError::TransactionFailed(e)
            | DbError::Internal(e) => {
                error!(error = %e, "Database operation failed");
                ApiError::internal()
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::internal()
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MedicineNotFound(id) => ApiError::not_found("Medicine", id),
            CoreError::CartLineNotFound { index } => ApiError::not_found("Cart line", index),
            CoreError::InsufficientStock {
                ref medicine,
                available,
                requested,
            } => ApiError::new(ErrorCode::InsufficientStock, err.to_string()).with_details(json!({
                "medicine": medicine,
                "available": available,
                "requested": requested,
            })),
            CoreError::CheckoutAborted {
                line_index,
                medicine_id,
                available,
                requested,
            } => ApiError::new(ErrorCode::CheckoutAborted, err.to_string()).with_details(json!({
                "lineIndex": line_index,
                "medicineId": medicine_id,
                "available": available,
                "requested": requested,
            })),
            CoreError::AmountOverflow { .. } | CoreError::EmptyCart => {
                ApiError::validation(err.to_string())
            }
            CoreError::LastAdministrator => ApiError::conflict(err.to_string()),
            CoreError::Validation(e) => ApiError::from(e),
            CoreError::PasswordHash(e) => {
                error!(error = %e, "Password hashing failed");
                ApiError::internal()
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}
