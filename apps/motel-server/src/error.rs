//! # API Errors
//!
//! What callers of the HTTP API see when something goes wrong.
//!
//! ## Mapping
//! ```text
//! ┌────────────────────────┬────────┬──────────────────────┐
//! │ ErrorKind              │ HTTP   │ code                 │
//! ├────────────────────────┼────────┼──────────────────────┤
//! │ Validation             │ 400    │ VALIDATION_ERROR     │
//! │ NotFound               │ 404    │ NOT_FOUND            │
//! │ Conflict               │ 409    │ CONFLICT             │
//! │ Dependency             │ 502    │ DEPENDENCY_ERROR     │
//! │ (infrastructure)       │ 500    │ DATABASE_ERROR       │
//! └────────────────────────┴────────┴──────────────────────┘
//! ```
//!
//! Body: `{ "code": "...", "message": "..." }`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use motel_core::error::ErrorKind;
use motel_core::{CoreError, ValidationError};
use motel_db::DbError;

use crate::services::report::ReportError;
use crate::services::ServiceError;

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Conflict,
    DependencyError,
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DependencyError => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::Dependency => ErrorCode::DependencyError,
        }
    }
}

/// API error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DependencyError, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err.kind() {
            Some(kind) => ApiError::new(kind.into(), err.to_string()),
            None => {
                // Details stay in the log; the caller gets a generic message.
                error!(error = %err, "Database error");
                ApiError::new(ErrorCode::DatabaseError, "Database error")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::new(err.kind().into(), err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::dependency(err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Db(err) => err.into(),
            ServiceError::Report(err) => err.into(),
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use motel_core::RoomStatus;

    #[test]
    fn test_code_serialization() {
        let err = ApiError::new(ErrorCode::DependencyError, "smtp down");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"DEPENDENCY_ERROR","message":"smtp down"}"#);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::Domain(CoreError::NoOpenTill).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = DbError::Domain(CoreError::TillAlreadyClosed(4)).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = DbError::Domain(CoreError::InvalidTransition {
            room_number: 1,
            from: RoomStatus::Dirty,
            to: RoomStatus::Occupied,
        })
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::UniqueViolation {
            field: "is_closed".to_string(),
            value: "0".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_infrastructure_errors_are_opaque() {
        let err: ApiError = DbError::QueryFailed("disk I/O error at page 7".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("page 7"));
    }

    #[test]
    fn test_validation_mapping() {
        let err: ApiError = ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "amount must be positive");
    }
}
