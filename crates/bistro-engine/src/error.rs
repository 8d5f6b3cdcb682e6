//! # Service Errors
//!
//! Every use case returns [`ServiceError`]: a serialisable
//! `(kind, message)` pair a transport layer can map onto its own status
//! codes.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError ─┐                                                     │
//! │  CoreError ───────┼──► ServiceError { kind, message }                  │
//! │  DbError ─────────┘         │                                           │
//! │                             ├── INVALID_ARGUMENT / NOT_FOUND / CONFLICT │
//! │                             ├── UNAUTHORIZED / FORBIDDEN                │
//! │                             └── INTERNAL  (logged, generic message)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bistro_core::{CoreError, ErrorKind, ValidationError};
use bistro_db::DbError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error returned by every engine operation.
///
/// ## Serialised Shape
/// ```json
/// { "kind": "CONFLICT", "message": "order is not editable" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("[{kind}] {message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ServiceError {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorKind::Conflict, message)
    }

    pub fn internal() -> Self {
        ServiceError::new(ErrorKind::Internal, "internal error")
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        ServiceError::new(err.kind(), err.to_string())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::invalid(err.to_string())
    }
}

/// Storage errors. Typed outcomes keep their kind; anything else is logged
/// here and replaced by a generic message.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ServiceError::not_found(format!("{entity} not found")),
            DbError::UniqueViolation { .. } | DbError::VersionConflict { .. } => {
                ServiceError::conflict(err.to_string())
            }
            other => {
                error!(error = %other, "Storage failure");
                ServiceError::internal()
            }
        }
    }
}

/// Result type for engine operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
