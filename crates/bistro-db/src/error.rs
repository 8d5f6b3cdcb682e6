//! # Storage Errors
//!
//! One error type for both adapter families. The engine only branches on
//! three of them:
//!
//! ```text
//! NotFound         → caller asked for something that is not there
//! UniqueViolation  → lost a draft or idempotency race, re-read the winner
//! VersionConflict  → the aggregate moved on since it was read
//! ```
//!
//! Everything else is an operational failure and surfaces as Internal.

use bistro_core::ErrorKind;
use sqlx::error::ErrorKind as SqlxErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Raised by the partial unique indexes: one CREATED order per
    /// (user, store), one payment per (order, idempotency key).
    #[error("{field} already exists: '{value}'")]
    UniqueViolation { field: String, value: String },

    /// The stored `version` no longer matches the one that was read.
    #[error("{entity} was modified concurrently")]
    VersionConflict { entity: String, id: String },

    /// A payment for an unknown order, a catalog row with a missing parent.
    #[error("dangling reference: {0}")]
    ForeignKey(String),

    /// Pool closed or timed out waiting for a connection.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("migration failed: {0}")]
    Migration(String),

    /// The `items_json` column did not round-trip.
    #[error("corrupt order lines: {0}")]
    Corrupt(String),

    #[error("query failed: {0}")]
    Query(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn version_conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::VersionConflict {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. } | DbError::VersionConflict { .. } => {
                ErrorKind::Conflict
            }
            _ => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("row", "unknown"),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                // SQLite reports "UNIQUE constraint failed: orders.user_id, orders.store_id"
                SqlxErrorKind::UniqueViolation => DbError::UniqueViolation {
                    field: db_err
                        .message()
                        .split_once(": ")
                        .map_or("unknown", |(_, columns)| columns)
                        .to_string(),
                    value: "unknown".to_string(),
                },
                SqlxErrorKind::ForeignKeyViolation => DbError::ForeignKey(db_err.message().to_string()),
                _ => DbError::Query(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DbError::Unavailable(err.to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Corrupt(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_races_and_absence_are_typed() {
        assert_eq!(DbError::not_found("order", "o-1").kind(), ErrorKind::NotFound);
        assert_eq!(DbError::duplicate("active draft", "u/s").kind(), ErrorKind::Conflict);
        assert_eq!(DbError::version_conflict("order", "o-1").kind(), ErrorKind::Conflict);
        assert_eq!(DbError::ForeignKey("payments.order_id".into()).kind(), ErrorKind::Internal);
        assert_eq!(DbError::Unavailable("pool closed".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DbError::version_conflict("order", "o-1").to_string(),
            "order was modified concurrently"
        );
        assert_eq!(
            DbError::not_found("payment", "p-1").to_string(),
            "payment not found: p-1"
        );
    }

    #[test]
    fn test_pool_errors_are_unavailable() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::Unavailable(_)));
    }

    #[test]
    fn test_bad_lines_column_is_corrupt() {
        let err: DbError = serde_json::from_str::<Vec<i64>>("not json").unwrap_err().into();
        assert!(matches!(err, DbError::Corrupt(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
