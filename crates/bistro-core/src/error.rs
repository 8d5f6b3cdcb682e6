//! # Error Types
//!
//! Domain-specific error types for bistro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bistro-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input shape failures                           │
//! │  └── ErrorKind        - The six kinds every error collapses to         │
//! │                                                                         │
//! │  bistro-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  bistro-engine errors                                                  │
//! │  └── ServiceError     - (kind, message) pair handed to callers         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                           DbError ──┴─► ServiceError → Caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Messages are the exact text callers see; no prefixes
//! 3. Every variant maps to exactly one [`ErrorKind`]

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

use crate::order::OrderStatus;
use crate::payment::{PaymentMethod, PaymentStatus};
use crate::selection::GroupKind;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse error classification shared by every layer.
///
/// Transport adapters map these to their own codes (HTTP status, gRPC code,
/// exit code); nothing below the engine knows about transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    InvalidArgument,
    /// Referenced entity does not exist.
    NotFound,
    /// Entity is in a state that forbids the operation, or a uniqueness race.
    Conflict,
    /// No caller identity.
    Unauthorized,
    /// Caller identity does not own the entity.
    Forbidden,
    /// Anything else. Details are logged, never returned.
    Internal,
}

impl ErrorKind {
    /// Stable wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input shape failure (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The call carried no user identity.
    #[error("missing user")]
    MissingUser,

    #[error("order does not belong to user")]
    OrderNotOwned { order_id: String },

    #[error("payment does not belong to user")]
    PaymentNotOwned { payment_id: String },

    /// Add/update/remove attempted on an order that left CREATED.
    ///
    /// ## User Workflow
    /// ```text
    /// Customer places order ──► status PLACED
    ///      │
    ///      ▼
    /// Stale tab sends "add item"
    ///      │
    ///      ▼
    /// OrderNotEditable { status: PLACED } → Conflict
    /// ```
    #[error("order is not editable")]
    OrderNotEditable { order_id: String, status: OrderStatus },

    #[error("order cannot be placed")]
    OrderNotPlaceable { order_id: String, status: OrderStatus },

    #[error("order has no items")]
    EmptyOrder { order_id: String },

    #[error("order cannot move from {from} to {to}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },

    /// `line_id` is the order line id, not the catalog item id.
    #[error("order item not found")]
    LineNotFound { order_id: String, line_id: String },

    #[error("quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    #[error("item is inactive")]
    ItemInactive { item_id: String },

    /// The option, or the group it belongs to, is switched off.
    #[error("option is inactive")]
    OptionInactive { kind: GroupKind, option_id: String },

    /// The option resolves to a group of some other item.
    #[error("{kind} option not allowed for item")]
    OptionNotAllowed {
        kind: GroupKind,
        option_id: String,
        item_id: String,
    },

    #[error("missing required {kind} selection")]
    MissingRequiredSelection { kind: GroupKind, group_id: String },

    #[error("{kind} selection below minimum")]
    SelectionBelowMinimum {
        kind: GroupKind,
        group_id: String,
        min: i64,
        selected: usize,
    },

    #[error("{kind} selection above maximum")]
    SelectionAboveMaximum {
        kind: GroupKind,
        group_id: String,
        max: i64,
        selected: usize,
    },

    #[error("order must be PLACED to create payment")]
    PaymentRequiresPlacedOrder { order_id: String, status: OrderStatus },

    #[error("payment must be PENDING to {action}")]
    PaymentNotPending {
        payment_id: String,
        action: &'static str,
        status: PaymentStatus,
    },

    #[error("payment cannot move from {from} to {to}")]
    InvalidPaymentTransition { from: PaymentStatus, to: PaymentStatus },

    #[error("payment method {method} is not supported")]
    UnsupportedPaymentMethod { method: PaymentMethod },
}

impl CoreError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_)
            | CoreError::EmptyOrder { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::OptionNotAllowed { .. }
            | CoreError::MissingRequiredSelection { .. }
            | CoreError::SelectionBelowMinimum { .. }
            | CoreError::SelectionAboveMaximum { .. }
            | CoreError::UnsupportedPaymentMethod { .. } => ErrorKind::InvalidArgument,

            CoreError::MissingUser => ErrorKind::Unauthorized,

            CoreError::OrderNotOwned { .. } | CoreError::PaymentNotOwned { .. } => {
                ErrorKind::Forbidden
            }

            CoreError::LineNotFound { .. } => ErrorKind::NotFound,

            CoreError::OrderNotEditable { .. }
            | CoreError::OrderNotPlaceable { .. }
            | CoreError::InvalidOrderTransition { .. }
            | CoreError::ItemInactive { .. }
            | CoreError::OptionInactive { .. }
            | CoreError::PaymentRequiresPlacedOrder { .. }
            | CoreError::PaymentNotPending { .. }
            | CoreError::InvalidPaymentTransition { .. } => ErrorKind::Conflict,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These fire before any repository is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::OrderNotEditable {
            order_id: "o-1".to_string(),
            status: OrderStatus::Placed,
        };
        assert_eq!(err.to_string(), "order is not editable");

        let err = CoreError::SelectionAboveMaximum {
            kind: GroupKind::Addon,
            group_id: "g-1".to_string(),
            max: 2,
            selected: 3,
        };
        assert_eq!(err.to_string(), "addon selection above maximum");

        let err = CoreError::PaymentNotPending {
            payment_id: "p-1".to_string(),
            action: "confirm",
            status: PaymentStatus::Failed,
        };
        assert_eq!(err.to_string(), "payment must be PENDING to confirm");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CoreError::MissingUser.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            CoreError::OrderNotOwned {
                order_id: "o".into()
            }
            .kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            CoreError::EmptyOrder {
                order_id: "o".into()
            }
            .kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            CoreError::LineNotFound {
                order_id: "o".into(),
                line_id: "l".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CoreError::OptionInactive {
                kind: GroupKind::Variant,
                option_id: "v".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "order_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(core_err.to_string(), "order_id is required");
    }

    #[test]
    fn test_error_kind_wire_names() {
        assert_eq!(ErrorKind::InvalidArgument.to_string(), "INVALID_ARGUMENT");
        assert_eq!(
            serde_json::to_string(&ErrorKind::NotFound).unwrap(),
            "\"NOT_FOUND\""
        );
    }
}
