//! # Payments
//!
//! A payment is issued against a PLACED order for exactly its total. Only
//! the mock provider is wired up.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   CREATED ──► PENDING ──confirm()──► PAID    (order PLACED → PAID)      │
//! │      │           │                                                      │
//! │      │           ├──fail()─────────► FAILED  (order untouched;          │
//! │      │           │                            retry with a new key)     │
//! │      └───────────┴─────────────────► CANCELED                          │
//! │                                                                         │
//! │   A payment is persisted already PENDING.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::{Order, OrderStatus};

// =============================================================================
// Payment Method & Provider
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Pix,
    #[default]
    Mock,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Mock => "MOCK",
        }
    }

    /// Whether a provider exists that can settle this method.
    pub const fn is_executable(&self) -> bool {
        matches!(self, PaymentMethod::Mock)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentProvider {
    #[default]
    Mock,
}

// =============================================================================
// Payment Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Created,
    Pending,
    Paid,
    Failed,
    Canceled,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "CREATED",
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Canceled => "CANCELED",
        }
    }

    pub const fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Created, PaymentStatus::Pending)
                | (PaymentStatus::Created, PaymentStatus::Canceled)
                | (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Pending, PaymentStatus::Canceled)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    pub store_id: String,
    pub method: PaymentMethod,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    /// Mirrors the order total at creation time.
    pub amount: Money,
    pub currency: String,
    /// Unique per order when present.
    pub idempotency_key: Option<String>,
    pub failure_reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl Payment {
    /// Issues a PENDING payment for a placed order.
    ///
    /// The caller is expected to have just run `order.recalculate_totals()`;
    /// the amount is copied from `order.total` as-is.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout ──► place_order ──► create_payment ← THIS FUNCTION
    ///                                   │
    ///                                   ├── method not MOCK?   → InvalidArgument
    ///                                   ├── order not PLACED?  → Conflict
    ///                                   ├── no items?          → InvalidArgument
    ///                                   └── PENDING, amount = order.total
    /// ```
    pub fn for_order(
        order: &Order,
        method: PaymentMethod,
        currency: impl Into<String>,
        idempotency_key: Option<String>,
    ) -> CoreResult<Self> {
        if !method.is_executable() {
            return Err(CoreError::UnsupportedPaymentMethod { method });
        }
        if order.status != OrderStatus::Placed {
            return Err(CoreError::PaymentRequiresPlacedOrder {
                order_id: order.id.clone(),
                status: order.status,
            });
        }
        if order.items.is_empty() {
            return Err(CoreError::EmptyOrder {
                order_id: order.id.clone(),
            });
        }

        let now = Utc::now();
        let mut payment = Self {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            store_id: order.store_id.clone(),
            method,
            provider: PaymentProvider::Mock,
            status: PaymentStatus::Created,
            amount: order.total,
            currency: currency.into(),
            idempotency_key,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
            version: 0,
        };
        payment.transition(PaymentStatus::Pending)?;
        Ok(payment)
    }

    pub fn ensure_owner(&self, user_id: &str) -> CoreResult<()> {
        if self.user_id != user_id {
            return Err(CoreError::PaymentNotOwned {
                payment_id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// PENDING → PAID, stamping `paid_at`.
    pub fn confirm(&mut self, at: DateTime<Utc>) -> CoreResult<()> {
        self.require_pending("confirm")?;
        self.transition(PaymentStatus::Paid)?;
        self.paid_at = Some(at);
        Ok(())
    }

    /// PENDING → FAILED, keeping the provider's reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> CoreResult<()> {
        self.require_pending("fail")?;
        self.transition(PaymentStatus::Failed)?;
        let reason = reason.into();
        self.failure_reason = (!reason.trim().is_empty()).then(|| reason.trim().to_string());
        Ok(())
    }

    fn require_pending(&self, action: &'static str) -> CoreResult<()> {
        if self.status != PaymentStatus::Pending {
            return Err(CoreError::PaymentNotPending {
                payment_id: self.id.clone(),
                action,
                status: self.status,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: PaymentStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidPaymentTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
