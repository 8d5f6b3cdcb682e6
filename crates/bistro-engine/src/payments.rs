//! # Payment Service
//!
//! Mock-provider payments against PLACED orders.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_payment ──► CREATED ──► PENDING   (persisted as PENDING)       │
//! │                                   │                                     │
//! │             confirm_payment ──────┼──────── fail_payment                │
//! │                    │              │               │                     │
//! │                    ▼              │               ▼                     │
//! │                  PAID             │            FAILED                   │
//! │                    │              │        (order untouched; retry      │
//! │                    ▼              │         with a new key)             │
//! │         order PLACED ──► PAID     │                                     │
//! │                                                                         │
//! │  Idempotency: (order_id, key) → the same payment, every time.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bistro_core::validation::validate_idempotency_key;
use bistro_core::{Order, OrderStatus, Payment, PaymentMethod, PaymentStatus};
use bistro_db::{OrderRepository, PaymentRepository};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::ServiceResult;
use crate::require_uuids;

/// Payment creation and settlement.
#[derive(Clone)]
pub struct PaymentService {
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentRepository>,
    config: EngineConfig,
}

impl PaymentService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payments: Arc<dyn PaymentRepository>,
        config: EngineConfig,
    ) -> Self {
        PaymentService {
            orders,
            payments,
            config,
        }
    }

    /// Creates a PENDING payment for a PLACED order.
    ///
    /// A repeated `(order_id, idempotency_key)` returns the payment created
    /// the first time, whatever the order's status is by now. `method`
    /// defaults to MOCK.
    pub async fn create_payment(
        &self,
        order_id: &str,
        user_id: &str,
        method: Option<PaymentMethod>,
        idempotency_key: Option<&str>,
    ) -> ServiceResult<Payment> {
        require_uuids(user_id, &[("order_id", order_id)])?;
        let key = validate_idempotency_key(idempotency_key)?;
        let method = method.unwrap_or_default();

        let mut order = self.orders.get_by_id(order_id).await?;
        order.ensure_owner(user_id)?;

        if let Some(key) = key.as_deref() {
            match self.payments.get_by_order_and_key(&order.id, key).await {
                Ok(existing) => {
                    existing.ensure_owner(user_id)?;
                    debug!(payment_id = %existing.id, key, "Idempotent replay");
                    return Ok(existing);
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        order.recalculate_totals();
        let payment = Payment::for_order(&order, method, self.config.currency.as_str(), key.clone())?;

        match self.payments.create(&payment).await {
            Ok(()) => {
                info!(
                    payment_id = %payment.id,
                    order_id = %order.id,
                    amount = %payment.amount,
                    method = %payment.method,
                    "Payment created"
                );
                Ok(payment)
            }
            Err(e) if e.is_unique_violation() => match key.as_deref() {
                Some(key) => {
                    warn!(order_id = %order.id, key, "Concurrent payment creation, returning the winner");
                    let winner = self.payments.get_by_order_and_key(&order.id, key).await?;
                    winner.ensure_owner(user_id)?;
                    Ok(winner)
                }
                None => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// PENDING → PAID, then the order PLACED → PAID.
    ///
    /// Confirming an already PAID payment returns it unchanged, first
    /// finishing the order cascade if an earlier confirmation stopped
    /// between the two writes.
    pub async fn confirm_payment(&self, payment_id: &str, user_id: &str) -> ServiceResult<Payment> {
        let mut payment = self.load_owned(payment_id, user_id).await?;

        if payment.status == PaymentStatus::Paid {
            let mut order = self.orders.get_by_id(&payment.order_id).await?;
            self.cascade_paid(&mut order).await?;
            debug!(payment_id = %payment.id, "Payment already confirmed");
            return Ok(payment);
        }

        payment.confirm(Utc::now())?;

        let mut order = self.orders.get_by_id(&payment.order_id).await?;
        if order.status != OrderStatus::Paid {
            // Fail before any write if the order cannot follow.
            order.clone().mark_paid()?;
        }

        self.payments.update(&mut payment).await?;
        self.cascade_paid(&mut order).await?;

        info!(payment_id = %payment.id, order_id = %order.id, "Payment confirmed");
        Ok(payment)
    }

    /// PENDING → FAILED. The order stays PLACED so the customer can retry.
    pub async fn fail_payment(
        &self,
        payment_id: &str,
        user_id: &str,
        reason: &str,
    ) -> ServiceResult<Payment> {
        let mut payment = self.load_owned(payment_id, user_id).await?;
        payment.fail(reason)?;
        self.payments.update(&mut payment).await?;

        info!(payment_id = %payment.id, reason = ?payment.failure_reason, "Payment failed");
        Ok(payment)
    }

    pub async fn get_payment(&self, payment_id: &str, user_id: &str) -> ServiceResult<Payment> {
        self.load_owned(payment_id, user_id).await
    }

    /// Every payment of an order, oldest first. Owner only.
    pub async fn list_payments(&self, order_id: &str, user_id: &str) -> ServiceResult<Vec<Payment>> {
        require_uuids(user_id, &[("order_id", order_id)])?;

        let order = self.orders.get_by_id(order_id).await?;
        order.ensure_owner(user_id)?;

        Ok(self.payments.list_by_order(&order.id).await?)
    }

    async fn load_owned(&self, payment_id: &str, user_id: &str) -> ServiceResult<Payment> {
        require_uuids(user_id, &[("payment_id", payment_id)])?;

        let payment = self.payments.get_by_id(payment_id).await?;
        payment.ensure_owner(user_id)?;
        Ok(payment)
    }

    async fn cascade_paid(&self, order: &mut Order) -> ServiceResult<()> {
        if order.status == OrderStatus::Placed {
            order.mark_paid()?;
            self.orders.update(order).await?;
            info!(order_id = %order.id, "Order paid");
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::harness;
    use async_trait::async_trait;
    use bistro_core::ErrorKind;
    use bistro_db::fixtures::*;
    use bistro_db::{DbError, DbResult, MemoryPaymentRepository};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_create_requires_placed_order() {
        let h = harness().await;
        let draft = h.draft().await;
        h.orders
            .add_item(crate::testing::add(&draft.id, COLA_ID, 1))
            .await
            .unwrap();

        let err = h
            .payments
            .create_payment(&draft.id, DEMO_USER_ID, None, Some("k1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.message, "order must be PLACED to create payment");
        assert!(h.payment_store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_defaults_to_mock_and_uses_order_total() {
        let h = harness().await;
        let order = h.placed_order().await;

        let payment = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, None)
            .await
            .unwrap();

        assert_eq!(payment.method, PaymentMethod::Mock);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount.cents(), 4490);
        assert_eq!(payment.currency, "BRL");
        assert_eq!(payment.user_id, DEMO_USER_ID);
    }

    #[tokio::test]
    async fn test_idempotent_replay() {
        let h = harness().await;
        let order = h.placed_order().await;

        let first = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, Some("checkout-1"))
            .await
            .unwrap();
        let replay = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, Some(" checkout-1 "))
            .await
            .unwrap();
        assert_eq!(replay.id, first.id);
        assert_eq!(h.payment_store.len().await, 1);

        // Still replays after the order moved on.
        h.payments.confirm_payment(&first.id, DEMO_USER_ID).await.unwrap();
        let replay = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, Some("checkout-1"))
            .await
            .unwrap();
        assert_eq!(replay.id, first.id);
        assert_eq!(replay.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let h = harness().await;
        let order = h.placed_order().await;

        let err = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, Some(PaymentMethod::Pix), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    /// Hides the first idempotency lookup, as a request that lost the race
    /// would see it.
    struct StaleKeyLookup {
        inner: MemoryPaymentRepository,
        hidden: AtomicBool,
    }

    #[async_trait]
    impl PaymentRepository for StaleKeyLookup {
        async fn create(&self, payment: &Payment) -> DbResult<()> {
            self.inner.create(payment).await
        }
        async fn update(&self, payment: &mut Payment) -> DbResult<()> {
            self.inner.update(payment).await
        }
        async fn get_by_id(&self, id: &str) -> DbResult<Payment> {
            self.inner.get_by_id(id).await
        }
        async fn get_by_order_and_key(&self, order_id: &str, key: &str) -> DbResult<Payment> {
            if self.hidden.swap(false, Ordering::SeqCst) {
                return Err(DbError::not_found("payment", key));
            }
            self.inner.get_by_order_and_key(order_id, key).await
        }
        async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
            self.inner.list_by_order(order_id).await
        }
    }

    #[tokio::test]
    async fn test_lost_idempotency_race_returns_winner() {
        let h = harness().await;
        let order = h.placed_order().await;

        let store = Arc::new(StaleKeyLookup {
            inner: MemoryPaymentRepository::new(),
            hidden: AtomicBool::new(true),
        });
        let winner = Payment::for_order(&order, PaymentMethod::Mock, "BRL", Some("k1".into())).unwrap();
        store.inner.create(&winner).await.unwrap();

        let service = PaymentService::new(h.order_store.clone(), store.clone(), EngineConfig::default());
        let payment = service
            .create_payment(&order.id, DEMO_USER_ID, None, Some("k1"))
            .await
            .unwrap();

        assert_eq!(payment.id, winner.id);
        assert_eq!(store.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_confirm_cascades_to_order() {
        let h = harness().await;
        let order = h.placed_order().await;
        let payment = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, Some("k1"))
            .await
            .unwrap();

        let paid = h.payments.confirm_payment(&payment.id, DEMO_USER_ID).await.unwrap();
        assert_eq!(paid.status, PaymentStatus::Paid);
        assert!(paid.paid_at.is_some());

        let order = h.orders.get_order(&order.id, DEMO_USER_ID).await.unwrap();
        assert_eq!(order.status, OrderStatus::Paid);

        // Confirming again is a no-op.
        let again = h.payments.confirm_payment(&payment.id, DEMO_USER_ID).await.unwrap();
        assert_eq!(again.paid_at, paid.paid_at);
        assert_eq!(again.version, paid.version);
    }

    #[tokio::test]
    async fn test_reconfirm_finishes_interrupted_cascade() {
        let h = harness().await;
        let order = h.placed_order().await;
        let mut payment = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, None)
            .await
            .unwrap();

        // Payment write landed, order write did not.
        payment.confirm(Utc::now()).unwrap();
        h.payment_store.update(&mut payment).await.unwrap();
        assert_eq!(
            h.orders.get_order(&order.id, DEMO_USER_ID).await.unwrap().status,
            OrderStatus::Placed
        );

        h.payments.confirm_payment(&payment.id, DEMO_USER_ID).await.unwrap();
        assert_eq!(
            h.orders.get_order(&order.id, DEMO_USER_ID).await.unwrap().status,
            OrderStatus::Paid
        );
    }

    #[tokio::test]
    async fn test_fail_then_retry_with_new_key() {
        let h = harness().await;
        let order = h.placed_order().await;
        let first = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, Some("attempt-1"))
            .await
            .unwrap();

        let failed = h
            .payments
            .fail_payment(&first.id, DEMO_USER_ID, " card declined ")
            .await
            .unwrap();
        assert_eq!(failed.status, PaymentStatus::Failed);
        assert_eq!(failed.failure_reason.as_deref(), Some("card declined"));
        assert_eq!(
            h.orders.get_order(&order.id, DEMO_USER_ID).await.unwrap().status,
            OrderStatus::Placed
        );

        let err = h.payments.confirm_payment(&first.id, DEMO_USER_ID).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.message, "payment must be PENDING to confirm");

        let err = h
            .payments
            .fail_payment(&first.id, DEMO_USER_ID, "again")
            .await
            .unwrap_err();
        assert_eq!(err.message, "payment must be PENDING to fail");

        let second = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, Some("attempt-2"))
            .await
            .unwrap();
        assert_ne!(second.id, first.id);
        h.payments.confirm_payment(&second.id, DEMO_USER_ID).await.unwrap();

        let listed = h.payments.list_payments(&order.id, DEMO_USER_ID).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_ownership() {
        let h = harness().await;
        let order = h.placed_order().await;
        let payment = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, None)
            .await
            .unwrap();
        let intruder = "5a1c7e00-0000-4000-8000-0000000000bb";

        let err = h
            .payments
            .create_payment(&order.id, intruder, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = h.payments.confirm_payment(&payment.id, intruder).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        let err = h.payments.fail_payment(&payment.id, intruder, "x").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        let err = h.payments.get_payment(&payment.id, intruder).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        let err = h.payments.list_payments(&order.id, intruder).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = h.payments.get_payment(&payment.id, " ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);

        assert_eq!(
            h.payments.get_payment(&payment.id, DEMO_USER_ID).await.unwrap().status,
            PaymentStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_malformed_ids_are_rejected_before_lookup() {
        let h = harness().await;
        let order = h.placed_order().await;
        let payment = h
            .payments
            .create_payment(&order.id, DEMO_USER_ID, None, None)
            .await
            .unwrap();

        let err = h
            .payments
            .create_payment("order-1", DEMO_USER_ID, None, Some("k1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, "order_id has invalid format: must be a valid UUID");

        let err = h.payments.confirm_payment("pay-1", DEMO_USER_ID).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        let err = h.payments.fail_payment(&payment.id, "alice", "x").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        let err = h.payments.list_payments("order-1", DEMO_USER_ID).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        assert_eq!(h.payment_store.len().await, 1);
        assert_eq!(
            h.payments.get_payment(&payment.id, DEMO_USER_ID).await.unwrap().status,
            PaymentStatus::Pending
        );
    }
}
