use std::collections::HashMap;

use async_trait::async_trait;
use bistro_core::Payment;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::PaymentRepository;

#[derive(Default)]
struct PaymentState {
    payments: HashMap<String, Payment>,
    /// (order_id, idempotency_key) → payment id.
    by_order_key: HashMap<(String, String), String>,
}

/// Payment storage in a map, with an idempotency-key index.
#[derive(Default)]
pub struct MemoryPaymentRepository {
    state: RwLock<PaymentState>,
}

impl MemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.payments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn create(&self, payment: &Payment) -> DbResult<()> {
        let mut state = self.state.write().await;

        if state.payments.contains_key(&payment.id) {
            return Err(DbError::duplicate("payment id", payment.id.clone()));
        }
        if let Some(key) = &payment.idempotency_key {
            let index_key = (payment.order_id.clone(), key.clone());
            if state.by_order_key.contains_key(&index_key) {
                return Err(DbError::duplicate("payment idempotency key", key.clone()));
            }
            state.by_order_key.insert(index_key, payment.id.clone());
        }

        debug!(payment_id = %payment.id, order_id = %payment.order_id, "Created payment");
        state.payments.insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &mut Payment) -> DbResult<()> {
        let mut state = self.state.write().await;

        let stored = state
            .payments
            .get(&payment.id)
            .ok_or_else(|| DbError::not_found("payment", payment.id.clone()))?;
        if stored.version != payment.version {
            return Err(DbError::version_conflict("payment", payment.id.clone()));
        }

        payment.version += 1;
        payment.updated_at = Utc::now();
        state.payments.insert(payment.id.clone(), payment.clone());

        debug!(payment_id = %payment.id, status = %payment.status, "Updated payment");
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Payment> {
        self.state
            .read()
            .await
            .payments
            .get(id)
            .cloned()
            .ok_or_else(|| DbError::not_found("payment", id))
    }

    async fn get_by_order_and_key(&self, order_id: &str, key: &str) -> DbResult<Payment> {
        let state = self.state.read().await;
        let index_key = (order_id.to_string(), key.to_string());

        state
            .by_order_key
            .get(&index_key)
            .and_then(|id| state.payments.get(id))
            .cloned()
            .ok_or_else(|| DbError::not_found("payment", format!("{order_id}/{key}")))
    }

    async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(payments)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
