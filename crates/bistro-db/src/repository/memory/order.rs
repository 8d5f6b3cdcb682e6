use std::collections::HashMap;

use async_trait::async_trait;
use bistro_core::{Order, OrderStatus};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::OrderRepository;

type DraftKey = (String, String);

#[derive(Default)]
struct OrderState {
    orders: HashMap<String, Order>,
    /// (user_id, store_id) → id of the CREATED order.
    active_drafts: HashMap<DraftKey, String>,
}

/// Order storage in a map, with a secondary index enforcing the single
/// active draft per (user, store).
#[derive(Default)]
pub struct MemoryOrderRepository {
    state: RwLock<OrderState>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.orders.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of CREATED orders for a (user, store) pair.
    pub async fn count_drafts(&self, user_id: &str, store_id: &str) -> usize {
        self.state
            .read()
            .await
            .orders
            .values()
            .filter(|o| {
                o.status == OrderStatus::Created && o.user_id == user_id && o.store_id == store_id
            })
            .count()
    }
}

fn draft_key(order: &Order) -> DraftKey {
    (order.user_id.clone(), order.store_id.clone())
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn create(&self, order: &Order) -> DbResult<()> {
        let mut state = self.state.write().await;

        if state.orders.contains_key(&order.id) {
            return Err(DbError::duplicate("order id", order.id.clone()));
        }
        if order.status == OrderStatus::Created {
            let key = draft_key(order);
            if state.active_drafts.contains_key(&key) {
                return Err(DbError::duplicate(
                    "active draft",
                    format!("{}/{}", order.user_id, order.store_id),
                ));
            }
            state.active_drafts.insert(key, order.id.clone());
        }

        debug!(order_id = %order.id, user_id = %order.user_id, "Created order");
        state.orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &mut Order) -> DbResult<()> {
        let mut state = self.state.write().await;

        let stored = state
            .orders
            .get(&order.id)
            .ok_or_else(|| DbError::not_found("order", order.id.clone()))?;
        if stored.version != order.version {
            return Err(DbError::version_conflict("order", order.id.clone()));
        }
        let was_draft = stored.status == OrderStatus::Created;

        let key = draft_key(order);
        if order.status == OrderStatus::Created {
            if let Some(holder) = state.active_drafts.get(&key) {
                if holder != &order.id {
                    return Err(DbError::duplicate(
                        "active draft",
                        format!("{}/{}", order.user_id, order.store_id),
                    ));
                }
            }
            state.active_drafts.insert(key, order.id.clone());
        } else if was_draft {
            // Leaving CREATED frees the slot for a new cart.
            state.active_drafts.remove(&key);
        }

        order.version += 1;
        order.updated_at = Utc::now();
        state.orders.insert(order.id.clone(), order.clone());

        debug!(order_id = %order.id, status = %order.status, version = order.version, "Updated order");
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Order> {
        self.state
            .read()
            .await
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| DbError::not_found("order", id))
    }

    async fn get_active_draft(&self, user_id: &str, store_id: &str) -> DbResult<Order> {
        let state = self.state.read().await;
        let key = (user_id.to_string(), store_id.to_string());

        state
            .active_drafts
            .get(&key)
            .and_then(|id| state.orders.get(id))
            .cloned()
            .ok_or_else(|| DbError::not_found("active draft", format!("{user_id}/{store_id}")))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
