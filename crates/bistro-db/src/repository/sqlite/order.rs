//! # Order Repository (SQLite)
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders                                                                 │
//! │  ├── header columns (status, totals, timestamps, version)              │
//! │  └── items_json  ← every OrderItem with its variant/addon snapshots    │
//! │                                                                         │
//! │  One row = one aggregate, so a cart change is one UPDATE and a         │
//! │  concurrent writer can never see half of it.                           │
//! │                                                                         │
//! │  idx_orders_active_draft: UNIQUE (user_id, store_id)                   │
//! │                           WHERE status = 'CREATED'                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use bistro_core::Order;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::OrderRepository;

/// Repository for order aggregates.
#[derive(Debug, Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteOrderRepository { pool }
    }

    async fn exists(&self, id: &str) -> DbResult<bool> {
        let row = sqlx::query("SELECT 1 FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

fn order_from_row(row: &SqliteRow) -> DbResult<Order> {
    let items_json: String = row.try_get("items_json")?;

    Ok(Order {
        id: row.try_get("id")?,
        store_id: row.try_get("store_id")?,
        menu_id: row.try_get("menu_id")?,
        user_id: row.try_get("user_id")?,
        status: row.try_get("status")?,
        items: serde_json::from_str(&items_json)?,
        subtotal: row.try_get("subtotal_cents")?,
        fees: row.try_get("fees_cents")?,
        total: row.try_get("total_cents")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version: row.try_get("version")?,
    })
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn create(&self, order: &Order) -> DbResult<()> {
        debug!(order_id = %order.id, user_id = %order.user_id, store_id = %order.store_id, "Inserting order");

        let items_json = serde_json::to_string(&order.items)?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, store_id, menu_id, user_id, status, items_json,
                subtotal_cents, fees_cents, total_cents,
                created_at, updated_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(&order.store_id)
        .bind(&order.menu_id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(items_json)
        .bind(order.subtotal)
        .bind(order.fees)
        .bind(order.total)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.version)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: format!("{}/{}", order.user_id, order.store_id),
            },
            other => other,
        })?;

        Ok(())
    }

    async fn update(&self, order: &mut Order) -> DbResult<()> {
        let items_json = serde_json::to_string(&order.items)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                store_id = ?1,
                menu_id = ?2,
                user_id = ?3,
                status = ?4,
                items_json = ?5,
                subtotal_cents = ?6,
                fees_cents = ?7,
                total_cents = ?8,
                updated_at = ?9,
                version = version + 1
            WHERE id = ?10 AND version = ?11
            "#,
        )
        .bind(&order.store_id)
        .bind(&order.menu_id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(items_json)
        .bind(order.subtotal)
        .bind(order.fees)
        .bind(order.total)
        .bind(now)
        .bind(&order.id)
        .bind(order.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if self.exists(&order.id).await? {
                return Err(DbError::version_conflict("order", order.id.clone()));
            }
            return Err(DbError::not_found("order", order.id.clone()));
        }

        order.version += 1;
        order.updated_at = now;

        debug!(order_id = %order.id, status = %order.status, version = order.version, "Updated order");
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Order> {
        let row = sqlx::query(
            r#"
            SELECT id, store_id, menu_id, user_id, status, items_json,
                   subtotal_cents, fees_cents, total_cents,
                   created_at, updated_at, version
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("order", id))?;

        order_from_row(&row)
    }

    async fn get_active_draft(&self, user_id: &str, store_id: &str) -> DbResult<Order> {
        let row = sqlx::query(
            r#"
            SELECT id, store_id, menu_id, user_id, status, items_json,
                   subtotal_cents, fees_cents, total_cents,
                   created_at, updated_at, version
            FROM orders
            WHERE user_id = ?1 AND store_id = ?2 AND status = 'CREATED'
            "#,
        )
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("active draft", format!("{user_id}/{store_id}")))?;

        order_from_row(&row)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bistro_core::{Money, OrderItem, OrderItemAddon, OrderStatus};

    async fn repo() -> SqliteOrderRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.orders()
    }

    fn line() -> OrderItem {
        OrderItem::snapshot_of(
            "burger",
            "Cheddar Bacon",
            Money::from_cents(3990),
            1,
            vec![],
            vec![OrderItemAddon::new("extras", "Extras", "bacon", "Bacon", 1, Money::from_cents(500))],
            "no pickles",
        )
    }

    #[tokio::test]
    async fn test_round_trips_aggregate() {
        let repo = repo().await;
        let mut order = Order::new_draft("u1", "s1", Some("m1".into()), Money::zero());
        order.merge_or_push(line()).unwrap();
        repo.create(&order).await.unwrap();

        let loaded = repo.get_by_id(&order.id).await.unwrap();
        assert_eq!(loaded.items, order.items);
        assert_eq!(loaded.total.cents(), 4490);
        assert_eq!(loaded.menu_id.as_deref(), Some("m1"));
        assert_eq!(loaded.status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_partial_index_enforces_single_draft() {
        let repo = repo().await;
        repo.create(&Order::new_draft("u1", "s1", None, Money::zero()))
            .await
            .unwrap();

        let err = repo
            .create(&Order::new_draft("u1", "s1", None, Money::zero()))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        repo.create(&Order::new_draft("u1", "s2", None, Money::zero()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_version_guard() {
        let repo = repo().await;
        let order = Order::new_draft("u1", "s1", None, Money::zero());
        repo.create(&order).await.unwrap();

        let mut a = repo.get_by_id(&order.id).await.unwrap();
        let mut b = a.clone();

        a.merge_or_push(line()).unwrap();
        repo.update(&mut a).await.unwrap();
        assert_eq!(a.version, 1);

        b.merge_or_push(line()).unwrap();
        b.merge_or_push(line()).unwrap();
        let err = repo.update(&mut b).await.unwrap_err();
        assert!(matches!(err, DbError::VersionConflict { .. }));

        let stored = repo.get_by_id(&order.id).await.unwrap();
        assert_eq!(stored.items[0].quantity, 1);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_order_is_not_found() {
        let repo = repo().await;
        let mut ghost = Order::new_draft("u1", "s1", None, Money::zero());
        assert!(repo.update(&mut ghost).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_placed_order_frees_draft_slot() {
        let repo = repo().await;
        let mut order = Order::new_draft("u1", "s1", None, Money::zero());
        order.merge_or_push(line()).unwrap();
        repo.create(&order).await.unwrap();

        order.place().unwrap();
        repo.update(&mut order).await.unwrap();

        assert!(repo.get_active_draft("u1", "s1").await.unwrap_err().is_not_found());
        repo.create(&Order::new_draft("u1", "s1", None, Money::zero()))
            .await
            .unwrap();
        assert_eq!(
            repo.get_by_id(&order.id).await.unwrap().status,
            OrderStatus::Placed
        );
    }
}
