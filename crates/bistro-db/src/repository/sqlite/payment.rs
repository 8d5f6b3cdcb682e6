//! # Payment Repository (SQLite)
//!
//! ## Idempotency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  idx_payments_idempotency: UNIQUE (order_id, idempotency_key)          │
//! │                            WHERE idempotency_key IS NOT NULL            │
//! │                                                                         │
//! │  Two racing creates with the same key: one INSERT wins, the other      │
//! │  gets UniqueViolation and the caller re-reads the winner with          │
//! │  get_by_order_and_key.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use bistro_core::Payment;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::PaymentRepository;

/// Repository for payments.
#[derive(Debug, Clone)]
pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqlitePaymentRepository { pool }
    }

    async fn exists(&self, id: &str) -> DbResult<bool> {
        let row = sqlx::query("SELECT 1 FROM payments WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

fn payment_from_row(row: &SqliteRow) -> DbResult<Payment> {
    Ok(Payment {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        user_id: row.try_get("user_id")?,
        store_id: row.try_get("store_id")?,
        method: row.try_get("method")?,
        provider: row.try_get("provider")?,
        status: row.try_get("status")?,
        amount: row.try_get("amount_cents")?,
        currency: row.try_get("currency")?,
        idempotency_key: row.try_get("idempotency_key")?,
        failure_reason: row.try_get("failure_reason")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        paid_at: row.try_get("paid_at")?,
        version: row.try_get("version")?,
    })
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: &Payment) -> DbResult<()> {
        debug!(payment_id = %payment.id, order_id = %payment.order_id, "Inserting payment");

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, user_id, store_id, method, provider, status,
                amount_cents, currency, idempotency_key, failure_reason,
                created_at, updated_at, paid_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(&payment.user_id)
        .bind(&payment.store_id)
        .bind(payment.method)
        .bind(payment.provider)
        .bind(payment.status)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.idempotency_key)
        .bind(&payment.failure_reason)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .bind(payment.paid_at)
        .bind(payment.version)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, value } => DbError::UniqueViolation {
                field,
                value: payment.idempotency_key.clone().unwrap_or(value),
            },
            other => other,
        })?;

        Ok(())
    }

    async fn update(&self, payment: &mut Payment) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = ?1,
                amount_cents = ?2,
                currency = ?3,
                failure_reason = ?4,
                paid_at = ?5,
                updated_at = ?6,
                version = version + 1
            WHERE id = ?7 AND version = ?8
            "#,
        )
        .bind(payment.status)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.failure_reason)
        .bind(payment.paid_at)
        .bind(now)
        .bind(&payment.id)
        .bind(payment.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if self.exists(&payment.id).await? {
                return Err(DbError::version_conflict("payment", payment.id.clone()));
            }
            return Err(DbError::not_found("payment", payment.id.clone()));
        }

        payment.version += 1;
        payment.updated_at = now;

        debug!(payment_id = %payment.id, status = %payment.status, "Updated payment");
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Payment> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, user_id, store_id, method, provider, status,
                   amount_cents, currency, idempotency_key, failure_reason,
                   created_at, updated_at, paid_at, version
            FROM payments
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("payment", id))?;

        payment_from_row(&row)
    }

    async fn get_by_order_and_key(&self, order_id: &str, key: &str) -> DbResult<Payment> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, user_id, store_id, method, provider, status,
                   amount_cents, currency, idempotency_key, failure_reason,
                   created_at, updated_at, paid_at, version
            FROM payments
            WHERE order_id = ?1 AND idempotency_key = ?2
            "#,
        )
        .bind(order_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("payment", format!("{order_id}/{key}")))?;

        payment_from_row(&row)
    }

    async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, user_id, store_id, method, provider, status,
                   amount_cents, currency, idempotency_key, failure_reason,
                   created_at, updated_at, paid_at, version
            FROM payments
            WHERE order_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(payment_from_row).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
