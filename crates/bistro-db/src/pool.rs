//! # SQLite Pool
//!
//! Opens the order store and hands out repository adapters that share one
//! `SqlitePool`.
//!
//! Every connection runs with WAL, `synchronous = NORMAL` and foreign keys
//! on. The schema leans on the last one: payments point at orders and every
//! catalog row points at its parent, so a dangling insert fails instead of
//! leaving an orphan.
//!
//! ```text
//! DbConfig ──► Database::new ──► migrations ──► db.orders()   ─┐
//!                                               db.payments() ─┼─ same pool
//!                                               db.menu()     ─┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use crate::migrations;
use crate::repository::sqlite::{
    SqliteMenuRepository, SqliteOrderRepository, SqlitePaymentRepository,
};

/// Where the store lives and how many connections may touch it.
///
/// ```rust,ignore
/// let config = DbConfig::new("./bistro.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `None` selects a private in-memory database.
    pub database_path: Option<PathBuf>,
    pub max_connections: u32,
    /// How long a request waits for a free connection before giving up.
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file-backed store, created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: Some(path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    /// A fresh, empty store that disappears with its pool.
    ///
    /// The pool is pinned to one connection that never idles out. Each
    /// in-memory connection would otherwise be a database of its own, and
    /// the version-guarded `UPDATE` tests need every read and write of an
    /// order to hit the same rows.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: None,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.database_path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
            None => SqliteConnectOptions::new().in_memory(true),
        };

        options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
    }

    fn describe(&self) -> String {
        self.database_path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
    }
}

/// Handle to the order store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);
        if config.database_path.is_none() {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(config.connect_options()).await?;
        info!(
            path = %config.describe(),
            max_connections = config.max_connections,
            "Order store opened"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for migration bookkeeping.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn orders(&self) -> SqliteOrderRepository {
        SqliteOrderRepository::new(self.pool.clone())
    }

    pub fn payments(&self) -> SqlitePaymentRepository {
        SqlitePaymentRepository::new(self.pool.clone())
    }

    /// Catalog reads plus the upserts the fixtures use.
    pub fn menu(&self) -> SqliteMenuRepository {
        SqliteMenuRepository::new(self.pool.clone())
    }

    /// Waits for in-flight queries, then refuses new ones.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Order store closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::{OrderRepository, PaymentRepository};
    use bistro_core::{Money, Order, OrderItem, Payment, PaymentMethod};

    fn placed_order() -> Order {
        let mut order = Order::new_draft("u1", "s1", None, Money::zero());
        let line = OrderItem::snapshot_of("i1", "Burger", Money::from_cents(1000), 1, vec![], vec![], "");
        order.merge_or_push(line).unwrap();
        order.place().unwrap();
        order
    }

    #[test]
    fn test_config_defaults() {
        let file = DbConfig::new("/tmp/bistro.db").max_connections(0).run_migrations(false);
        assert_eq!(file.max_connections, 1);
        assert!(!file.run_migrations);
        assert_eq!(file.describe(), "/tmp/bistro.db");

        let memory = DbConfig::in_memory();
        assert!(memory.database_path.is_none());
        assert_eq!(memory.max_connections, 1);
        assert_eq!(memory.describe(), ":memory:");
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        let order = Order::new_draft("u1", "s1", None, Money::zero());
        a.orders().create(&order).await.unwrap();

        assert!(a.orders().get_by_id(&order.id).await.is_ok());
        assert!(b.orders().get_by_id(&order.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = placed_order();
        let payment = Payment::for_order(&order, PaymentMethod::Mock, "BRL", None).unwrap();

        // The order was never stored.
        let err = db.payments().create(&payment).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKey(_)), "{err:?}");

        db.orders().create(&order).await.unwrap();
        db.payments().create(&payment).await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let err = db.orders().get_by_id("o-1").await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable(_)), "{err:?}");
    }
}
