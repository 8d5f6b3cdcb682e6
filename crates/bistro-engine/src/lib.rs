//! # bistro-engine: Ordering Use Cases
//!
//! Application services that drive the `bistro-core` aggregates through the
//! `bistro-db` ports. Callers get back either the updated aggregate or a
//! [`ServiceError`] carrying a stable `(kind, message)` pair.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transport (CLI, HTTP handler, IPC command) ── user_id, inputs          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 bistro-engine (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   OrderService                      PaymentService              │   │
//! │  │   ├── get_or_create_draft           ├── create_payment          │   │
//! │  │   ├── add_item ── MenuSnapshot      ├── confirm_payment         │   │
//! │  │   ├── update_item_quantity          ├── fail_payment            │   │
//! │  │   ├── remove_item                   ├── get_payment             │   │
//! │  │   ├── place_order                   └── list_payments           │   │
//! │  │   └── get_order                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │ Arc<dyn OrderRepository / PaymentRepository / MenuRead...>     │
//! │       ▼                                                                 │
//! │  bistro-db (memory or SQLite)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use bistro_db::{fixtures, Database, DbConfig};
//! use bistro_engine::{AddItemInput, Engine, EngineConfig};
//!
//! let db = Database::new(DbConfig::in_memory()).await?;
//! fixtures::seed_sqlite(&db).await?;
//! let engine = Engine::with_database(&db, EngineConfig::default());
//!
//! let (draft, _) = engine.orders.get_or_create_draft(user, fixtures::STORE_ID, None).await?;
//! let order = engine.orders.add_item(AddItemInput { order_id: draft.id, ..input }).await?;
//! ```

use std::sync::Arc;

use bistro_core::validation::validate_uuid;
use bistro_core::{CoreError, ValidationError};
use bistro_db::{Database, MenuReadRepository, OrderRepository, PaymentRepository};

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod menu;
pub mod orders;
pub mod payments;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::EngineConfig;
pub use error::{ServiceError, ServiceResult};
pub use menu::MenuSnapshot;
pub use orders::{AddItemInput, OrderService};
pub use payments::PaymentService;

/// Both services wired over the same repositories.
#[derive(Clone)]
pub struct Engine {
    pub orders: OrderService,
    pub payments: PaymentService,
}

impl Engine {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payments: Arc<dyn PaymentRepository>,
        menu: Arc<dyn MenuReadRepository>,
        config: EngineConfig,
    ) -> Self {
        Engine {
            orders: OrderService::new(orders.clone(), menu, config.clone()),
            payments: PaymentService::new(orders, payments, config),
        }
    }

    /// Wires the services to the SQLite repositories of `db`.
    pub fn with_database(db: &Database, config: EngineConfig) -> Self {
        Self::new(
            Arc::new(db.orders()),
            Arc::new(db.payments()),
            Arc::new(db.menu()),
            config,
        )
    }
}

/// Authenticated user id, trimmed, must be present.
pub(crate) fn require_user(user_id: &str) -> ServiceResult<()> {
    if user_id.trim().is_empty() {
        return Err(CoreError::MissingUser.into());
    }
    Ok(())
}

pub(crate) fn require_id(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Ids that address an existing order, line or payment must be UUIDs, and
/// so must the caller's id. Draft creation and `add_item` only require
/// presence.
pub(crate) fn require_uuids(user_id: &str, ids: &[(&str, &str)]) -> ServiceResult<()> {
    require_user(user_id)?;
    for (field, value) in ids {
        validate_uuid(field, value)?;
    }
    validate_uuid("user_id", user_id)?;
    Ok(())
}

// =============================================================================
// Test Harness
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use bistro_core::{AddonSelection, Order};
    use bistro_db::fixtures::{self, BACON_ID, CHEDDAR_BACON_ID, DEMO_USER_ID, STORE_ID};
    use bistro_db::{MemoryMenuRepository, MemoryOrderRepository, MemoryPaymentRepository};

    use crate::{AddItemInput, EngineConfig, OrderService, PaymentService};

    /// Services over in-memory stores seeded with the demo catalog. The
    /// stores stay reachable so tests can poke at them directly.
    pub struct Harness {
        pub orders: OrderService,
        pub payments: PaymentService,
        pub menu: Arc<MemoryMenuRepository>,
        pub order_store: Arc<MemoryOrderRepository>,
        pub payment_store: Arc<MemoryPaymentRepository>,
    }

    impl Harness {
        pub async fn with_config(config: EngineConfig) -> Self {
            let menu = Arc::new(MemoryMenuRepository::new());
            fixtures::seed_memory(&menu).await.unwrap();
            let order_store = Arc::new(MemoryOrderRepository::new());
            let payment_store = Arc::new(MemoryPaymentRepository::new());

            Harness {
                orders: OrderService::new(order_store.clone(), menu.clone(), config.clone()),
                payments: PaymentService::new(order_store.clone(), payment_store.clone(), config),
                menu,
                order_store,
                payment_store,
            }
        }

        /// The demo user's draft at the demo store.
        pub async fn draft(&self) -> Order {
            let (order, _) = self
                .orders
                .get_or_create_draft(DEMO_USER_ID, STORE_ID, None)
                .await
                .unwrap();
            order
        }

        /// A placed order holding one Cheddar Bacon with bacon (44.90).
        pub async fn placed_order(&self) -> Order {
            let draft = self.draft().await;
            let mut input = add(&draft.id, CHEDDAR_BACON_ID, 1);
            input.addons = vec![AddonSelection::new(BACON_ID, 1)];
            self.orders.add_item(input).await.unwrap();
            self.orders.place_order(&draft.id, DEMO_USER_ID).await.unwrap()
        }
    }

    pub async fn harness() -> Harness {
        Harness::with_config(EngineConfig::default()).await
    }

    pub fn add(order_id: &str, item_id: &str, quantity: i64) -> AddItemInput {
        AddItemInput {
            order_id: order_id.to_string(),
            user_id: DEMO_USER_ID.to_string(),
            item_id: item_id.to_string(),
            quantity,
            ..Default::default()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
