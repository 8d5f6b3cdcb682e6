//! # Repository Module
//!
//! The persistence ports the ordering engine depends on, plus two adapter
//! families implementing them.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  bistro-engine service                                                 │
//! │       │  Arc<dyn OrderRepository>                                       │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┐     ┌──────────────────────┐                 │
//! │  │ memory::*Repository  │     │ sqlite::*Repository  │                 │
//! │  │ RwLock<HashMap> +    │     │ SqlitePool +         │                 │
//! │  │ uniqueness indexes   │     │ partial UNIQUE index │                 │
//! │  └──────────────────────┘     └──────────────────────┘                 │
//! │                                                                         │
//! │  Both adapters give the same guarantees:                               │
//! │  • at most one CREATED order per (user, store)                         │
//! │  • at most one payment per (order, idempotency key)                    │
//! │  • update succeeds only against the version that was read              │
//! │  • reads return owned copies; callers never alias stored state         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Ports
//!
//! - [`OrderRepository`] - order aggregates
//! - [`PaymentRepository`] - payments
//! - [`MenuReadRepository`] - read-only catalog access
//! - [`CatalogWriter`] - catalog upserts, used by fixtures only

use async_trait::async_trait;
use bistro_core::catalog::{
    AddonGroup, AddonOption, Category, CategoryItem, Menu, VariantGroup, VariantOption,
};
use bistro_core::{Order, Payment};

use crate::error::DbResult;

pub mod memory;
pub mod sqlite;

// =============================================================================
// Orders
// =============================================================================

/// Order aggregate storage. Always reads and writes the whole aggregate.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a new order.
    ///
    /// Fails with `UniqueViolation` if `order` is CREATED and another CREATED
    /// order already exists for the same (user, store).
    async fn create(&self, order: &Order) -> DbResult<()>;

    /// Replaces a stored order.
    ///
    /// Succeeds only if the stored version equals `order.version`; on success
    /// `order.version` is incremented and `order.updated_at` refreshed.
    /// Fails with `NotFound` or `VersionConflict`.
    async fn update(&self, order: &mut Order) -> DbResult<()>;

    async fn get_by_id(&self, id: &str) -> DbResult<Order>;

    /// The CREATED order for (user, store), or `NotFound`.
    async fn get_active_draft(&self, user_id: &str, store_id: &str) -> DbResult<Order>;
}

// =============================================================================
// Payments
// =============================================================================

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Fails with `UniqueViolation` on a repeated (order, idempotency key).
    async fn create(&self, payment: &Payment) -> DbResult<()>;

    /// Same optimistic contract as [`OrderRepository::update`].
    async fn update(&self, payment: &mut Payment) -> DbResult<()>;

    async fn get_by_id(&self, id: &str) -> DbResult<Payment>;

    async fn get_by_order_and_key(&self, order_id: &str, key: &str) -> DbResult<Payment>;

    /// All payments of an order, oldest first.
    async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<Payment>>;
}

// =============================================================================
// Catalog
// =============================================================================

/// Point-in-time catalog reads. Every `get_*` fails with `NotFound` when
/// absent; `list_*` return groups ordered by (display_order, id).
#[async_trait]
pub trait MenuReadRepository: Send + Sync {
    async fn get_item(&self, id: &str) -> DbResult<CategoryItem>;

    async fn list_addon_groups(&self, item_id: &str) -> DbResult<Vec<AddonGroup>>;

    async fn get_addon_group(&self, id: &str) -> DbResult<AddonGroup>;

    async fn get_addon_option(&self, id: &str) -> DbResult<AddonOption>;

    async fn list_variant_groups(&self, item_id: &str) -> DbResult<Vec<VariantGroup>>;

    async fn get_variant_group(&self, id: &str) -> DbResult<VariantGroup>;

    async fn get_variant_option(&self, id: &str) -> DbResult<VariantOption>;
}

/// Catalog upserts. The ordering engine never writes the catalog; this exists
/// so fixtures can load the same data into either adapter.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn upsert_menu(&self, menu: &Menu) -> DbResult<()>;

    async fn upsert_category(&self, category: &Category) -> DbResult<()>;

    async fn upsert_item(&self, item: &CategoryItem) -> DbResult<()>;

    async fn upsert_addon_group(&self, group: &AddonGroup) -> DbResult<()>;

    async fn upsert_addon_option(&self, option: &AddonOption) -> DbResult<()>;

    async fn upsert_variant_group(&self, group: &VariantGroup) -> DbResult<()>;

    async fn upsert_variant_option(&self, option: &VariantOption) -> DbResult<()>;
}
