//! # bistro-db: Persistence for the Bistro Ordering Engine
//!
//! Repository ports the engine talks to, with two adapter families:
//! in-memory (tests, demos) and SQLite via sqlx (real storage).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro Data Flow                                 │
//! │                                                                         │
//! │  bistro-engine (OrderService / PaymentService)                         │
//! │       │  Arc<dyn OrderRepository>, Arc<dyn MenuReadRepository>, ...    │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bistro-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ memory/sqlite │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Order, Payment│    │ 001_init.sql │  │   │
//! │  │   │               │    │ Menu          │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   fixtures.rs: demo catalog for tests, seed binary, CLI        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Ports and their memory/SQLite adapters
//! - [`fixtures`] - Demo catalog loader
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bistro_db::{fixtures, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bistro.db")).await?;
//! fixtures::seed_sqlite(&db).await?;
//!
//! let draft = db.orders().get_active_draft(&user_id, fixtures::STORE_ID).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fixtures;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::memory::{MemoryMenuRepository, MemoryOrderRepository, MemoryPaymentRepository};
pub use repository::sqlite::{SqliteMenuRepository, SqliteOrderRepository, SqlitePaymentRepository};
pub use repository::{CatalogWriter, MenuReadRepository, OrderRepository, PaymentRepository};
