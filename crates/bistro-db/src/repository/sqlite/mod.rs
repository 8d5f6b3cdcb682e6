//! SQLite adapters.
//!
//! Runtime-checked `sqlx::query` with positional binds. Uniqueness rules are
//! partial UNIQUE indexes (see `migrations/sqlite/001_initial_schema.sql`);
//! version checks are a `WHERE id = ? AND version = ?` guard on UPDATE.

mod menu;
mod order;
mod payment;

pub use menu::SqliteMenuRepository;
pub use order::SqliteOrderRepository;
pub use payment::SqlitePaymentRepository;
