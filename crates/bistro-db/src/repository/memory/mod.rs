//! In-memory adapters.
//!
//! Backed by `tokio::sync::RwLock<HashMap<..>>`. Used by tests and by
//! deployments that do not need durability. Uniqueness rules are enforced by
//! secondary indexes kept under the same lock as the primary map.

mod menu;
mod order;
mod payment;

pub use menu::MemoryMenuRepository;
pub use order::MemoryOrderRepository;
pub use payment::MemoryPaymentRepository;
