//! # bistro-core: Pure Ordering Logic for Bistro
//!
//! This crate holds the order-composition and pricing engine as plain data
//! and pure functions. Nothing here touches a database, a clock-driven
//! scheduler or the network; the storage and use-case layers live in
//! `bistro-db` and `bistro-engine`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 bistro-engine (use cases)                       │   │
//! │  │  get_or_create_draft, add_item, place_order, create_payment ... │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌───────────┐ ┌───────┐ │   │
//! │  │  │ catalog │ │  order  │ │ selection │ │ signature │ │payment│ │   │
//! │  │  └─────────┘ └─────────┘ └───────────┘ └───────────┘ └───────┘ │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌───────────┐                         │   │
//! │  │  │  money  │ │ pricing │ │ validation│                         │   │
//! │  │  └─────────┘ └─────────┘ └───────────┘                         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bistro-db (persistence ports)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cents `Money`
//! - [`catalog`] - Read-only menu entities (items, addon and variant groups)
//! - [`order`] - Order aggregate, lines, snapshots and the order state machine
//! - [`payment`] - Payment record and its state machine
//! - [`pricing`] - `recalculate_totals`
//! - [`selection`] - Group min/max/required enforcement
//! - [`signature`] - Canonical line signatures used for merging
//! - [`validation`] - Input shape checks
//! - [`error`] - Domain errors and their [`ErrorKind`]
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::money::Money;
//! use bistro_core::order::{Order, OrderItem};
//!
//! let mut order = Order::new_draft("user", "store", None, Money::zero());
//! let line = OrderItem::snapshot_of("burger", "Burger", Money::from_cents(3990), 1, vec![], vec![], "");
//! order.merge_or_push(line).unwrap();
//!
//! assert_eq!(order.total.cents(), 3990);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod pricing;
pub mod selection;
pub mod signature;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use order::{Order, OrderItem, OrderItemAddon, OrderItemVariant, OrderStatus};
pub use payment::{Payment, PaymentMethod, PaymentProvider, PaymentStatus};
pub use selection::{AddonSelection, GroupKind, GroupRule};
pub use signature::LineSignature;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single order.
///
/// ## Business Reason
/// Keeps carts to a size a kitchen ticket can hold.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line, after merges.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a free-text line note, in characters.
pub const MAX_NOTE_LENGTH: usize = 500;

/// Maximum length of a client-supplied idempotency key.
pub const MAX_IDEMPOTENCY_KEY_LENGTH: usize = 128;

/// Currency every payment is issued in.
pub const DEFAULT_CURRENCY: &str = "BRL";
