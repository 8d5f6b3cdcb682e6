//! # Order Service
//!
//! Draft and cart use cases. Each mutating call follows the same shape:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate input ──► load aggregate ──► owner? ──► editable?            │
//! │                                                      │                  │
//! │                          compute new aggregate in memory               │
//! │                          (resolve menu, merge, reprice)                │
//! │                                                      │                  │
//! │                          ONE update(&mut order) ─────┘                  │
//! │                          stale version → Conflict                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The single write comes last, so a dropped future never leaves a half
//! applied change behind.

use std::sync::Arc;

use bistro_core::order::MergeOutcome;
use bistro_core::selection::AddonSelection;
use bistro_core::validation::{validate_note, validate_quantity};
use bistro_core::Order;
use bistro_db::{MenuReadRepository, OrderRepository};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::ServiceResult;
use crate::menu::MenuSnapshot;
use crate::{require_id, require_user, require_uuids};

// =============================================================================
// Inputs
// =============================================================================

/// Request to add one line to a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemInput {
    pub order_id: String,
    pub user_id: String,
    /// Catalog item id.
    pub item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub variant_option_ids: Vec<String>,
    #[serde(default)]
    pub addons: Vec<AddonSelection>,
    #[serde(default)]
    pub note: String,
}

impl AddItemInput {
    /// Shape checks that need no storage: ids present, quantity in range,
    /// note within bounds.
    pub fn validate(&self) -> ServiceResult<()> {
        require_user(&self.user_id)?;
        require_id("order_id", &self.order_id)?;
        require_id("item_id", &self.item_id)?;
        validate_quantity(self.quantity)?;
        validate_note(&self.note)?;
        Ok(())
    }
}

// =============================================================================
// Service
// =============================================================================

/// Draft lifecycle and cart editing.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    menu: Arc<dyn MenuReadRepository>,
    config: EngineConfig,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        menu: Arc<dyn MenuReadRepository>,
        config: EngineConfig,
    ) -> Self {
        OrderService {
            orders,
            menu,
            config,
        }
    }

    /// Returns the caller's CREATED order for `store_id`, creating it if
    /// needed. The flag is `true` only when this call created it.
    ///
    /// ## Race Handling
    /// ```text
    /// caller A: get_active_draft → NotFound → create ✓
    /// caller B: get_active_draft → NotFound → create ✗ UniqueViolation
    ///                                          └─► get_active_draft → A's draft
    /// ```
    pub async fn get_or_create_draft(
        &self,
        user_id: &str,
        store_id: &str,
        menu_id: Option<&str>,
    ) -> ServiceResult<(Order, bool)> {
        require_user(user_id)?;
        require_id("store_id", store_id)?;

        match self.orders.get_active_draft(user_id, store_id).await {
            Ok(order) => return Ok((order, false)),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let menu_id = menu_id.map(str::trim).filter(|m| !m.is_empty()).map(str::to_string);
        let draft = Order::new_draft(user_id, store_id, menu_id, self.config.order_fee);

        match self.orders.create(&draft).await {
            Ok(()) => {
                info!(order_id = %draft.id, user_id, store_id, "Draft created");
                Ok((draft, true))
            }
            Err(e) if e.is_unique_violation() => {
                warn!(user_id, store_id, "Concurrent draft creation, returning the winner");
                let existing = self.orders.get_active_draft(user_id, store_id).await?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Adds a line, merging it into an identical one when present.
    pub async fn add_item(&self, input: AddItemInput) -> ServiceResult<Order> {
        input.validate()?;

        let mut order = self.load_owned(&input.order_id, &input.user_id).await?;
        order.ensure_editable()?;

        let line = MenuSnapshot::new(self.menu.as_ref())
            .resolve_line(&input)
            .await?;
        let outcome = order.merge_or_push(line)?;

        self.orders.update(&mut order).await?;

        match &outcome {
            MergeOutcome::Merged { line_id } => {
                debug!(order_id = %order.id, line_id = %line_id, "Line merged")
            }
            MergeOutcome::Appended { line_id } => {
                debug!(order_id = %order.id, line_id = %line_id, "Line appended")
            }
        }
        info!(order_id = %order.id, total = %order.total, lines = order.items.len(), "Item added");
        Ok(order)
    }

    /// Sets a line's quantity. `line_id` is the order line id.
    pub async fn update_item_quantity(
        &self,
        order_id: &str,
        user_id: &str,
        line_id: &str,
        quantity: i64,
    ) -> ServiceResult<Order> {
        require_uuids(user_id, &[("order_id", order_id), ("line_id", line_id)])?;
        validate_quantity(quantity)?;

        let mut order = self.load_owned(order_id, user_id).await?;
        order.set_line_quantity(line_id, quantity)?;
        self.orders.update(&mut order).await?;

        debug!(order_id = %order.id, line_id, quantity, "Line quantity updated");
        Ok(order)
    }

    pub async fn remove_item(
        &self,
        order_id: &str,
        user_id: &str,
        line_id: &str,
    ) -> ServiceResult<Order> {
        require_uuids(user_id, &[("order_id", order_id), ("line_id", line_id)])?;

        let mut order = self.load_owned(order_id, user_id).await?;
        order.remove_line(line_id)?;
        self.orders.update(&mut order).await?;

        debug!(order_id = %order.id, line_id, "Line removed");
        Ok(order)
    }

    /// CREATED → PLACED with server-side totals.
    pub async fn place_order(&self, order_id: &str, user_id: &str) -> ServiceResult<Order> {
        require_uuids(user_id, &[("order_id", order_id)])?;
        let mut order = self.load_owned(order_id, user_id).await?;
        order.place()?;
        self.orders.update(&mut order).await?;

        info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str, user_id: &str) -> ServiceResult<Order> {
        require_uuids(user_id, &[("order_id", order_id)])?;
        self.load_owned(order_id, user_id).await
    }

    async fn load_owned(&self, order_id: &str, user_id: &str) -> ServiceResult<Order> {
        require_user(user_id)?;
        require_id("order_id", order_id)?;

        let order = self.orders.get_by_id(order_id).await?;
        order.ensure_owner(user_id)?;
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
