//! # Order Aggregate
//!
//! The draft cart and everything that happens to it until it is paid.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   CREATED ──place()──► PLACED ──mark_paid()──► PAID                    │
//! │      │                   │                                              │
//! │      └──────────┬────────┘                                              │
//! │                 ▼                                                       │
//! │             CANCELED   (modelled; no operation reaches it yet)          │
//! │                                                                         │
//! │   Lines are editable only while CREATED.                               │
//! │   At most one CREATED order per (user, store), enforced by storage.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshots
//! [`OrderItem`], [`OrderItemVariant`] and [`OrderItemAddon`] copy names and
//! prices out of the catalog when the line is built. Repricing an item later
//! never changes a cart that already holds it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing;
use crate::signature::LineSignature;
use crate::validation::{validate_order_lines, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Draft cart, lines editable.
    #[default]
    Created,
    /// Submitted; totals frozen, waiting for payment.
    Placed,
    Paid,
    Canceled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Placed => "PLACED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Canceled => "CANCELED",
        }
    }

    pub const fn is_editable(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }

    /// Allowed edges of the order state machine.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Created, OrderStatus::Placed)
                | (OrderStatus::Created, OrderStatus::Canceled)
                | (OrderStatus::Placed, OrderStatus::Paid)
                | (OrderStatus::Placed, OrderStatus::Canceled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Line Snapshots
// =============================================================================

/// A chosen variant option, frozen at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemVariant {
    pub group_id: String,
    pub group_name: String,
    pub option_id: String,
    pub option_name: String,
    pub price_delta: Money,
}

/// A chosen addon option, frozen at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemAddon {
    pub group_id: String,
    pub group_name: String,
    pub option_id: String,
    pub option_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// unit_price × quantity, per unit of the parent line.
    pub line_total: Money,
}

impl OrderItemAddon {
    pub fn new(
        group_id: impl Into<String>,
        group_name: impl Into<String>,
        option_id: impl Into<String>,
        option_name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            group_name: group_name.into(),
            option_id: option_id.into(),
            option_name: option_name.into(),
            quantity,
            unit_price,
            line_total: unit_price.multiply_quantity(quantity),
        }
    }
}

// =============================================================================
// Order Item (cart line)
// =============================================================================

/// A cart line. `id` is assigned once and survives merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    /// Catalog item this line was built from.
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub base_price: Money,
    pub line_total: Money,
    pub variants: Vec<OrderItemVariant>,
    pub addons: Vec<OrderItemAddon>,
    pub note: String,
}

impl OrderItem {
    /// Builds a fresh line with a new id from already-resolved snapshots.
    /// The note is stored trimmed; totals are filled in.
    pub fn snapshot_of(
        item_id: impl Into<String>,
        name: impl Into<String>,
        base_price: Money,
        quantity: i64,
        variants: Vec<OrderItemVariant>,
        addons: Vec<OrderItemAddon>,
        note: &str,
    ) -> Self {
        let mut line = Self {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            name: name.into(),
            quantity,
            base_price,
            line_total: Money::zero(),
            variants,
            addons,
            note: note.trim().to_string(),
        };
        pricing::recalculate_line(&mut line);
        line
    }

    pub fn signature(&self) -> LineSignature {
        LineSignature::of_line(self)
    }
}

// =============================================================================
// Merge Outcome
// =============================================================================

/// What [`Order::merge_or_push`] did with the incoming line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Quantity folded into the existing line with this id.
    Merged { line_id: String },
    /// Appended as a new line with this id.
    Appended { line_id: String },
}

impl MergeOutcome {
    pub fn line_id(&self) -> &str {
        match self {
            MergeOutcome::Merged { line_id } | MergeOutcome::Appended { line_id } => line_id,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// The order aggregate: header plus all of its lines. Always read and
/// written whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub store_id: String,
    pub menu_id: Option<String>,
    pub user_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub fees: Money,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter; bumped by every stored update.
    pub version: i64,
}

impl Order {
    /// A new, empty draft.
    pub fn new_draft(
        user_id: impl Into<String>,
        store_id: impl Into<String>,
        menu_id: Option<String>,
        fees: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.into(),
            menu_id,
            user_id: user_id.into(),
            status: OrderStatus::Created,
            items: Vec::new(),
            subtotal: Money::zero(),
            fees,
            total: fees,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn ensure_owner(&self, user_id: &str) -> CoreResult<()> {
        if !self.is_owned_by(user_id) {
            return Err(CoreError::OrderNotOwned {
                order_id: self.id.clone(),
            });
        }
        Ok(())
    }

    pub fn ensure_editable(&self) -> CoreResult<()> {
        if !self.status.is_editable() {
            return Err(CoreError::OrderNotEditable {
                order_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    pub fn line(&self, line_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|l| l.id == line_id)
    }

    /// Folds `incoming` into the line with the same signature, or appends it.
    ///
    /// ## Merge Flow
    /// ```text
    /// incoming line ──► signature ──┬── matches line L? ──► L.qty += qty
    ///                               │                        (≤ 999)
    ///                               └── no match ─────────► push
    ///                                                        (≤ 100 lines)
    ///                         then recalculate_totals()
    /// ```
    pub fn merge_or_push(&mut self, incoming: OrderItem) -> CoreResult<MergeOutcome> {
        self.ensure_editable()?;
        validate_quantity(incoming.quantity)?;

        let signature = incoming.signature();
        let outcome = match self.items.iter_mut().find(|l| l.signature() == signature) {
            Some(existing) => {
                let merged = existing.quantity + incoming.quantity;
                if merged > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: merged,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
                existing.quantity = merged;
                MergeOutcome::Merged {
                    line_id: existing.id.clone(),
                }
            }
            None => {
                validate_order_lines(self.items.len())?;
                let line_id = incoming.id.clone();
                self.items.push(incoming);
                MergeOutcome::Appended { line_id }
            }
        };

        self.recalculate_totals();
        Ok(outcome)
    }

    /// Sets a line's quantity. Zero or negative is rejected; use
    /// [`Order::remove_line`] instead.
    pub fn set_line_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        self.ensure_editable()?;
        validate_quantity(quantity)?;

        let order_id = self.id.clone();
        let line = self
            .items
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound {
                order_id,
                line_id: line_id.to_string(),
            })?;
        line.quantity = quantity;

        self.recalculate_totals();
        Ok(())
    }

    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<OrderItem> {
        self.ensure_editable()?;

        let index = self
            .items
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound {
                order_id: self.id.clone(),
                line_id: line_id.to_string(),
            })?;
        let removed = self.items.remove(index);

        self.recalculate_totals();
        Ok(removed)
    }

    /// CREATED → PLACED. Totals are recomputed here; client totals are never
    /// trusted.
    pub fn place(&mut self) -> CoreResult<()> {
        if self.status != OrderStatus::Created {
            return Err(CoreError::OrderNotPlaceable {
                order_id: self.id.clone(),
                status: self.status,
            });
        }
        if self.items.is_empty() {
            return Err(CoreError::EmptyOrder {
                order_id: self.id.clone(),
            });
        }

        self.recalculate_totals();
        self.transition(OrderStatus::Placed)
    }

    /// PLACED → PAID, driven by payment confirmation.
    pub fn mark_paid(&mut self) -> CoreResult<()> {
        self.transition(OrderStatus::Paid)
    }

    pub fn recalculate_totals(&mut self) {
        pricing::recalculate_totals(self);
    }

    fn transition(&mut self, next: OrderStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidOrderTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::MAX_ORDER_LINES;

    fn burger(qty: i64, note: &str) -> OrderItem {
        OrderItem::snapshot_of(
            "burger",
            "Cheddar Bacon",
            Money::from_cents(3990),
            qty,
            vec![],
            vec![OrderItemAddon::new("extras", "Extras", "bacon", "Bacon", 1, Money::from_cents(500))],
            note,
        )
    }

    fn draft() -> Order {
        Order::new_draft("user-1", "store-1", None, Money::zero())
    }

    #[test]
    fn test_new_draft() {
        let order = Order::new_draft("u", "s", Some("m".into()), Money::from_cents(200));
        assert_eq!(order.status, OrderStatus::Created);
        assert!(order.items.is_empty());
        assert_eq!(order.total.cents(), 200);
        assert_eq!(order.version, 0);
    }

    #[test]
    fn test_identical_adds_merge_into_one_line() {
        let mut order = draft();

        let first = order.merge_or_push(burger(1, "")).unwrap();
        let second = order.merge_or_push(burger(1, "  ")).unwrap();

        assert!(matches!(first, MergeOutcome::Appended { .. }));
        assert!(matches!(second, MergeOutcome::Merged { .. }));
        assert_eq!(first.line_id(), second.line_id());
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.total.cents(), 2 * 4490);
    }

    #[test]
    fn test_different_note_appends() {
        let mut order = draft();
        order.merge_or_push(burger(1, "")).unwrap();
        order.merge_or_push(burger(1, "no pickles")).unwrap();
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn test_merge_quantity_cap() {
        let mut order = draft();
        order.merge_or_push(burger(MAX_ITEM_QUANTITY, "")).unwrap();
        let err = order.merge_or_push(burger(1, "")).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
        assert_eq!(order.items[0].quantity, MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_line_cap() {
        let mut order = draft();
        for i in 0..MAX_ORDER_LINES {
            order.merge_or_push(burger(1, &format!("n{i}"))).unwrap();
        }
        let err = order.merge_or_push(burger(1, "one more")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(order.items.len(), MAX_ORDER_LINES);
    }

    #[test]
    fn test_set_line_quantity() {
        let mut order = draft();
        let line_id = order.merge_or_push(burger(1, "")).unwrap().line_id().to_string();

        order.set_line_quantity(&line_id, 3).unwrap();
        assert_eq!(order.total.cents(), 3 * 4490);

        assert!(matches!(
            order.set_line_quantity(&line_id, 0),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            order.set_line_quantity("missing", 1),
            Err(CoreError::LineNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_line() {
        let mut order = draft();
        let line_id = order.merge_or_push(burger(2, "")).unwrap().line_id().to_string();

        let removed = order.remove_line(&line_id).unwrap();
        assert_eq!(removed.quantity, 2);
        assert!(order.items.is_empty());
        assert!(order.total.is_zero());

        let err = order.remove_line(&line_id).unwrap_err();
        assert_eq!(err.to_string(), "order item not found");
    }

    #[test]
    fn test_place_guards() {
        let mut order = draft();
        let err = order.place().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        order.merge_or_push(burger(1, "")).unwrap();
        order.place().unwrap();
        assert_eq!(order.status, OrderStatus::Placed);

        let err = order.place().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "order cannot be placed");
    }

    #[test]
    fn test_placed_and_paid_orders_are_not_editable() {
        let mut order = draft();
        let line_id = order.merge_or_push(burger(1, "")).unwrap().line_id().to_string();
        order.place().unwrap();

        for status in [OrderStatus::Placed, OrderStatus::Paid] {
            order.status = status;
            for err in [
                order.clone().merge_or_push(burger(1, "")).unwrap_err(),
                order.clone().set_line_quantity(&line_id, 2).unwrap_err(),
                order.clone().remove_line(&line_id).unwrap_err(),
            ] {
                assert_eq!(err.kind(), ErrorKind::Conflict);
                assert_eq!(err.to_string(), "order is not editable");
            }
        }
    }

    #[test]
    fn test_mark_paid_requires_placed() {
        let mut order = draft();
        assert!(matches!(
            order.mark_paid(),
            Err(CoreError::InvalidOrderTransition { .. })
        ));

        order.merge_or_push(burger(1, "")).unwrap();
        order.place().unwrap();
        order.mark_paid().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn test_ownership() {
        let order = draft();
        assert!(order.ensure_owner("user-1").is_ok());
        assert_eq!(
            order.ensure_owner("intruder").unwrap_err().kind(),
            ErrorKind::Forbidden
        );
    }

    #[test]
    fn test_status_transitions() {
        assert!(OrderStatus::Created.can_transition_to(OrderStatus::Placed));
        assert!(OrderStatus::Placed.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Created.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Canceled.can_transition_to(OrderStatus::Created));
    }

    #[test]
    fn test_order_wire_format() {
        let mut order = draft();
        order.merge_or_push(burger(1, "")).unwrap();

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "CREATED");
        assert_eq!(json["total"], 4490);
        assert_eq!(json["items"][0]["addons"][0]["line_total"], 500);
    }
}
