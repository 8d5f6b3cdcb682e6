//! # Pricing
//!
//! Deterministic totals from line snapshots. No validation happens here; by
//! the time a line reaches pricing every number in it has been checked.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  per addon:  addon.line_total  = addon.unit_price × addon.quantity     │
//! │  per line:   addons_per_unit   = Σ addon.line_total                    │
//! │              variant_delta     = Σ variant.price_delta                 │
//! │              unit_price        = base_price + addons_per_unit          │
//! │                                  + variant_delta                       │
//! │              line_total        = unit_price × quantity                 │
//! │  per order:  subtotal          = Σ line_total                          │
//! │              total             = subtotal + fees                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::order::{Order, OrderItem};

/// Price of one unit of the line, addons and variant deltas included.
pub fn unit_price(line: &OrderItem) -> Money {
    let addons_per_unit: Money = line
        .addons
        .iter()
        .map(|a| a.unit_price.multiply_quantity(a.quantity))
        .sum();
    let variant_delta: Money = line.variants.iter().map(|v| v.price_delta).sum();

    line.base_price + addons_per_unit + variant_delta
}

/// Refreshes a line's addon totals and its own `line_total`.
pub fn recalculate_line(line: &mut OrderItem) {
    for addon in &mut line.addons {
        addon.line_total = addon.unit_price.multiply_quantity(addon.quantity);
    }
    line.line_total = unit_price(line).multiply_quantity(line.quantity);
}

/// Recomputes every derived money field of the order in place.
///
/// ## Example
/// ```rust
/// use bistro_core::money::Money;
/// use bistro_core::order::{Order, OrderItem, OrderItemAddon, OrderItemVariant};
/// use bistro_core::pricing::recalculate_totals;
///
/// let mut order = Order::new_draft("u", "s", None, Money::zero());
/// order.items.push(OrderItem::snapshot_of(
///     "item",
///     "Item",
///     Money::from_cents(1000),
///     3,
///     vec![OrderItemVariant {
///         group_id: "g".into(),
///         group_name: "Size".into(),
///         option_id: "small".into(),
///         option_name: "Small".into(),
///         price_delta: Money::from_cents(-100),
///     }],
///     vec![OrderItemAddon::new("x", "Extras", "a", "Cheese", 2, Money::from_cents(200))],
///     "",
/// ));
///
/// recalculate_totals(&mut order);
/// assert_eq!(order.items[0].line_total.cents(), 3900);
/// assert_eq!(order.total.cents(), 3900);
/// ```
pub fn recalculate_totals(order: &mut Order) {
    for line in &mut order.items {
        recalculate_line(line);
    }
    order.subtotal = order.items.iter().map(|l| l.line_total).sum();
    order.total = order.subtotal + order.fees;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderItemAddon, OrderItemVariant};

    fn variant(delta: i64) -> OrderItemVariant {
        OrderItemVariant {
            group_id: "size".into(),
            group_name: "Size".into(),
            option_id: format!("opt{delta}"),
            option_name: "Opt".into(),
            price_delta: Money::from_cents(delta),
        }
    }

    #[test]
    fn test_reference_line_totals_3900() {
        let mut order = Order::new_draft("u", "s", None, Money::zero());
        order.items.push(OrderItem {
            id: "l1".into(),
            item_id: "i1".into(),
            name: "Item".into(),
            quantity: 3,
            base_price: Money::from_cents(1000),
            line_total: Money::zero(),
            variants: vec![variant(-100)],
            addons: vec![OrderItemAddon {
                group_id: "g".into(),
                group_name: "G".into(),
                option_id: "a".into(),
                option_name: "A".into(),
                quantity: 2,
                unit_price: Money::from_cents(200),
                line_total: Money::from_cents(999_999),
            }],
            note: String::new(),
        });

        recalculate_totals(&mut order);

        assert_eq!(order.items[0].addons[0].line_total.cents(), 400);
        assert_eq!(order.items[0].line_total.cents(), 3900);
        assert_eq!(order.subtotal.cents(), 3900);
        assert_eq!(order.total.cents(), 3900);
    }

    #[test]
    fn test_fees_are_added_to_total_only() {
        let mut order = Order::new_draft("u", "s", None, Money::from_cents(350));
        order.items.push(OrderItem::snapshot_of("i", "I", Money::from_cents(650), 2, vec![], vec![], ""));

        recalculate_totals(&mut order);

        assert_eq!(order.subtotal.cents(), 1300);
        assert_eq!(order.total.cents(), 1650);
    }

    #[test]
    fn test_multiple_lines_and_stale_totals_are_overwritten() {
        let mut order = Order::new_draft("u", "s", None, Money::zero());
        order.items.push(OrderItem::snapshot_of("a", "A", Money::from_cents(2990), 1, vec![variant(800)], vec![], ""));
        order.items.push(OrderItem::snapshot_of("b", "B", Money::from_cents(650), 3, vec![], vec![], ""));
        order.subtotal = Money::from_cents(1);
        order.total = Money::from_cents(1);

        recalculate_totals(&mut order);

        assert_eq!(order.subtotal.cents(), 3790 + 1950);
        assert_eq!(order.total, order.subtotal);
    }

    #[test]
    fn test_empty_order_totals_fees() {
        let mut order = Order::new_draft("u", "s", None, Money::from_cents(200));
        recalculate_totals(&mut order);
        assert!(order.subtotal.is_zero());
        assert_eq!(order.total.cents(), 200);
    }

    #[test]
    fn test_unit_price_with_negative_variant() {
        let line = OrderItem::snapshot_of("c", "Classic", Money::from_cents(2990), 1, vec![variant(-300)], vec![], "");
        assert_eq!(unit_price(&line).cents(), 2690);
    }

    #[test]
    fn test_oversized_prices_pin_totals_instead_of_wrapping() {
        let mut order = Order::new_draft("u", "s", None, Money::from_cents(500));
        let base = Money::from_cents(i64::MAX / 100);
        order.items.push(OrderItem::snapshot_of("x", "Gold", base, 999, vec![], vec![], ""));
        order.items.push(OrderItem::snapshot_of("y", "Gold", base, 999, vec![], vec![], ""));

        recalculate_totals(&mut order);

        assert_eq!(order.items[0].line_total.cents(), i64::MAX);
        assert_eq!(order.subtotal.cents(), i64::MAX);
        assert_eq!(order.total.cents(), i64::MAX);
    }
}
