//! # Catalog Types
//!
//! The menu entities the ordering engine reads. Catalog management (creating
//! and editing these) happens elsewhere; here they are plain values.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Menu ──► Category ──► CategoryItem                                     │
//! │                            │                                            │
//! │              ┌─────────────┴─────────────┐                              │
//! │              ▼                           ▼                              │
//! │        AddonGroup                  VariantGroup                         │
//! │   required/min/max/order      required/min/max/order                    │
//! │              │                           │                              │
//! │              ▼                           ▼                              │
//! │        AddonOption                 VariantOption                        │
//! │   price ≥ 0, has quantity     price_delta (may be < 0), boolean pick    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::selection::{GroupKind, GroupRule};
use crate::validation::{validate_price_cents, validate_select_bounds, ValidationResult};

// =============================================================================
// Menu & Category
// =============================================================================

/// A store's published menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Menu {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub menu_id: String,
    pub name: String,
    pub display_order: i64,
    pub is_active: bool,
}

// =============================================================================
// Category Item
// =============================================================================

/// A sellable menu entry.
///
/// Only a name/price snapshot of this travels with an order line; editing the
/// item later never reprices existing orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryItem {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Money,
    pub image_url: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CategoryItem {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_price_cents("base_price", self.base_price.cents())
    }
}

// =============================================================================
// Addon Groups & Options
// =============================================================================

/// Optional extras attached to an item ("Extras", "Sauces").
///
/// Counting for min/max is by distinct options picked, not summed quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonGroup {
    pub id: String,
    pub item_id: String,
    pub name: String,
    pub required: bool,
    pub min_select: i64,
    /// 0 = unbounded.
    pub max_select: i64,
    pub display_order: i64,
    pub is_active: bool,
}

impl AddonGroup {
    pub fn rule(&self) -> GroupRule {
        GroupRule {
            group_id: self.id.clone(),
            kind: GroupKind::Addon,
            required: self.required,
            min_select: self.min_select,
            max_select: self.max_select,
            display_order: self.display_order,
            is_active: self.is_active,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_select_bounds(self.min_select, self.max_select)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonOption {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub price: Money,
    pub display_order: i64,
    pub is_active: bool,
}

impl AddonOption {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_price_cents("addon price", self.price.cents())
    }
}

// =============================================================================
// Variant Groups & Options
// =============================================================================

/// Mutually relevant choices for an item ("Size").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantGroup {
    pub id: String,
    pub item_id: String,
    pub name: String,
    pub required: bool,
    pub min_select: i64,
    /// 0 = unbounded.
    pub max_select: i64,
    pub display_order: i64,
    pub is_active: bool,
}

impl VariantGroup {
    pub fn rule(&self) -> GroupRule {
        GroupRule {
            group_id: self.id.clone(),
            kind: GroupKind::Variant,
            required: self.required,
            min_select: self.min_select,
            max_select: self.max_select,
            display_order: self.display_order,
            is_active: self.is_active,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_select_bounds(self.min_select, self.max_select)
    }
}

/// A variant choice. Selection is boolean; no quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantOption {
    pub id: String,
    pub group_id: String,
    pub name: String,
    /// Added to the item's base price; negative for cheaper variants.
    pub price_delta: Money,
    pub is_default: bool,
    pub display_order: i64,
    pub is_active: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn size_group() -> VariantGroup {
        VariantGroup {
            id: "size".into(),
            item_id: "classic".into(),
            name: "Size".into(),
            required: true,
            min_select: 1,
            max_select: 1,
            display_order: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_group_rule_carries_constraints() {
        let rule = size_group().rule();
        assert_eq!(rule.kind, GroupKind::Variant);
        assert!(rule.required);
        assert_eq!((rule.min_select, rule.max_select), (1, 1));
        assert_eq!(rule.group_id, "size");
    }

    #[test]
    fn test_group_bounds_validation() {
        let mut group = size_group();
        assert!(group.validate().is_ok());
        group.max_select = 0;
        assert!(group.validate().is_ok());
        group.min_select = 2;
        group.max_select = 1;
        assert!(group.validate().is_err());
    }

    #[test]
    fn test_negative_addon_price_rejected() {
        let option = AddonOption {
            id: "bacon".into(),
            group_id: "extras".into(),
            name: "Bacon".into(),
            price: Money::from_cents(-1),
            display_order: 0,
            is_active: true,
        };
        assert!(option.validate().is_err());
    }
}
