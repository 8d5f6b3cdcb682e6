//! # Menu Snapshot Resolution
//!
//! Turns a client's "item + selected option ids" into a priced
//! [`OrderItem`], copying names and prices out of the catalog so later menu
//! edits never change a cart.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_item ──► inactive? ─────────────────────────► Conflict            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  variant ids (trimmed, deduplicated)                                   │
//! │     └─ get_variant_option ─► get_variant_group                         │
//! │           ├── option inactive?           → Conflict                    │
//! │           ├── group of another item?     → InvalidArgument             │
//! │           └── group inactive?            → Conflict                    │
//! │  addons (coalesced by option id), same checks                          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  group rules: variants then addons, by (display_order, id)             │
//! │     required → min → max, inactive groups skipped                      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  OrderItem::snapshot_of(...)   fresh line id, totals filled            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog lookups run one after another; nothing here writes.

use std::collections::HashMap;

use bistro_core::selection::{
    coalesce_addon_selections, normalize_variant_ids, validate_group_counts, GroupKind, GroupRule,
};
use bistro_core::{CoreError, OrderItem, OrderItemAddon, OrderItemVariant};
use bistro_db::MenuReadRepository;
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};
use crate::orders::AddItemInput;

/// Read-only view over the catalog used while building a line.
pub struct MenuSnapshot<'a> {
    menu: &'a dyn MenuReadRepository,
}

impl<'a> MenuSnapshot<'a> {
    pub fn new(menu: &'a dyn MenuReadRepository) -> Self {
        MenuSnapshot { menu }
    }

    /// Resolves and validates the selection in `input`, returning a new line.
    ///
    /// `input` is expected to have passed [`AddItemInput::validate`].
    pub async fn resolve_line(&self, input: &AddItemInput) -> ServiceResult<OrderItem> {
        let item = self.menu.get_item(input.item_id.trim()).await?;
        if !item.is_active {
            return Err(CoreError::ItemInactive { item_id: item.id }.into());
        }

        let variant_groups = self.menu.list_variant_groups(&item.id).await?;
        let addon_groups = self.menu.list_addon_groups(&item.id).await?;
        let mut counts: HashMap<String, usize> = HashMap::new();

        let mut variants = Vec::new();
        for option_id in normalize_variant_ids(&input.variant_option_ids) {
            let option = self.menu.get_variant_option(&option_id).await?;
            if !option.is_active {
                return Err(inactive(GroupKind::Variant, option.id));
            }
            let group = self.menu.get_variant_group(&option.group_id).await?;
            if group.item_id != item.id {
                return Err(not_allowed(GroupKind::Variant, option.id, &item.id));
            }
            if !group.is_active {
                return Err(inactive(GroupKind::Variant, option.id));
            }

            *counts.entry(group.id.clone()).or_default() += 1;
            variants.push(OrderItemVariant {
                group_id: group.id,
                group_name: group.name,
                option_id: option.id,
                option_name: option.name,
                price_delta: option.price_delta,
            });
        }

        let mut addons = Vec::new();
        for selection in coalesce_addon_selections(&input.addons)? {
            let option = self.menu.get_addon_option(&selection.option_id).await?;
            if !option.is_active {
                return Err(inactive(GroupKind::Addon, option.id));
            }
            let group = self.menu.get_addon_group(&option.group_id).await?;
            if group.item_id != item.id {
                return Err(not_allowed(GroupKind::Addon, option.id, &item.id));
            }
            if !group.is_active {
                return Err(inactive(GroupKind::Addon, option.id));
            }

            *counts.entry(group.id.clone()).or_default() += 1;
            addons.push(OrderItemAddon::new(
                group.id,
                group.name,
                option.id,
                option.name,
                selection.quantity,
                option.price,
            ));
        }

        let rules: Vec<GroupRule> = variant_groups
            .iter()
            .map(|g| g.rule())
            .chain(addon_groups.iter().map(|g| g.rule()))
            .collect();
        validate_group_counts(&rules, &counts)?;

        debug!(
            item_id = %item.id,
            variants = variants.len(),
            addons = addons.len(),
            "Resolved line selection"
        );

        Ok(OrderItem::snapshot_of(
            item.id,
            item.name,
            item.base_price,
            input.quantity,
            variants,
            addons,
            &input.note,
        ))
    }
}

fn inactive(kind: GroupKind, option_id: String) -> ServiceError {
    CoreError::OptionInactive { kind, option_id }.into()
}

fn not_allowed(kind: GroupKind, option_id: String, item_id: &str) -> ServiceError {
    CoreError::OptionNotAllowed {
        kind,
        option_id,
        item_id: item_id.to_string(),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::{AddonSelection, ErrorKind};
    use bistro_db::fixtures::{self, *};
    use bistro_db::{CatalogWriter, MemoryMenuRepository};

    async fn menu() -> MemoryMenuRepository {
        let repo = MemoryMenuRepository::new();
        fixtures::seed_memory(&repo).await.unwrap();
        repo
    }

    fn input(item_id: &str, variants: &[&str], addons: &[(&str, i64)]) -> AddItemInput {
        AddItemInput {
            order_id: "order".into(),
            user_id: "user".into(),
            item_id: item_id.into(),
            quantity: 1,
            variant_option_ids: variants.iter().map(|s| s.to_string()).collect(),
            addons: addons
                .iter()
                .map(|(id, qty)| AddonSelection::new(*id, *qty))
                .collect(),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_snapshot_copies_names_and_prices() {
        let repo = menu().await;
        let line = MenuSnapshot::new(&repo)
            .resolve_line(&input(CHEDDAR_BACON_ID, &[], &[(BACON_ID, 1)]))
            .await
            .unwrap();

        assert_eq!(line.name, "Cheddar Bacon");
        assert_eq!(line.base_price.cents(), 3990);
        assert_eq!(line.addons[0].group_name, "Extras");
        assert_eq!(line.addons[0].option_name, "Bacon");
        assert_eq!(line.line_total.cents(), 4490);
    }

    #[tokio::test]
    async fn test_variant_deltas() {
        let repo = menu().await;
        let snapshot = MenuSnapshot::new(&repo);

        let large = snapshot
            .resolve_line(&input(CLASSIC_ID, &[SIZE_LARGE_ID], &[]))
            .await
            .unwrap();
        assert_eq!(large.line_total.cents(), 3790);

        let small = snapshot
            .resolve_line(&input(CLASSIC_ID, &[" ", SIZE_SMALL_ID, SIZE_SMALL_ID], &[]))
            .await
            .unwrap();
        assert_eq!(small.variants.len(), 1);
        assert_eq!(small.line_total.cents(), 2690);
    }

    #[tokio::test]
    async fn test_rejects_foreign_options() {
        let repo = menu().await;
        let snapshot = MenuSnapshot::new(&repo);

        let err = snapshot
            .resolve_line(&input(CHEDDAR_BACON_ID, &[SIZE_LARGE_ID], &[]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, "variant option not allowed for item");

        let err = snapshot
            .resolve_line(&input(CLASSIC_ID, &[SIZE_REGULAR_ID], &[(BACON_ID, 1)]))
            .await
            .unwrap_err();
        assert_eq!(err.message, "addon option not allowed for item");
    }

    #[tokio::test]
    async fn test_inactive_group_is_skipped_but_its_options_rejected() {
        let repo = menu().await;
        let mut size = repo.get_variant_group(SIZE_GROUP_ID).await.unwrap();
        size.is_active = false;
        repo.upsert_variant_group(&size).await.unwrap();
        let snapshot = MenuSnapshot::new(&repo);

        // Required group no longer enforced.
        let line = snapshot
            .resolve_line(&input(CLASSIC_ID, &[], &[]))
            .await
            .unwrap();
        assert_eq!(line.line_total.cents(), 2990);

        let err = snapshot
            .resolve_line(&input(CLASSIC_ID, &[SIZE_LARGE_ID], &[]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.message, "option is inactive");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let repo = menu().await;
        let snapshot = MenuSnapshot::new(&repo);

        let err = snapshot
            .resolve_line(&input("missing", &[], &[]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "item not found");

        let err = snapshot
            .resolve_line(&input(CHEDDAR_BACON_ID, &[], &[("missing", 1)]))
            .await
            .unwrap_err();
        assert_eq!(err.message, "addon option not found");
    }
}
