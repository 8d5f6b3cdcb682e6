use std::collections::HashMap;

use async_trait::async_trait;
use bistro_core::catalog::{
    AddonGroup, AddonOption, Category, CategoryItem, Menu, VariantGroup, VariantOption,
};
use tokio::sync::RwLock;

use crate::error::{DbError, DbResult};
use crate::repository::{CatalogWriter, MenuReadRepository};

#[derive(Default)]
struct Catalog {
    menus: HashMap<String, Menu>,
    categories: HashMap<String, Category>,
    items: HashMap<String, CategoryItem>,
    addon_groups: HashMap<String, AddonGroup>,
    addon_options: HashMap<String, AddonOption>,
    variant_groups: HashMap<String, VariantGroup>,
    variant_options: HashMap<String, VariantOption>,
}

/// Catalog held in maps. Readers get clones.
#[derive(Default)]
pub struct MemoryMenuRepository {
    catalog: RwLock<Catalog>,
}

impl MemoryMenuRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn item_count(&self) -> usize {
        self.catalog.read().await.items.len()
    }
}

fn lookup<T: Clone>(map: &HashMap<String, T>, entity: &str, id: &str) -> DbResult<T> {
    map.get(id).cloned().ok_or_else(|| DbError::not_found(entity, id))
}

#[async_trait]
impl MenuReadRepository for MemoryMenuRepository {
    async fn get_item(&self, id: &str) -> DbResult<CategoryItem> {
        lookup(&self.catalog.read().await.items, "item", id)
    }

    async fn list_addon_groups(&self, item_id: &str) -> DbResult<Vec<AddonGroup>> {
        let catalog = self.catalog.read().await;
        let mut groups: Vec<AddonGroup> = catalog
            .addon_groups
            .values()
            .filter(|g| g.item_id == item_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| (a.display_order, &a.id).cmp(&(b.display_order, &b.id)));
        Ok(groups)
    }

    async fn get_addon_group(&self, id: &str) -> DbResult<AddonGroup> {
        lookup(&self.catalog.read().await.addon_groups, "addon group", id)
    }

    async fn get_addon_option(&self, id: &str) -> DbResult<AddonOption> {
        lookup(&self.catalog.read().await.addon_options, "addon option", id)
    }

    async fn list_variant_groups(&self, item_id: &str) -> DbResult<Vec<VariantGroup>> {
        let catalog = self.catalog.read().await;
        let mut groups: Vec<VariantGroup> = catalog
            .variant_groups
            .values()
            .filter(|g| g.item_id == item_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| (a.display_order, &a.id).cmp(&(b.display_order, &b.id)));
        Ok(groups)
    }

    async fn get_variant_group(&self, id: &str) -> DbResult<VariantGroup> {
        lookup(&self.catalog.read().await.variant_groups, "variant group", id)
    }

    async fn get_variant_option(&self, id: &str) -> DbResult<VariantOption> {
        lookup(&self.catalog.read().await.variant_options, "variant option", id)
    }
}

#[async_trait]
impl CatalogWriter for MemoryMenuRepository {
    async fn upsert_menu(&self, menu: &Menu) -> DbResult<()> {
        self.catalog
            .write()
            .await
            .menus
            .insert(menu.id.clone(), menu.clone());
        Ok(())
    }

    async fn upsert_category(&self, category: &Category) -> DbResult<()> {
        self.catalog
            .write()
            .await
            .categories
            .insert(category.id.clone(), category.clone());
        Ok(())
    }

    async fn upsert_item(&self, item: &CategoryItem) -> DbResult<()> {
        self.catalog
            .write()
            .await
            .items
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn upsert_addon_group(&self, group: &AddonGroup) -> DbResult<()> {
        self.catalog
            .write()
            .await
            .addon_groups
            .insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn upsert_addon_option(&self, option: &AddonOption) -> DbResult<()> {
        self.catalog
            .write()
            .await
            .addon_options
            .insert(option.id.clone(), option.clone());
        Ok(())
    }

    async fn upsert_variant_group(&self, group: &VariantGroup) -> DbResult<()> {
        self.catalog
            .write()
            .await
            .variant_groups
            .insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn upsert_variant_option(&self, option: &VariantOption) -> DbResult<()> {
        self.catalog
            .write()
            .await
            .variant_options
            .insert(option.id.clone(), option.clone());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn test_gets_fail_with_not_found() {
        let repo = MemoryMenuRepository::new();
        assert!(repo.get_item("x").await.unwrap_err().is_not_found());
        assert!(repo.get_addon_group("x").await.unwrap_err().is_not_found());
        assert!(repo.get_addon_option("x").await.unwrap_err().is_not_found());
        assert!(repo.get_variant_group("x").await.unwrap_err().is_not_found());
        assert!(repo.get_variant_option("x").await.unwrap_err().is_not_found());
        assert!(repo.list_addon_groups("x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_groups_listed_by_display_order() {
        let repo = MemoryMenuRepository::new();
        fixtures::seed_memory(&repo).await.unwrap();

        let groups = repo.list_addon_groups(fixtures::CHEDDAR_BACON_ID).await.unwrap();
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec![fixtures::EXTRAS_GROUP_ID, fixtures::SAUCES_GROUP_ID]);

        let variants = repo.list_variant_groups(fixtures::CLASSIC_ID).await.unwrap();
        assert_eq!(variants.len(), 1);
        assert!(repo
            .list_variant_groups(fixtures::CHEDDAR_BACON_ID)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let repo = MemoryMenuRepository::new();
        fixtures::seed_memory(&repo).await.unwrap();

        let mut bacon = repo.get_addon_option(fixtures::BACON_ID).await.unwrap();
        bacon.is_active = false;
        repo.upsert_addon_option(&bacon).await.unwrap();

        assert!(!repo.get_addon_option(fixtures::BACON_ID).await.unwrap().is_active);
    }
}
