//! # Menu Repository (SQLite)
//!
//! Catalog reads for pricing and validation, plus the upserts used by
//! the fixtures loader. Prices live in `*_cents` columns and decode straight
//! into `Money`.

use async_trait::async_trait;
use bistro_core::catalog::{
    AddonGroup, AddonOption, Category, CategoryItem, Menu, VariantGroup, VariantOption,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{CatalogWriter, MenuReadRepository};

/// Repository for menu catalog data.
#[derive(Debug, Clone)]
pub struct SqliteMenuRepository {
    pool: SqlitePool,
}

impl SqliteMenuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteMenuRepository { pool }
    }

    /// Number of items in the catalog, active or not.
    pub async fn item_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn item_from_row(row: &SqliteRow) -> DbResult<CategoryItem> {
    Ok(CategoryItem {
        id: row.try_get("id")?,
        category_id: row.try_get("category_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        base_price: row.try_get("base_price_cents")?,
        image_url: row.try_get("image_url")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn addon_group_from_row(row: &SqliteRow) -> DbResult<AddonGroup> {
    Ok(AddonGroup {
        id: row.try_get("id")?,
        item_id: row.try_get("item_id")?,
        name: row.try_get("name")?,
        required: row.try_get("required")?,
        min_select: row.try_get("min_select")?,
        max_select: row.try_get("max_select")?,
        display_order: row.try_get("display_order")?,
        is_active: row.try_get("is_active")?,
    })
}

fn addon_option_from_row(row: &SqliteRow) -> DbResult<AddonOption> {
    Ok(AddonOption {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        name: row.try_get("name")?,
        price: row.try_get("price_cents")?,
        display_order: row.try_get("display_order")?,
        is_active: row.try_get("is_active")?,
    })
}

fn variant_group_from_row(row: &SqliteRow) -> DbResult<VariantGroup> {
    Ok(VariantGroup {
        id: row.try_get("id")?,
        item_id: row.try_get("item_id")?,
        name: row.try_get("name")?,
        required: row.try_get("required")?,
        min_select: row.try_get("min_select")?,
        max_select: row.try_get("max_select")?,
        display_order: row.try_get("display_order")?,
        is_active: row.try_get("is_active")?,
    })
}

fn variant_option_from_row(row: &SqliteRow) -> DbResult<VariantOption> {
    Ok(VariantOption {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        name: row.try_get("name")?,
        price_delta: row.try_get("price_delta_cents")?,
        is_default: row.try_get("is_default")?,
        display_order: row.try_get("display_order")?,
        is_active: row.try_get("is_active")?,
    })
}

// =============================================================================
// Reads
// =============================================================================

#[async_trait]
impl MenuReadRepository for SqliteMenuRepository {
    async fn get_item(&self, id: &str) -> DbResult<CategoryItem> {
        let row = sqlx::query(
            r#"
            SELECT id, category_id, name, description, base_price_cents,
                   image_url, is_active, created_at, updated_at
            FROM category_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("item", id))?;

        item_from_row(&row)
    }

    async fn list_addon_groups(&self, item_id: &str) -> DbResult<Vec<AddonGroup>> {
        let rows = sqlx::query(
            r#"
            SELECT id, item_id, name, required, min_select, max_select,
                   display_order, is_active
            FROM addon_groups
            WHERE item_id = ?1
            ORDER BY display_order, id
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(addon_group_from_row).collect()
    }

    async fn get_addon_group(&self, id: &str) -> DbResult<AddonGroup> {
        let row = sqlx::query(
            r#"
            SELECT id, item_id, name, required, min_select, max_select,
                   display_order, is_active
            FROM addon_groups
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("addon group", id))?;

        addon_group_from_row(&row)
    }

    async fn get_addon_option(&self, id: &str) -> DbResult<AddonOption> {
        let row = sqlx::query(
            r#"
            SELECT id, group_id, name, price_cents, display_order, is_active
            FROM addon_options
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("addon option", id))?;

        addon_option_from_row(&row)
    }

    async fn list_variant_groups(&self, item_id: &str) -> DbResult<Vec<VariantGroup>> {
        let rows = sqlx::query(
            r#"
            SELECT id, item_id, name, required, min_select, max_select,
                   display_order, is_active
            FROM variant_groups
            WHERE item_id = ?1
            ORDER BY display_order, id
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(variant_group_from_row).collect()
    }

    async fn get_variant_group(&self, id: &str) -> DbResult<VariantGroup> {
        let row = sqlx::query(
            r#"
            SELECT id, item_id, name, required, min_select, max_select,
                   display_order, is_active
            FROM variant_groups
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("variant group", id))?;

        variant_group_from_row(&row)
    }

    async fn get_variant_option(&self, id: &str) -> DbResult<VariantOption> {
        let row = sqlx::query(
            r#"
            SELECT id, group_id, name, price_delta_cents, is_default,
                   display_order, is_active
            FROM variant_options
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("variant option", id))?;

        variant_option_from_row(&row)
    }
}

// =============================================================================
// Upserts
// =============================================================================

#[async_trait]
impl CatalogWriter for SqliteMenuRepository {
    async fn upsert_menu(&self, menu: &Menu) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO menus (id, store_id, name, is_active)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                store_id = excluded.store_id,
                name = excluded.name,
                is_active = excluded.is_active
            "#,
        )
        .bind(&menu.id)
        .bind(&menu.store_id)
        .bind(&menu.name)
        .bind(menu.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_category(&self, category: &Category) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, menu_id, name, display_order, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                menu_id = excluded.menu_id,
                name = excluded.name,
                display_order = excluded.display_order,
                is_active = excluded.is_active
            "#,
        )
        .bind(&category.id)
        .bind(&category.menu_id)
        .bind(&category.name)
        .bind(category.display_order)
        .bind(category.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_item(&self, item: &CategoryItem) -> DbResult<()> {
        debug!(item_id = %item.id, name = %item.name, "Upserting item");

        sqlx::query(
            r#"
            INSERT INTO category_items (
                id, category_id, name, description, base_price_cents,
                image_url, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                category_id = excluded.category_id,
                name = excluded.name,
                description = excluded.description,
                base_price_cents = excluded.base_price_cents,
                image_url = excluded.image_url,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&item.id)
        .bind(&item.category_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.base_price)
        .bind(&item.image_url)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_addon_group(&self, group: &AddonGroup) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO addon_groups (
                id, item_id, name, required, min_select, max_select,
                display_order, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                item_id = excluded.item_id,
                name = excluded.name,
                required = excluded.required,
                min_select = excluded.min_select,
                max_select = excluded.max_select,
                display_order = excluded.display_order,
                is_active = excluded.is_active
            "#,
        )
        .bind(&group.id)
        .bind(&group.item_id)
        .bind(&group.name)
        .bind(group.required)
        .bind(group.min_select)
        .bind(group.max_select)
        .bind(group.display_order)
        .bind(group.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_addon_option(&self, option: &AddonOption) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO addon_options (
                id, group_id, name, price_cents, display_order, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                group_id = excluded.group_id,
                name = excluded.name,
                price_cents = excluded.price_cents,
                display_order = excluded.display_order,
                is_active = excluded.is_active
            "#,
        )
        .bind(&option.id)
        .bind(&option.group_id)
        .bind(&option.name)
        .bind(option.price)
        .bind(option.display_order)
        .bind(option.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_variant_group(&self, group: &VariantGroup) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO variant_groups (
                id, item_id, name, required, min_select, max_select,
                display_order, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                item_id = excluded.item_id,
                name = excluded.name,
                required = excluded.required,
                min_select = excluded.min_select,
                max_select = excluded.max_select,
                display_order = excluded.display_order,
                is_active = excluded.is_active
            "#,
        )
        .bind(&group.id)
        .bind(&group.item_id)
        .bind(&group.name)
        .bind(group.required)
        .bind(group.min_select)
        .bind(group.max_select)
        .bind(group.display_order)
        .bind(group.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_variant_option(&self, option: &VariantOption) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO variant_options (
                id, group_id, name, price_delta_cents, is_default,
                display_order, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                group_id = excluded.group_id,
                name = excluded.name,
                price_delta_cents = excluded.price_delta_cents,
                is_default = excluded.is_default,
                display_order = excluded.display_order,
                is_active = excluded.is_active
            "#,
        )
        .bind(&option.id)
        .bind(&option.group_id)
        .bind(&option.name)
        .bind(option.price_delta)
        .bind(option.is_default)
        .bind(option.display_order)
        .bind(option.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
