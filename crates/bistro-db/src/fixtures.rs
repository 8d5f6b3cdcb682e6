//! # Demo Catalog
//!
//! A small fixed-id catalog shared by tests, the `seed` binary and the CLI.
//!
//! ```text
//! Menu "Main"
//! ├── Burgers
//! │   ├── Cheddar Bacon ........ 39.90
//! │   │   ├── Extras (optional, max 3)
//! │   │   │   ├── Bacon ........ 5.00
//! │   │   │   ├── Extra cheddar  4.00
//! │   │   │   └── Caramelised onion 3.50
//! │   │   └── Sauces (optional, max 2)
//! │   │       ├── House ........ 0.00
//! │   │       └── Barbecue ..... 1.50
//! │   └── Classic .............. 29.90
//! │       └── Size (required, exactly 1)
//! │           ├── Regular ...... +0.00 (default)
//! │           ├── Large ........ +8.00
//! │           └── Small ........ -3.00
//! └── Drinks
//!     └── Cola Can ............. 6.50
//! ```
//!
//! Loading goes through [`CatalogWriter`] upserts, so it is idempotent and
//! works against either adapter.

use bistro_core::catalog::{
    AddonGroup, AddonOption, Category, CategoryItem, Menu, VariantGroup, VariantOption,
};
use bistro_core::Money;
use chrono::Utc;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::memory::MemoryMenuRepository;
use crate::repository::CatalogWriter;

pub const STORE_ID: &str = "5a1c7e00-0000-4000-8000-000000000001";
pub const MENU_ID: &str = "5a1c7e00-0000-4000-8000-000000000002";
pub const DEMO_USER_ID: &str = "5a1c7e00-0000-4000-8000-0000000000aa";

pub const BURGERS_CATEGORY_ID: &str = "5a1c7e00-0000-4000-8000-000000000010";
pub const DRINKS_CATEGORY_ID: &str = "5a1c7e00-0000-4000-8000-000000000011";

pub const CHEDDAR_BACON_ID: &str = "5a1c7e00-0000-4000-8000-000000000100";
pub const CLASSIC_ID: &str = "5a1c7e00-0000-4000-8000-000000000101";
pub const COLA_ID: &str = "5a1c7e00-0000-4000-8000-000000000102";

pub const EXTRAS_GROUP_ID: &str = "5a1c7e00-0000-4000-8000-000000000200";
pub const SAUCES_GROUP_ID: &str = "5a1c7e00-0000-4000-8000-000000000201";
pub const SIZE_GROUP_ID: &str = "5a1c7e00-0000-4000-8000-000000000300";

pub const BACON_ID: &str = "5a1c7e00-0000-4000-8000-000000000210";
pub const EXTRA_CHEDDAR_ID: &str = "5a1c7e00-0000-4000-8000-000000000211";
pub const ONION_ID: &str = "5a1c7e00-0000-4000-8000-000000000212";
pub const HOUSE_SAUCE_ID: &str = "5a1c7e00-0000-4000-8000-000000000220";
pub const BBQ_SAUCE_ID: &str = "5a1c7e00-0000-4000-8000-000000000221";

pub const SIZE_REGULAR_ID: &str = "5a1c7e00-0000-4000-8000-000000000310";
pub const SIZE_LARGE_ID: &str = "5a1c7e00-0000-4000-8000-000000000311";
pub const SIZE_SMALL_ID: &str = "5a1c7e00-0000-4000-8000-000000000312";

fn item(id: &str, category_id: &str, name: &str, description: &str, cents: i64) -> CategoryItem {
    let now = Utc::now();
    CategoryItem {
        id: id.to_string(),
        category_id: category_id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        base_price: Money::from_cents(cents),
        image_url: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn addon_group(id: &str, name: &str, max_select: i64, display_order: i64) -> AddonGroup {
    AddonGroup {
        id: id.to_string(),
        item_id: CHEDDAR_BACON_ID.to_string(),
        name: name.to_string(),
        required: false,
        min_select: 0,
        max_select,
        display_order,
        is_active: true,
    }
}

fn addon_option(id: &str, group_id: &str, name: &str, cents: i64, display_order: i64) -> AddonOption {
    AddonOption {
        id: id.to_string(),
        group_id: group_id.to_string(),
        name: name.to_string(),
        price: Money::from_cents(cents),
        display_order,
        is_active: true,
    }
}

fn size_option(id: &str, name: &str, delta: i64, is_default: bool, display_order: i64) -> VariantOption {
    VariantOption {
        id: id.to_string(),
        group_id: SIZE_GROUP_ID.to_string(),
        name: name.to_string(),
        price_delta: Money::from_cents(delta),
        is_default,
        display_order,
        is_active: true,
    }
}

/// Upserts the demo catalog through any writer. Parents go first so the
/// SQLite foreign keys hold.
pub async fn seed_catalog(writer: &dyn CatalogWriter) -> DbResult<()> {
    writer
        .upsert_menu(&Menu {
            id: MENU_ID.to_string(),
            store_id: STORE_ID.to_string(),
            name: "Main".to_string(),
            is_active: true,
        })
        .await?;

    for (id, name, order) in [
        (BURGERS_CATEGORY_ID, "Burgers", 1),
        (DRINKS_CATEGORY_ID, "Drinks", 2),
    ] {
        writer
            .upsert_category(&Category {
                id: id.to_string(),
                menu_id: MENU_ID.to_string(),
                name: name.to_string(),
                display_order: order,
                is_active: true,
            })
            .await?;
    }

    writer
        .upsert_item(&item(
            CHEDDAR_BACON_ID,
            BURGERS_CATEGORY_ID,
            "Cheddar Bacon",
            "Beef patty, cheddar, bacon",
            3990,
        ))
        .await?;
    writer
        .upsert_item(&item(
            CLASSIC_ID,
            BURGERS_CATEGORY_ID,
            "Classic",
            "Beef patty, lettuce, tomato",
            2990,
        ))
        .await?;
    writer
        .upsert_item(&item(COLA_ID, DRINKS_CATEGORY_ID, "Cola Can", "350 ml", 650))
        .await?;

    writer
        .upsert_addon_group(&addon_group(EXTRAS_GROUP_ID, "Extras", 3, 1))
        .await?;
    writer
        .upsert_addon_group(&addon_group(SAUCES_GROUP_ID, "Sauces", 2, 2))
        .await?;

    for option in [
        addon_option(BACON_ID, EXTRAS_GROUP_ID, "Bacon", 500, 1),
        addon_option(EXTRA_CHEDDAR_ID, EXTRAS_GROUP_ID, "Extra cheddar", 400, 2),
        addon_option(ONION_ID, EXTRAS_GROUP_ID, "Caramelised onion", 350, 3),
        addon_option(HOUSE_SAUCE_ID, SAUCES_GROUP_ID, "House", 0, 1),
        addon_option(BBQ_SAUCE_ID, SAUCES_GROUP_ID, "Barbecue", 150, 2),
    ] {
        writer.upsert_addon_option(&option).await?;
    }

    writer
        .upsert_variant_group(&VariantGroup {
            id: SIZE_GROUP_ID.to_string(),
            item_id: CLASSIC_ID.to_string(),
            name: "Size".to_string(),
            required: true,
            min_select: 1,
            max_select: 1,
            display_order: 1,
            is_active: true,
        })
        .await?;

    for option in [
        size_option(SIZE_REGULAR_ID, "Regular", 0, true, 1),
        size_option(SIZE_LARGE_ID, "Large", 800, false, 2),
        size_option(SIZE_SMALL_ID, "Small", -300, false, 3),
    ] {
        writer.upsert_variant_option(&option).await?;
    }

    info!(menu_id = MENU_ID, store_id = STORE_ID, "Demo catalog loaded");
    Ok(())
}

/// Loads the demo catalog into an in-memory catalog.
pub async fn seed_memory(repo: &MemoryMenuRepository) -> DbResult<()> {
    seed_catalog(repo).await
}

/// Loads the demo catalog into a SQLite database.
pub async fn seed_sqlite(db: &Database) -> DbResult<()> {
    seed_catalog(&db.menu()).await
}

// =============================================================================
// Unit Tests
// =============================================================================
