//! # Bistro CLI
//!
//! Runs one order for the demo user from draft to paid against a SQLite
//! database, printing every step as JSON.
//!
//! ## Usage
//! ```bash
//! cargo run -p bistro-cli
//! BISTRO_DATABASE_PATH=./shop.db BISTRO_ORDER_FEE_CENTS=500 cargo run -p bistro-cli
//! RUST_LOG=bistro_engine=debug cargo run -p bistro-cli
//! ```

mod config;

use anyhow::{bail, Context};
use bistro_core::AddonSelection;
use bistro_db::fixtures::{self, BACON_ID, CHEDDAR_BACON_ID, COLA_ID, DEMO_USER_ID, MENU_ID, STORE_ID};
use bistro_db::{Database, DbConfig};
use bistro_engine::{AddItemInput, Engine};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!(
        path = %config.database_path.display(),
        currency = %config.currency,
        order_fee_cents = config.order_fee_cents,
        "Starting Bistro walk-through"
    );

    let db = Database::new(DbConfig::new(config.database_path.clone()))
        .await
        .context("opening database")?;
    if config.seed {
        fixtures::seed_sqlite(&db).await.context("loading demo catalog")?;
    } else if db.menu().item_count().await? == 0 {
        bail!("catalog is empty; run with BISTRO_SEED=true or the seed binary first");
    }

    let result = walk_through(&Engine::with_database(&db, config.engine())).await;
    db.close().await;
    result
}

async fn walk_through(engine: &Engine) -> anyhow::Result<()> {
    let (draft, created) = engine
        .orders
        .get_or_create_draft(DEMO_USER_ID, STORE_ID, Some(MENU_ID))
        .await?;
    print_step("draft", &serde_json::json!({ "created": created, "order": draft }))?;

    let order = engine
        .orders
        .add_item(AddItemInput {
            order_id: draft.id.clone(),
            user_id: DEMO_USER_ID.to_string(),
            item_id: CHEDDAR_BACON_ID.to_string(),
            quantity: 1,
            addons: vec![AddonSelection::new(BACON_ID, 1)],
            ..Default::default()
        })
        .await?;
    print_step("add_item", &order)?;

    let order = engine
        .orders
        .add_item(AddItemInput {
            order_id: draft.id.clone(),
            user_id: DEMO_USER_ID.to_string(),
            item_id: COLA_ID.to_string(),
            quantity: 2,
            ..Default::default()
        })
        .await?;
    print_step("add_item", &order)?;

    let order = engine.orders.place_order(&draft.id, DEMO_USER_ID).await?;
    print_step("place_order", &order)?;

    // Editing a placed order is refused with a stable (kind, message).
    let refused = engine
        .orders
        .add_item(AddItemInput {
            order_id: order.id.clone(),
            user_id: DEMO_USER_ID.to_string(),
            item_id: COLA_ID.to_string(),
            quantity: 1,
            ..Default::default()
        })
        .await;
    if let Err(err) = refused {
        print_step("add_item_after_place", &err)?;
    }

    let key = format!("checkout-{}", order.id);
    let payment = engine
        .payments
        .create_payment(&order.id, DEMO_USER_ID, None, Some(&key))
        .await?;
    print_step("create_payment", &payment)?;

    let payment = engine.payments.confirm_payment(&payment.id, DEMO_USER_ID).await?;
    print_step("confirm_payment", &payment)?;

    let order = engine.orders.get_order(&order.id, DEMO_USER_ID).await?;
    print_step("order", &order)?;

    info!(order_id = %order.id, status = %order.status, total = %order.total, "Walk-through complete");
    Ok(())
}

fn print_step(step: &str, value: &impl Serialize) -> anyhow::Result<()> {
    println!("== {step}");
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
