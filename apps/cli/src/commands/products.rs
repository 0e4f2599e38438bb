use chrono::{DateTime, Utc};
use faire_sync_core::products::{Product, ProductRepositoryTrait};
use faire_sync_core::sync::{SyncLogRepositoryTrait, SyncStatus};

use super::or_dash;
use crate::context::ServiceContext;

/// How many recent runs are searched for the last completed one.
const RECENT_LOG_WINDOW: i64 = 50;

fn print_products(products: &[Product]) {
    for product in products {
        println!(
            "{:<24} {:<40} {:<12} synced {}",
            product.faire_product_id,
            product.name,
            or_dash(product.lifecycle_state.as_deref()),
            product.last_synced_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

pub fn list(ctx: &ServiceContext, store_code: &str) -> anyhow::Result<()> {
    let store = ctx.require_store(store_code)?;
    let products = ctx.product_repository.list_products(&store.id)?;
    print_products(&products);
    println!("{} product(s) mirrored for {}", products.len(), store.code);
    Ok(())
}

/// Lists products the upstream catalog no longer returns.
///
/// Without `before`, the cutoff is the start of the latest completed sync:
/// anything that run did not touch is stale.
pub fn stale(
    ctx: &ServiceContext,
    store_code: &str,
    before: Option<DateTime<Utc>>,
) -> anyhow::Result<()> {
    let store = ctx.require_store(store_code)?;
    let cutoff = match before {
        Some(cutoff) => cutoff,
        None => ctx
            .sync_log_repository
            .list_sync_logs(Some(&store.id), RECENT_LOG_WINDOW)?
            .into_iter()
            .find(|log| log.status == SyncStatus::Completed)
            .map(|log| log.started_at)
            .ok_or_else(|| {
                anyhow::anyhow!("No completed sync for store {}; pass --before", store.code)
            })?,
    };

    let products = ctx.product_repository.list_stale_products(&store.id, cutoff)?;
    print_products(&products);
    println!(
        "{} product(s) not synced since {}",
        products.len(),
        cutoff.format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}
