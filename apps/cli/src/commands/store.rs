use faire_sync_core::stores::{NewStore, StoreRepositoryTrait};

use crate::context::ServiceContext;

pub async fn set(
    ctx: &ServiceContext,
    code: String,
    name: String,
    app_credentials: Option<String>,
    access_token: Option<String>,
) -> anyhow::Result<()> {
    let store = ctx
        .store_repository
        .upsert_store(NewStore {
            code,
            name,
            faire_app_credentials: app_credentials,
            faire_oauth_access_token: access_token,
        })
        .await?;

    println!(
        "Saved store {} ({}){}",
        store.code,
        store.name,
        if store.has_credentials() {
            ""
        } else {
            " - no stored credentials, the FAIRE_* environment variables will be used"
        }
    );
    Ok(())
}

pub fn list(ctx: &ServiceContext) -> anyhow::Result<()> {
    let stores = ctx.store_repository.list_stores()?;
    if stores.is_empty() {
        println!("No stores configured.");
        return Ok(());
    }
    for store in stores {
        println!(
            "{:<20} {:<30} credentials={}",
            store.code,
            store.name,
            if store.has_credentials() { "stored" } else { "env" }
        );
    }
    Ok(())
}
