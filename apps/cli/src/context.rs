use std::sync::Arc;

use anyhow::Context;
use faire_sync_core::stores::{Store, StoreRepositoryTrait};
use faire_sync_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, ProductRepository, StoreRepository,
    SyncLogRepository,
};

/// Repositories backed by one SQLite database.
pub struct ServiceContext {
    pub store_repository: Arc<StoreRepository>,
    pub product_repository: Arc<ProductRepository>,
    pub sync_log_repository: Arc<SyncLogRepository>,
}

impl ServiceContext {
    /// Opens (creating and migrating if needed) the database at `database_url`.
    pub fn open(database_url: &str) -> anyhow::Result<Self> {
        let db_path = init(database_url)
            .with_context(|| format!("Failed to open database {}", database_url))?;
        run_migrations(&db_path).context("Failed to run database migrations")?;

        let pool = create_pool(&db_path)?;
        let writer = spawn_writer(pool.as_ref().clone());
        tracing::debug!("Database ready at {}", db_path);

        Ok(Self {
            store_repository: Arc::new(StoreRepository::new(pool.clone(), writer.clone())),
            product_repository: Arc::new(ProductRepository::new(pool.clone(), writer.clone())),
            sync_log_repository: Arc::new(SyncLogRepository::new(pool, writer)),
        })
    }

    pub fn require_store(&self, code: &str) -> anyhow::Result<Store> {
        self.store_repository
            .get_store_by_code(code)?
            .with_context(|| {
                format!(
                    "Unknown store '{}'. Create it with `faire-sync store set --code {} --name ...`",
                    code, code
                )
            })
    }
}
