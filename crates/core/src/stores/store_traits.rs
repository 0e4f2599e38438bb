use async_trait::async_trait;

use super::{NewStore, Store};
use crate::errors::Result;

#[async_trait]
pub trait StoreRepositoryTrait: Send + Sync {
    /// Returns the store with the given code, or `None` when absent.
    fn get_store_by_code(&self, code: &str) -> Result<Option<Store>>;

    fn list_stores(&self) -> Result<Vec<Store>>;

    /// Inserts a store or updates the existing row with the same code.
    /// Credentials left as `None` keep their stored values.
    async fn upsert_store(&self, new_store: NewStore) -> Result<Store>;
}
