use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{NewProduct, NewProductVariant, Product, ProductUpsertResult, ProductVariant};
use crate::errors::Result;

#[async_trait]
pub trait ProductRepositoryTrait: Send + Sync {
    /// Writes a product and all of its variants atomically.
    ///
    /// Rows are matched on `(faire_product_id, store_id)` and
    /// `(faire_variant_id, store_id)`; repeated calls with the same input
    /// update in place and never create duplicates.
    async fn upsert_product(
        &self,
        product: NewProduct,
        variants: Vec<NewProductVariant>,
    ) -> Result<ProductUpsertResult>;

    fn list_products(&self, store_id: &str) -> Result<Vec<Product>>;

    fn list_variants(&self, product_id: &str) -> Result<Vec<ProductVariant>>;

    fn count_products(&self, store_id: &str) -> Result<i64>;

    /// Products not touched by any sync since `synced_before`.
    fn list_stale_products(
        &self,
        store_id: &str,
        synced_before: DateTime<Utc>,
    ) -> Result<Vec<Product>>;
}
