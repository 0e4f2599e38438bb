//! Repository for mirrored Faire products and their variants.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use faire_sync_core::products::{
    NewProduct, NewProductVariant, Product, ProductRepositoryTrait, ProductUpsertResult,
    ProductVariant, UpsertAction,
};
use faire_sync_core::Result;

use super::model::{ProductDB, ProductRefreshDB, ProductVariantDB, ProductVariantRefreshDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{faire_product_variants, faire_products};

fn upsert_product_row(
    conn: &mut SqliteConnection,
    product: &NewProduct,
    now: NaiveDateTime,
) -> Result<(String, UpsertAction)> {
    let existing_id = faire_products::table
        .filter(faire_products::faire_product_id.eq(&product.faire_product_id))
        .filter(faire_products::store_id.eq(&product.store_id))
        .select(faire_products::id)
        .first::<String>(conn)
        .optional()
        .map_err(StorageError::from)?;

    if let Some(id) = existing_id {
        let row = ProductDB::from_new(id, product, now)?;
        diesel::update(faire_products::table.find(&row.id))
            .set(ProductRefreshDB::from(&row))
            .execute(conn)
            .map_err(StorageError::from)?;
        return Ok((row.id, UpsertAction::Updated));
    }

    let row = ProductDB::from_new(Uuid::new_v4().to_string(), product, now)?;
    diesel::insert_into(faire_products::table)
        .values(&row)
        .on_conflict((faire_products::faire_product_id, faire_products::store_id))
        .do_update()
        .set(ProductRefreshDB::from(&row))
        .execute(conn)
        .map_err(StorageError::from)?;

    Ok((row.id, UpsertAction::Inserted))
}

fn upsert_variant_row(
    conn: &mut SqliteConnection,
    store_id: &str,
    product_id: &str,
    variant: &NewProductVariant,
    now: NaiveDateTime,
) -> Result<UpsertAction> {
    let existing_id = faire_product_variants::table
        .filter(faire_product_variants::faire_variant_id.eq(&variant.faire_variant_id))
        .filter(faire_product_variants::store_id.eq(store_id))
        .select(faire_product_variants::id)
        .first::<String>(conn)
        .optional()
        .map_err(StorageError::from)?;

    if let Some(id) = existing_id {
        let row = ProductVariantDB::from_new(id, store_id, product_id, variant, now)?;
        diesel::update(faire_product_variants::table.find(&row.id))
            .set(ProductVariantRefreshDB::from(&row))
            .execute(conn)
            .map_err(StorageError::from)?;
        return Ok(UpsertAction::Updated);
    }

    let row = ProductVariantDB::from_new(
        Uuid::new_v4().to_string(),
        store_id,
        product_id,
        variant,
        now,
    )?;
    diesel::insert_into(faire_product_variants::table)
        .values(&row)
        .on_conflict((
            faire_product_variants::faire_variant_id,
            faire_product_variants::store_id,
        ))
        .do_update()
        .set(ProductVariantRefreshDB::from(&row))
        .execute(conn)
        .map_err(StorageError::from)?;

    Ok(UpsertAction::Inserted)
}

pub struct ProductRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ProductRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    async fn upsert_product(
        &self,
        product: NewProduct,
        variants: Vec<NewProductVariant>,
    ) -> Result<ProductUpsertResult> {
        product.validate()?;
        for variant in &variants {
            variant.validate(&product)?;
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ProductUpsertResult> {
                let now = Utc::now().naive_utc();
                let (product_id, action) = upsert_product_row(conn, &product, now)?;

                let mut variants_inserted = 0;
                let mut variants_updated = 0;
                for variant in &variants {
                    match upsert_variant_row(conn, &product.store_id, &product_id, variant, now)? {
                        UpsertAction::Inserted => variants_inserted += 1,
                        UpsertAction::Updated => variants_updated += 1,
                    }
                }

                Ok(ProductUpsertResult {
                    product_id,
                    action,
                    variants_inserted,
                    variants_updated,
                })
            })
            .await
    }

    fn list_products(&self, store_id: &str) -> Result<Vec<Product>> {
        let mut conn = get_connection(&self.pool)?;
        faire_products::table
            .filter(faire_products::store_id.eq(store_id))
            .order((faire_products::name.asc(), faire_products::faire_product_id.asc()))
            .select(ProductDB::as_select())
            .load::<ProductDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    fn list_variants(&self, product_id: &str) -> Result<Vec<ProductVariant>> {
        let mut conn = get_connection(&self.pool)?;
        faire_product_variants::table
            .filter(faire_product_variants::product_id.eq(product_id))
            .order(faire_product_variants::faire_variant_id.asc())
            .select(ProductVariantDB::as_select())
            .load::<ProductVariantDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(ProductVariant::try_from)
            .collect()
    }

    fn count_products(&self, store_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = faire_products::table
            .filter(faire_products::store_id.eq(store_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn list_stale_products(
        &self,
        store_id: &str,
        synced_before: DateTime<Utc>,
    ) -> Result<Vec<Product>> {
        let mut conn = get_connection(&self.pool)?;
        faire_products::table
            .filter(faire_products::store_id.eq(store_id))
            .filter(faire_products::last_synced_at.lt(synced_before.naive_utc()))
            .order(faire_products::last_synced_at.asc())
            .select(ProductDB::as_select())
            .load::<ProductDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }
}
