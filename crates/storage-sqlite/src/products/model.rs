//! Database models for mirrored products and variants.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use faire_sync_core::products::{
    NewProduct, NewProductVariant, Product, ProductVariant, VariantOption,
};
use faire_sync_core::Result;

fn to_utc(value: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&value)
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::faire_products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductDB {
    pub id: String,
    pub store_id: String,
    pub faire_product_id: String,
    pub faire_brand_id: Option<String>,
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub lifecycle_state: Option<String>,
    pub sale_state: Option<String>,
    pub unit_multiplier: Option<i32>,
    pub minimum_order_quantity: Option<i32>,
    pub taxonomy_type: Option<String>,
    pub image_urls: String,
    pub faire_created_at: Option<NaiveDateTime>,
    pub faire_updated_at: Option<NaiveDateTime>,
    pub last_synced_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ProductDB {
    pub fn from_new(id: String, new: &NewProduct, now: NaiveDateTime) -> Result<Self> {
        Ok(Self {
            id,
            store_id: new.store_id.clone(),
            faire_product_id: new.faire_product_id.clone(),
            faire_brand_id: new.faire_brand_id.clone(),
            name: new.name.clone(),
            short_description: new.short_description.clone(),
            description: new.description.clone(),
            lifecycle_state: new.lifecycle_state.clone(),
            sale_state: new.sale_state.clone(),
            unit_multiplier: new.unit_multiplier,
            minimum_order_quantity: new.minimum_order_quantity,
            taxonomy_type: new.taxonomy_type.clone(),
            image_urls: serde_json::to_string(&new.image_urls)?,
            faire_created_at: new.faire_created_at.map(|dt| dt.naive_utc()),
            faire_updated_at: new.faire_updated_at.map(|dt| dt.naive_utc()),
            last_synced_at: now,
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<ProductDB> for Product {
    type Error = faire_sync_core::Error;

    fn try_from(db: ProductDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            store_id: db.store_id,
            faire_product_id: db.faire_product_id,
            faire_brand_id: db.faire_brand_id,
            name: db.name,
            short_description: db.short_description,
            description: db.description,
            lifecycle_state: db.lifecycle_state,
            sale_state: db.sale_state,
            unit_multiplier: db.unit_multiplier,
            minimum_order_quantity: db.minimum_order_quantity,
            taxonomy_type: db.taxonomy_type,
            image_urls: serde_json::from_str(&db.image_urls)?,
            faire_created_at: db.faire_created_at.map(to_utc),
            faire_updated_at: db.faire_updated_at.map(to_utc),
            last_synced_at: to_utc(db.last_synced_at),
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        })
    }
}

/// Columns refreshed when an existing product row is upserted again.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::faire_products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductRefreshDB {
    pub faire_brand_id: Option<String>,
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub lifecycle_state: Option<String>,
    pub sale_state: Option<String>,
    pub unit_multiplier: Option<i32>,
    pub minimum_order_quantity: Option<i32>,
    pub taxonomy_type: Option<String>,
    pub image_urls: String,
    pub faire_created_at: Option<NaiveDateTime>,
    pub faire_updated_at: Option<NaiveDateTime>,
    pub last_synced_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&ProductDB> for ProductRefreshDB {
    fn from(row: &ProductDB) -> Self {
        Self {
            faire_brand_id: row.faire_brand_id.clone(),
            name: row.name.clone(),
            short_description: row.short_description.clone(),
            description: row.description.clone(),
            lifecycle_state: row.lifecycle_state.clone(),
            sale_state: row.sale_state.clone(),
            unit_multiplier: row.unit_multiplier,
            minimum_order_quantity: row.minimum_order_quantity,
            taxonomy_type: row.taxonomy_type.clone(),
            image_urls: row.image_urls.clone(),
            faire_created_at: row.faire_created_at,
            faire_updated_at: row.faire_updated_at,
            last_synced_at: row.last_synced_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::faire_product_variants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductVariantDB {
    pub id: String,
    pub store_id: String,
    pub product_id: String,
    pub faire_variant_id: String,
    pub faire_product_id: String,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub wholesale_price_cents: Option<i64>,
    pub retail_price_cents: Option<i64>,
    pub currency: Option<String>,
    pub available_quantity: Option<i32>,
    pub lifecycle_state: Option<String>,
    pub options: String,
    pub last_synced_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ProductVariantDB {
    pub fn from_new(
        id: String,
        store_id: &str,
        product_id: &str,
        new: &NewProductVariant,
        now: NaiveDateTime,
    ) -> Result<Self> {
        Ok(Self {
            id,
            store_id: store_id.to_string(),
            product_id: product_id.to_string(),
            faire_variant_id: new.faire_variant_id.clone(),
            faire_product_id: new.faire_product_id.clone(),
            name: new.name.clone(),
            sku: new.sku.clone(),
            wholesale_price_cents: new.wholesale_price_cents,
            retail_price_cents: new.retail_price_cents,
            currency: new.currency.clone(),
            available_quantity: new.available_quantity,
            lifecycle_state: new.lifecycle_state.clone(),
            options: serde_json::to_string(&new.options)?,
            last_synced_at: now,
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<ProductVariantDB> for ProductVariant {
    type Error = faire_sync_core::Error;

    fn try_from(db: ProductVariantDB) -> Result<Self> {
        let options: Vec<VariantOption> = serde_json::from_str(&db.options)?;
        Ok(Self {
            id: db.id,
            store_id: db.store_id,
            product_id: db.product_id,
            faire_variant_id: db.faire_variant_id,
            faire_product_id: db.faire_product_id,
            name: db.name,
            sku: db.sku,
            wholesale_price_cents: db.wholesale_price_cents,
            retail_price_cents: db.retail_price_cents,
            currency: db.currency,
            available_quantity: db.available_quantity,
            lifecycle_state: db.lifecycle_state,
            options,
            last_synced_at: to_utc(db.last_synced_at),
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        })
    }
}

/// Columns refreshed when an existing variant row is upserted again.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::faire_product_variants)]
#[diesel(treat_none_as_null = true)]
pub struct ProductVariantRefreshDB {
    pub product_id: String,
    pub faire_product_id: String,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub wholesale_price_cents: Option<i64>,
    pub retail_price_cents: Option<i64>,
    pub currency: Option<String>,
    pub available_quantity: Option<i32>,
    pub lifecycle_state: Option<String>,
    pub options: String,
    pub last_synced_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&ProductVariantDB> for ProductVariantRefreshDB {
    fn from(row: &ProductVariantDB) -> Self {
        Self {
            product_id: row.product_id.clone(),
            faire_product_id: row.faire_product_id.clone(),
            name: row.name.clone(),
            sku: row.sku.clone(),
            wholesale_price_cents: row.wholesale_price_cents,
            retail_price_cents: row.retail_price_cents,
            currency: row.currency.clone(),
            available_quantity: row.available_quantity,
            lifecycle_state: row.lifecycle_state.clone(),
            options: row.options.clone(),
            last_synced_at: row.last_synced_at,
            updated_at: row.updated_at,
        }
    }
}
