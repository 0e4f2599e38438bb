use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A Faire product mirrored for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
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
    pub image_urls: Vec<String>,
    pub faire_created_at: Option<DateTime<Utc>>,
    pub faire_updated_at: Option<DateTime<Utc>>,
    pub last_synced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A Faire product variant mirrored for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
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
    pub options: Vec<VariantOption>,
    pub last_synced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOption {
    pub name: String,
    pub value: String,
}

/// Upsert input for a product, keyed by `(faire_product_id, store_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
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
    pub image_urls: Vec<String>,
    pub faire_created_at: Option<DateTime<Utc>>,
    pub faire_updated_at: Option<DateTime<Utc>>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<()> {
        if self.store_id.trim().is_empty() {
            return Err(Error::validation("Product store id cannot be empty"));
        }
        if self.faire_product_id.trim().is_empty() {
            return Err(Error::validation("Faire product id cannot be empty"));
        }
        Ok(())
    }
}

/// Upsert input for a variant, keyed by `(faire_variant_id, store_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductVariant {
    pub faire_variant_id: String,
    pub faire_product_id: String,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub wholesale_price_cents: Option<i64>,
    pub retail_price_cents: Option<i64>,
    pub currency: Option<String>,
    pub available_quantity: Option<i32>,
    pub lifecycle_state: Option<String>,
    pub options: Vec<VariantOption>,
}

impl NewProductVariant {
    pub fn validate(&self, product: &NewProduct) -> Result<()> {
        if self.faire_variant_id.trim().is_empty() {
            return Err(Error::validation(format!(
                "Variant of product {} has an empty Faire id",
                product.faire_product_id
            )));
        }
        if self.faire_product_id != product.faire_product_id {
            return Err(Error::validation(format!(
                "Variant {} belongs to product {}, not {}",
                self.faire_variant_id, self.faire_product_id, product.faire_product_id
            )));
        }
        Ok(())
    }
}

/// What an upsert did to the local row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Inserted,
    Updated,
}

/// Result of upserting a product together with its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpsertResult {
    pub product_id: String,
    pub action: UpsertAction,
    pub variants_inserted: usize,
    pub variants_updated: usize,
}
