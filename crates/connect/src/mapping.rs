//! Maps Faire API records onto local mirror rows.

use chrono::{DateTime, Utc};
use faire_sync_core::products::{NewProduct, NewProductVariant, VariantOption};
use log::debug;

use crate::error::{ConnectError, Result};
use crate::types::{FairePrice, FaireProduct, FaireVariant};

/// Geo constraint whose prices are mirrored when a variant has several.
const PREFERRED_PRICE_COUNTRY: &str = "USA";

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_timestamp(value: Option<&String>) -> Option<DateTime<Utc>> {
    let raw = value.map(|v| v.trim()).filter(|v| !v.is_empty())?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            debug!("[FaireSync] Ignoring unparseable timestamp '{}': {}", raw, e);
            None
        }
    }
}

/// Picks the price entry to mirror: the `USA` one if present, else the first.
fn select_price(prices: &[FairePrice]) -> Option<&FairePrice> {
    prices
        .iter()
        .find(|price| {
            price
                .geo_constraint
                .as_ref()
                .and_then(|geo| geo.country.as_deref())
                .is_some_and(|country| country.eq_ignore_ascii_case(PREFERRED_PRICE_COUNTRY))
        })
        .or_else(|| prices.first())
}

struct VariantPricing {
    wholesale_price_cents: Option<i64>,
    retail_price_cents: Option<i64>,
    currency: Option<String>,
}

fn variant_pricing(variant: &FaireVariant) -> VariantPricing {
    match select_price(&variant.prices) {
        Some(price) => {
            let currency = price
                .wholesale_price
                .as_ref()
                .and_then(|money| money.currency.clone())
                .or_else(|| {
                    price
                        .retail_price
                        .as_ref()
                        .and_then(|money| money.currency.clone())
                });
            VariantPricing {
                wholesale_price_cents: price.wholesale_price.as_ref().map(|m| m.amount_minor),
                retail_price_cents: price.retail_price.as_ref().map(|m| m.amount_minor),
                currency,
            }
        }
        None => VariantPricing {
            wholesale_price_cents: variant.wholesale_price_cents,
            retail_price_cents: variant.retail_price_cents,
            currency: None,
        },
    }
}

fn map_variant(faire_product_id: &str, variant: &FaireVariant) -> Result<NewProductVariant> {
    let faire_variant_id = non_empty(variant.id.as_ref()).ok_or_else(|| {
        ConnectError::mapping(format!(
            "Variant of product {} is missing an id",
            faire_product_id
        ))
    })?;

    if let Some(parent) = non_empty(variant.product_id.as_ref()) {
        if parent != faire_product_id {
            return Err(ConnectError::mapping(format!(
                "Variant {} belongs to product {}, not {}",
                faire_variant_id, parent, faire_product_id
            )));
        }
    }

    let pricing = variant_pricing(variant);
    let options = variant
        .options
        .iter()
        .filter_map(|option| {
            Some(VariantOption {
                name: non_empty(option.name.as_ref())?,
                value: non_empty(option.value.as_ref())?,
            })
        })
        .collect();

    Ok(NewProductVariant {
        faire_variant_id,
        faire_product_id: faire_product_id.to_string(),
        name: non_empty(variant.name.as_ref()),
        sku: non_empty(variant.sku.as_ref()),
        wholesale_price_cents: pricing.wholesale_price_cents,
        retail_price_cents: pricing.retail_price_cents,
        currency: pricing.currency,
        available_quantity: variant.available_quantity,
        lifecycle_state: non_empty(variant.lifecycle_state.as_ref()),
        options,
    })
}

/// Maps one API product and its variants into upsert inputs for `store_id`.
pub fn map_product(
    store_id: &str,
    product: &FaireProduct,
) -> Result<(NewProduct, Vec<NewProductVariant>)> {
    let faire_product_id = non_empty(product.id.as_ref())
        .ok_or_else(|| ConnectError::mapping("Product record is missing an id"))?;
    let name = non_empty(product.name.as_ref()).unwrap_or_else(|| {
        debug!(
            "[FaireSync] Product {} has no name, using its id",
            faire_product_id
        );
        faire_product_id.clone()
    });

    let variants = product
        .variants
        .iter()
        .map(|variant| map_variant(&faire_product_id, variant))
        .collect::<Result<Vec<_>>>()?;

    let image_urls = product
        .images
        .iter()
        .filter_map(|image| non_empty(image.url.as_ref()))
        .collect();

    let new_product = NewProduct {
        store_id: store_id.to_string(),
        faire_product_id,
        faire_brand_id: non_empty(product.brand_id.as_ref()),
        name,
        short_description: non_empty(product.short_description.as_ref()),
        description: non_empty(product.description.as_ref()),
        lifecycle_state: non_empty(product.lifecycle_state.as_ref()),
        sale_state: non_empty(product.sale_state.as_ref()),
        unit_multiplier: product.unit_multiplier,
        minimum_order_quantity: product.minimum_order_quantity,
        taxonomy_type: product
            .taxonomy_type
            .as_ref()
            .and_then(|taxonomy| non_empty(taxonomy.name.as_ref())),
        image_urls,
        faire_created_at: parse_timestamp(product.created_at.as_ref()),
        faire_updated_at: parse_timestamp(product.updated_at.as_ref()),
    };

    Ok((new_product, variants))
}
