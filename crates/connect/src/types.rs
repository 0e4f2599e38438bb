//! Faire external API v2 payloads.
//!
//! Only the fields the catalog mirror reads are modelled. Each product of a
//! page is decoded on its own, so a malformed record surfaces as a
//! [`ProductRecord::Malformed`] entry instead of failing the whole page.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One page of `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductsPage {
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    /// Opaque cursor for the next page. Absent on the last page.
    #[serde(default)]
    pub cursor: Option<String>,
}

/// A single entry of a products page.
#[derive(Debug, Clone)]
pub enum ProductRecord {
    Product(FaireProduct),
    /// The entry did not decode as a product. `id` is whatever string id
    /// the raw object carried.
    Malformed { id: Option<String>, error: String },
}

impl ProductRecord {
    pub fn faire_product_id(&self) -> Option<&str> {
        match self {
            ProductRecord::Product(product) => product.id.as_deref(),
            ProductRecord::Malformed { id, .. } => id.as_deref(),
        }
    }
}

impl From<FaireProduct> for ProductRecord {
    fn from(product: FaireProduct) -> Self {
        ProductRecord::Product(product)
    }
}

impl<'de> Deserialize<'de> for ProductRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match FaireProduct::deserialize(&value) {
            Ok(product) => ProductRecord::Product(product),
            Err(e) => ProductRecord::Malformed {
                id: value
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                error: format!("Malformed product record: {}", e),
            },
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaireProduct {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub sale_state: Option<String>,
    #[serde(default)]
    pub unit_multiplier: Option<i32>,
    #[serde(default)]
    pub minimum_order_quantity: Option<i32>,
    #[serde(default)]
    pub taxonomy_type: Option<FaireTaxonomyType>,
    #[serde(default)]
    pub images: Vec<FaireImage>,
    #[serde(default)]
    pub variants: Vec<FaireVariant>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaireTaxonomyType {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaireImage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaireVariant {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub available_quantity: Option<i32>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub options: Vec<FaireVariantOption>,
    #[serde(default)]
    pub prices: Vec<FairePrice>,
    /// Legacy flat price fields still returned for some brands.
    #[serde(default)]
    pub wholesale_price_cents: Option<i64>,
    #[serde(default)]
    pub retail_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaireVariantOption {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FairePrice {
    #[serde(default)]
    pub geo_constraint: Option<FaireGeoConstraint>,
    #[serde(default)]
    pub wholesale_price: Option<FaireMoney>,
    #[serde(default)]
    pub retail_price: Option<FaireMoney>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaireGeoConstraint {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_group: Option<String>,
}

/// Money in minor units (cents for USD).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaireMoney {
    pub amount_minor: i64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Error body returned by the Faire API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorResponse {
    /// Human readable form, `None` when the body carries nothing useful.
    pub fn describe(&self) -> Option<String> {
        match (self.error_type.as_deref(), self.message.as_deref()) {
            (Some(kind), Some(message)) => Some(format!("{}: {}", kind, message)),
            (None, Some(message)) => Some(message.to_string()),
            (Some(kind), None) => Some(kind.to_string()),
            (None, None) => None,
        }
    }
}
