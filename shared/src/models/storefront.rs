//! Storefront view models
//!
//! These mirror the commerce platform's product/collection/cart JSON so that
//! an existing storefront client can render catalog rows unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    pub alt_text: String,
    pub width: i32,
    pub height: i32,
}

impl Image {
    /// Placeholder used when a wine has no images
    pub fn empty() -> Self {
        Self {
            url: String::new(),
            alt_text: String::new(),
            width: 0,
            height: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_variant_price: Money,
    pub max_variant_price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: String,
    pub name: String,
    pub values: Vec<OptionValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: Uuid,
    pub title: String,
    pub available_for_sale: bool,
    pub selected_options: Vec<SelectedOption>,
    pub price: Money,
}

/// A wine in the storefront's product shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub handle: String,
    pub category_id: Option<Uuid>,
    pub description: String,
    pub description_html: String,
    /// Producer name
    pub vendor: Option<String>,
    pub featured_image: Image,
    pub currency_code: String,
    pub price_range: PriceRange,
    pub compare_at_price: Option<Money>,
    pub seo: Seo,
    pub options: Vec<ProductOption>,
    pub tags: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<Image>,
    pub available_for_sale: bool,
}

/// A collection in the storefront's shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCollection {
    pub handle: String,
    pub title: String,
    pub description: String,
    pub seo: Seo,
    pub parent_category_tree: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandise {
    pub variant_id: Uuid,
    pub title: String,
    pub bottle_size: String,
    pub price: Money,
    pub available_for_sale: bool,
    pub wine_id: Uuid,
    pub wine_title: String,
    pub wine_handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCartLine {
    pub id: Uuid,
    pub quantity: i32,
    pub cost: Money,
    pub merchandise: CartMerchandise,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    pub subtotal_amount: Money,
    pub total_amount: Money,
}

/// A cart in the storefront's shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCart {
    pub id: Uuid,
    pub checkout_url: String,
    pub total_quantity: i64,
    pub cost: CartCost,
    pub lines: Vec<StoreCartLine>,
}
