//! Wine, variant and image models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A wine as stored in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Wine {
    pub id: Uuid,
    pub title: String,
    pub handle: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub product_type: String,
    /// Collection the wine is listed under
    pub category_id: Option<Uuid>,
    pub producer_id: Option<Uuid>,
    pub vintage: Option<i32>,
    pub wine_type: Option<String>,
    pub grape_varieties: Vec<String>,
    pub alcohol_content: Option<Decimal>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub price_range_min: Decimal,
    pub price_range_max: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub currency_code: String,
    /// Bottles needed to fill one pallet of this wine
    pub bottles_per_pallet: i32,
    pub min_pallet_orders: i32,
    /// Upper bound on live (not shipped, not cancelled) pallets
    pub max_pallet_orders: i32,
    pub available_for_sale: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchasable configuration of a wine (e.g., bottle size)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WineVariant {
    pub id: Uuid,
    pub wine_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub available_for_sale: bool,
    pub bottle_size: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub weight_grams: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An image attached to a wine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WineImage {
    pub id: Uuid,
    pub wine_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub position: i32,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Wine types recognised on product cards
pub const WINE_TYPES: &[&str] = &["Red", "White", "Rosé", "Sparkling", "Dessert"];

/// Price range spanned by a wine's purchasable variants.
/// Returns None when no variant is available for sale.
pub fn variant_price_range(variants: &[WineVariant]) -> Option<(Decimal, Decimal)> {
    variants
        .iter()
        .filter(|v| v.available_for_sale)
        .map(|v| v.price)
        .fold(None, |range, price| match range {
            None => Some((price, price)),
            Some((min, max)) => Some((min.min(price), max.max(price))),
        })
}
