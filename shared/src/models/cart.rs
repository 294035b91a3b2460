//! Cart models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{line_total, CartCost, CartMerchandise, StoreCart, StoreCartLine};
use crate::types::Money;

/// A shopping cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// A line in a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub wine_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with its variant and wine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLineDetail {
    pub line_id: Uuid,
    pub wine_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub variant_title: String,
    pub bottle_size: String,
    pub price: Decimal,
    pub available_for_sale: bool,
    pub wine_title: String,
    pub wine_handle: String,
    pub currency_code: String,
}

/// Build the storefront cart from its joined lines.
/// The cart currency is taken from the first line, falling back to
/// `default_currency` for an empty cart.
pub fn summarize_cart(
    cart: &Cart,
    lines: &[CartLineDetail],
    default_currency: &str,
    checkout_url: String,
) -> StoreCart {
    let currency = lines
        .first()
        .map(|l| l.currency_code.as_str())
        .unwrap_or(default_currency);

    let subtotal: Decimal = lines.iter().map(|l| line_total(l.price, l.quantity)).sum();
    let total_quantity: i64 = lines.iter().map(|l| i64::from(l.quantity)).sum();

    let store_lines = lines
        .iter()
        .map(|l| StoreCartLine {
            id: l.line_id,
            quantity: l.quantity,
            cost: Money::new(line_total(l.price, l.quantity), &l.currency_code),
            merchandise: CartMerchandise {
                variant_id: l.variant_id,
                title: l.variant_title.clone(),
                bottle_size: l.bottle_size.clone(),
                price: Money::new(l.price, &l.currency_code),
                available_for_sale: l.available_for_sale,
                wine_id: l.wine_id,
                wine_title: l.wine_title.clone(),
                wine_handle: l.wine_handle.clone(),
            },
        })
        .collect();

    StoreCart {
        id: cart.id,
        checkout_url,
        total_quantity,
        cost: CartCost {
            subtotal_amount: Money::new(subtotal, currency),
            total_amount: Money::new(subtotal, currency),
        },
        lines: store_lines,
    }
}
