//! Common types used across the platform

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency used when a record does not carry its own
pub const DEFAULT_CURRENCY_CODE: &str = "SEK";

/// Bottles on a standard shipping pallet
pub const DEFAULT_BOTTLES_PER_PALLET: i32 = 56;

/// Monetary amount in the storefront shape (amount rendered as a decimal string)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

impl Money {
    pub fn new(amount: Decimal, currency_code: &str) -> Self {
        Self {
            amount: format!(
                "{:.2}",
                amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            ),
            currency_code: currency_code.to_string(),
        }
    }

    pub fn zero(currency_code: &str) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }
}

/// Sort keys accepted by the storefront wine listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    Price,
    Title,
    #[default]
    CreatedAt,
}

impl ProductSortKey {
    /// Column the key orders by
    pub fn column(&self) -> &'static str {
        match self {
            ProductSortKey::Price => "price_range_min",
            ProductSortKey::Title => "title",
            ProductSortKey::CreatedAt => "created_at",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PRICE" => Some(ProductSortKey::Price),
            "TITLE" => Some(ProductSortKey::Title),
            "CREATED_AT" => Some(ProductSortKey::CreatedAt),
            _ => None,
        }
    }
}

/// Storefront listing parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub limit: Option<i64>,
    pub sort_key: Option<String>,
    pub reverse: Option<bool>,
    pub query: Option<String>,
    pub collection: Option<String>,
}

impl CatalogQuery {
    /// Resolve the ORDER BY clause. Without an explicit key the newest wines
    /// come first; an unknown key falls back to the same.
    pub fn order_by(&self) -> (ProductSortKey, bool) {
        match self.sort_key.as_deref().and_then(ProductSortKey::from_str) {
            Some(key) => (key, self.reverse.unwrap_or(false)),
            None => (ProductSortKey::CreatedAt, true),
        }
    }

    /// Trimmed, non-empty search term
    pub fn search_term(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_renders_two_decimals() {
        assert_eq!(Money::new(Decimal::from(899), "SEK").amount, "899.00");
        assert_eq!(Money::new(Decimal::new(12345, 3), "EUR").amount, "12.35");
        assert_eq!(Money::zero("SEK").amount, "0.00");
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let query = CatalogQuery::default();
        assert_eq!(query.order_by(), (ProductSortKey::CreatedAt, true));
    }

    #[test]
    fn test_explicit_sort_key_ascending_unless_reversed() {
        let query = CatalogQuery {
            sort_key: Some("PRICE".into()),
            ..Default::default()
        };
        assert_eq!(query.order_by(), (ProductSortKey::Price, false));

        let query = CatalogQuery {
            sort_key: Some("TITLE".into()),
            reverse: Some(true),
            ..Default::default()
        };
        assert_eq!(query.order_by(), (ProductSortKey::Title, true));
    }

    #[test]
    fn test_unknown_sort_key_falls_back() {
        let query = CatalogQuery {
            sort_key: Some("BEST_SELLING".into()),
            reverse: Some(false),
            ..Default::default()
        };
        assert_eq!(query.order_by(), (ProductSortKey::CreatedAt, true));
    }

    #[test]
    fn test_blank_search_term_ignored() {
        let query = CatalogQuery {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);
    }
}
