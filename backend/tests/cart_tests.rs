//! Cart tests
//!
//! Tests for:
//! - Cart totals and line costs in the storefront shape
//! - Quantity updates (zero removes, negatives and oversized lines rejected)
//! - Order pricing

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    generate_order_number, line_total, summarize_cart, validate_quantity, Cart, CartLineDetail,
    MAX_LINE_QUANTITY,
};
use uuid::Uuid;
use wcs_server::error::AppError;
use wcs_server::services::cart::{line_change, merged_quantity, LineChange};

// ============================================================================
// Fixtures
// ============================================================================

fn cart() -> Cart {
    let now = Utc::now();
    Cart {
        id: Uuid::new_v4(),
        customer_id: None,
        expires_at: Some(now + Duration::days(30)),
        created_at: now,
        updated_at: now,
    }
}

fn line(price: Decimal, quantity: i32, currency: &str) -> CartLineDetail {
    CartLineDetail {
        line_id: Uuid::new_v4(),
        wine_id: Uuid::new_v4(),
        variant_id: Uuid::new_v4(),
        quantity,
        variant_title: "750ml".to_string(),
        bottle_size: "750ml".to_string(),
        price,
        available_for_sale: true,
        wine_title: "Château Margaux 2018".to_string(),
        wine_handle: "chateau-margaux-2018".to_string(),
        currency_code: currency.to_string(),
    }
}

const CHECKOUT: &str = "/api/v1/cart/checkout";

// ============================================================================
// Cart Summary
// ============================================================================

#[test]
fn empty_cart_uses_default_currency() {
    let cart = cart();
    let summary = summarize_cart(&cart, &[], "SEK", CHECKOUT.to_string());

    assert_eq!(summary.id, cart.id);
    assert_eq!(summary.total_quantity, 0);
    assert!(summary.lines.is_empty());
    assert_eq!(summary.cost.subtotal_amount.amount, "0.00");
    assert_eq!(summary.cost.total_amount.currency_code, "SEK");
    assert_eq!(summary.checkout_url, CHECKOUT);
}

#[test]
fn cart_totals_add_up_line_costs() {
    let lines = vec![
        line(Decimal::from(899), 2, "SEK"),
        line(Decimal::new(14950, 2), 3, "SEK"),
    ];
    let summary = summarize_cart(&cart(), &lines, "SEK", CHECKOUT.to_string());

    assert_eq!(summary.total_quantity, 5);
    assert_eq!(summary.lines[0].cost.amount, "1798.00");
    assert_eq!(summary.lines[1].cost.amount, "448.50");
    assert_eq!(summary.cost.subtotal_amount.amount, "2246.50");
    assert_eq!(summary.cost.total_amount, summary.cost.subtotal_amount);
}

#[test]
fn cart_currency_follows_first_line() {
    let lines = vec![line(Decimal::from(45), 1, "EUR")];
    let summary = summarize_cart(&cart(), &lines, "SEK", CHECKOUT.to_string());
    assert_eq!(summary.cost.total_amount.currency_code, "EUR");
    assert_eq!(summary.lines[0].merchandise.price.currency_code, "EUR");
}

#[test]
fn cart_lines_carry_merchandise_details() {
    let detail = line(Decimal::from(899), 1, "SEK");
    let summary = summarize_cart(&cart(), &[detail.clone()], "SEK", CHECKOUT.to_string());

    let merchandise = &summary.lines[0].merchandise;
    assert_eq!(summary.lines[0].id, detail.line_id);
    assert_eq!(merchandise.variant_id, detail.variant_id);
    assert_eq!(merchandise.wine_handle, "chateau-margaux-2018");
    assert_eq!(merchandise.bottle_size, "750ml");
    assert!(merchandise.available_for_sale);
}

#[test]
fn storefront_cart_serializes_in_camel_case() {
    let summary = summarize_cart(
        &cart(),
        &[line(Decimal::from(899), 1, "SEK")],
        "SEK",
        CHECKOUT.to_string(),
    );
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["checkoutUrl"], CHECKOUT);
    assert_eq!(json["totalQuantity"], 1);
    assert_eq!(json["cost"]["subtotalAmount"]["amount"], "899.00");
    assert_eq!(json["lines"][0]["merchandise"]["wineTitle"], "Château Margaux 2018");
}

#[test]
fn cart_total_quantity_does_not_overflow() {
    let lines = vec![
        line(Decimal::from(1), i32::MAX, "SEK"),
        line(Decimal::from(1), 2, "SEK"),
    ];
    let summary = summarize_cart(&cart(), &lines, "SEK", CHECKOUT.to_string());
    assert_eq!(summary.total_quantity, i64::from(i32::MAX) + 2);
}

proptest! {
    #[test]
    fn cart_quantity_is_sum_of_lines(quantities in prop::collection::vec(1..50i32, 0..8)) {
        let lines: Vec<CartLineDetail> = quantities
            .iter()
            .map(|q| line(Decimal::from(100), *q, "SEK"))
            .collect();
        let summary = summarize_cart(&cart(), &lines, "SEK", CHECKOUT.to_string());

        prop_assert_eq!(summary.total_quantity, quantities.iter().map(|q| i64::from(*q)).sum::<i64>());
        let expected = Decimal::from(100 * quantities.iter().sum::<i32>());
        prop_assert_eq!(summary.cost.subtotal_amount.amount, format!("{:.2}", expected));
    }
}

// ============================================================================
// Line Updates
// ============================================================================

proptest! {
    #[test]
    fn positive_quantities_are_kept(quantity in 1..=MAX_LINE_QUANTITY) {
        prop_assert_eq!(line_change(quantity).unwrap(), LineChange::SetQuantity(quantity));
    }

    #[test]
    fn negative_quantities_are_rejected(quantity in i32::MIN..0) {
        let rejected = matches!(line_change(quantity), Err(AppError::Validation { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn oversized_quantities_are_rejected(quantity in (MAX_LINE_QUANTITY + 1)..=i32::MAX) {
        prop_assert!(validate_quantity(quantity).is_err());
        let rejected = matches!(line_change(quantity), Err(AppError::Validation { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn merged_lines_stay_within_limit(current in 1..=MAX_LINE_QUANTITY, added in 1..=i32::MAX) {
        match merged_quantity(current, added) {
            Ok(merged) => {
                prop_assert_eq!(merged, current + added);
                prop_assert!(merged <= MAX_LINE_QUANTITY);
            }
            Err(_) => prop_assert!(i64::from(current) + i64::from(added) > i64::from(MAX_LINE_QUANTITY)),
        }
    }
}

#[test]
fn zero_quantity_removes_line() {
    assert_eq!(line_change(0).unwrap(), LineChange::Remove);
}

// ============================================================================
// Order Pricing
// ============================================================================

#[test]
fn order_total_is_unit_price_times_quantity() {
    assert_eq!(line_total(Decimal::from(899), 6), Decimal::from(5394));
    assert_eq!(line_total(Decimal::new(14950, 2), 2), Decimal::new(29900, 2));
}

#[test]
fn order_numbers_are_dated_and_unique_per_id() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let first = generate_order_number(date, Uuid::new_v4());
    let second = generate_order_number(date, Uuid::new_v4());

    assert!(first.starts_with("WCS-20240315-"));
    assert_eq!(first.len(), "WCS-20240315-".len() + 8);
    assert_ne!(first, second);
}
