//! WebAssembly module for the Pallet Wine Store
//!
//! Provides client-side computation for:
//! - Pallet progress bars on product cards
//! - Price formatting
//! - Handle suggestions in the admin forms

use rust_decimal::Decimal;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("Pallet Wine Store helpers loaded"));
}

/// Pallet fill percentage (0 when the target is not positive)
#[wasm_bindgen]
pub fn pallet_fill_percentage(current_bottles: i32, target_bottles: i32) -> i32 {
    fill_percentage(current_bottles, target_bottles)
}

/// Bottles still needed to fill the pallet
#[wasm_bindgen]
pub fn pallet_remaining_bottles(current_bottles: i32, target_bottles: i32) -> i32 {
    remaining_bottles(current_bottles, target_bottles)
}

/// Compact card caption, e.g. "12/48 bottles • Ships when pallet is full"
#[wasm_bindgen]
pub fn pallet_caption(current_bottles: i32, target_bottles: i32) -> String {
    if is_full(current_bottles, target_bottles) {
        format!("{}/{} bottles • Pallet full", current_bottles, target_bottles)
    } else {
        format!(
            "{}/{} bottles • Ships when pallet is full",
            current_bottles, target_bottles
        )
    }
}

/// Badge text for a pallet status string
#[wasm_bindgen]
pub fn pallet_status_label(status: &str) -> String {
    PalletStatus::from_str(status)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| status.to_string())
}

/// Parse a PalletProgress JSON payload and return its fill percentage
#[wasm_bindgen]
pub fn progress_from_json(progress_json: &str) -> Result<i32, JsValue> {
    let progress: PalletProgress = serde_json::from_str(progress_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid pallet progress JSON: {}", e)))?;
    Ok(progress.fill_percentage)
}

/// Format a money amount with two decimals, e.g. "899.00 SEK"
#[wasm_bindgen]
pub fn format_price(amount: &str, currency_code: &str) -> Result<String, JsValue> {
    let amount = Decimal::from_str(amount)
        .map_err(|e| JsValue::from_str(&format!("Invalid amount: {}", e)))?;
    let money = Money::new(amount, currency_code);
    Ok(format!("{} {}", money.amount, money.currency_code))
}

/// Suggest a handle for a title typed into an admin form
#[wasm_bindgen]
pub fn suggest_handle(title: &str) -> String {
    slugify(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pallet_caption() {
        assert_eq!(
            pallet_caption(12, 48),
            "12/48 bottles • Ships when pallet is full"
        );
        assert_eq!(pallet_caption(48, 48), "48/48 bottles • Pallet full");
    }

    #[test]
    fn test_pallet_status_label() {
        assert_eq!(pallet_status_label("filling"), "Filling Pallet");
        assert_eq!(pallet_status_label("custom"), "custom");
    }

    #[test]
    fn test_fill_percentage_export() {
        assert_eq!(pallet_fill_percentage(8, 56), 14);
        assert_eq!(pallet_remaining_bottles(8, 56), 48);
    }

    #[test]
    fn test_suggest_handle() {
        assert_eq!(suggest_handle("Bordeaux Wines"), "bordeaux-wines");
    }
}
