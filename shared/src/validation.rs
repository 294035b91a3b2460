//! Validation utilities for the Pallet Wine Store

use rust_decimal::Decimal;

// ============================================================================
// Handles
// ============================================================================

fn fold_accent(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// Derive a handle from a title: "Château Margaux 2018" -> "chateau-margaux-2018"
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.to_lowercase().chars() {
        let piece = if c.is_ascii_alphanumeric() {
            Some(c.to_string())
        } else {
            fold_accent(c).map(str::to_string)
        };

        match piece {
            Some(p) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push_str(&p);
            }
            None => pending_dash = true,
        }
    }

    slug
}

/// Validate handle format (lowercase alphanumeric words joined by single dashes)
pub fn validate_handle(handle: &str) -> Result<(), &'static str> {
    if handle.is_empty() {
        return Err("Handle is required");
    }
    if handle.len() > 255 {
        return Err("Handle must be at most 255 characters");
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Handle must contain only lowercase letters, digits and dashes");
    }
    if handle.starts_with('-') || handle.ends_with('-') || handle.contains("--") {
        return Err("Handle must not start or end with a dash or contain consecutive dashes");
    }
    Ok(())
}

// ============================================================================
// Wine Validations
// ============================================================================

/// Oldest vintage accepted by the catalog
pub const MIN_VINTAGE: i32 = 1800;

/// Validate vintage year; next year's vintage is accepted for en-primeur listings
pub fn validate_vintage(vintage: i32, current_year: i32) -> Result<(), &'static str> {
    if vintage < MIN_VINTAGE {
        return Err("Vintage is too old");
    }
    if vintage > current_year + 1 {
        return Err("Vintage cannot be in the future");
    }
    Ok(())
}

/// Validate alcohol by volume (0-25%)
pub fn validate_alcohol_content(abv: Decimal) -> Result<(), &'static str> {
    if abv < Decimal::ZERO || abv > Decimal::from(25) {
        return Err("Alcohol content must be between 0 and 25%");
    }
    Ok(())
}

/// Validate a price range (non-negative, min not above max)
pub fn validate_price_range(min: Decimal, max: Decimal) -> Result<(), &'static str> {
    if min < Decimal::ZERO || max < Decimal::ZERO {
        return Err("Prices cannot be negative");
    }
    if min > max {
        return Err("Minimum price cannot exceed maximum price");
    }
    Ok(())
}

/// Validate pallet settings of a wine
pub fn validate_pallet_settings(
    bottles_per_pallet: i32,
    min_pallet_orders: i32,
    max_pallet_orders: i32,
) -> Result<(), &'static str> {
    if bottles_per_pallet < 1 {
        return Err("Bottles per pallet must be at least 1");
    }
    if min_pallet_orders < 1 {
        return Err("Minimum pallet orders must be at least 1");
    }
    if min_pallet_orders > max_pallet_orders {
        return Err("Minimum pallet orders cannot exceed maximum pallet orders");
    }
    Ok(())
}

/// Validate a pallet's counter against its target
pub fn validate_pallet_counter(current: i32, target: i32) -> Result<(), &'static str> {
    if target < 1 {
        return Err("Target bottles must be at least 1");
    }
    if current < 0 {
        return Err("Current bottles cannot be negative");
    }
    if current > target {
        return Err("Current bottles cannot exceed target bottles");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate ISO 4217 style currency code (three uppercase letters)
pub fn validate_currency_code(code: &str) -> Result<(), &'static str> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err("Currency code must be three uppercase letters")
    }
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Most bottles a single cart line may hold
pub const MAX_LINE_QUANTITY: i32 = 1000;

/// Validate a cart or order quantity
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err("Quantity cannot exceed 1000 bottles per line");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Handle Tests
    // ========================================================================

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Château Margaux 2018"), "chateau-margaux-2018");
        assert_eq!(slugify("Rosé de Provence"), "rose-de-provence");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Bordeaux -- Wines!  "), "bordeaux-wines");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugified_titles_are_valid_handles() {
        for title in ["Champagne Prestige Cuvée", "Bordeaux Grande Réserve 2020"] {
            assert!(validate_handle(&slugify(title)).is_ok());
        }
    }

    #[test]
    fn test_validate_handle_invalid() {
        assert!(validate_handle("").is_err());
        assert!(validate_handle("Bordeaux").is_err());
        assert!(validate_handle("-bordeaux").is_err());
        assert!(validate_handle("bordeaux--wines").is_err());
        assert!(validate_handle("bordeaux wines").is_err());
    }

    // ========================================================================
    // Wine Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_vintage() {
        assert!(validate_vintage(2018, 2024).is_ok());
        assert!(validate_vintage(2025, 2024).is_ok());
        assert!(validate_vintage(2026, 2024).is_err());
        assert!(validate_vintage(1700, 2024).is_err());
    }

    #[test]
    fn test_validate_alcohol_content() {
        assert!(validate_alcohol_content(Decimal::new(135, 1)).is_ok());
        assert!(validate_alcohol_content(Decimal::ZERO).is_ok());
        assert!(validate_alcohol_content(Decimal::from(-1)).is_err());
        assert!(validate_alcohol_content(Decimal::from(40)).is_err());
    }

    #[test]
    fn test_validate_price_range() {
        assert!(validate_price_range(Decimal::from(899), Decimal::from(899)).is_ok());
        assert!(validate_price_range(Decimal::from(900), Decimal::from(899)).is_err());
        assert!(validate_price_range(Decimal::from(-1), Decimal::from(899)).is_err());
    }

    #[test]
    fn test_validate_pallet_settings() {
        assert!(validate_pallet_settings(56, 1, 10).is_ok());
        assert!(validate_pallet_settings(0, 1, 10).is_err());
        assert!(validate_pallet_settings(56, 5, 2).is_err());
    }

    #[test]
    fn test_validate_pallet_counter() {
        assert!(validate_pallet_counter(0, 56).is_ok());
        assert!(validate_pallet_counter(56, 56).is_ok());
        assert!(validate_pallet_counter(57, 56).is_err());
        assert!(validate_pallet_counter(-1, 56).is_err());
        assert!(validate_pallet_counter(0, 0).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("SEK").is_ok());
        assert!(validate_currency_code("sek").is_err());
        assert!(validate_currency_code("SEKR").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("kund@example.se").is_ok());
        assert!(validate_email("invalid").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
        assert!(validate_quantity(i32::MAX).is_err());
    }
}
