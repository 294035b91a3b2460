//! Business logic services for the Pallet Wine Store

pub mod auth;
pub mod cart;
pub mod collection;
pub mod customer;
pub mod order;
pub mod pallet;
pub mod producer;
pub mod setup;
pub mod variant;
pub mod wine;

pub use auth::AuthService;
pub use cart::CartService;
pub use collection::CollectionService;
pub use customer::CustomerService;
pub use order::OrderService;
pub use pallet::PalletService;
pub use producer::ProducerService;
pub use setup::SetupService;
pub use variant::VariantService;
pub use wine::WineService;

use crate::error::{AppError, AppResult};
use shared::{slugify, validate_handle};

/// Trimmed value, or None when blank
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The given handle, or one slugified from the title
pub(crate) fn handle_or_slug(
    handle: Option<String>,
    title: &str,
    missing_msg: &str,
) -> AppResult<String> {
    let handle = non_empty(handle).unwrap_or_else(|| slugify(title));
    if handle.is_empty() {
        return Err(AppError::field("handle", missing_msg));
    }
    validate_handle(&handle).map_err(|m| AppError::field("handle", m))?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(Some("  Bordeaux ".to_string())), Some("Bordeaux".to_string()));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_handle_falls_back_to_slug() {
        let handle = handle_or_slug(None, "Château Margaux 2018", "required").unwrap();
        assert_eq!(handle, slugify("Château Margaux 2018"));
        assert_eq!(
            handle_or_slug(Some("bordeaux".to_string()), "Ignored", "required").unwrap(),
            "bordeaux"
        );
    }

    #[test]
    fn test_handle_rejected_when_nothing_to_slug() {
        assert!(matches!(
            handle_or_slug(None, "!!!", "Title and handle are required"),
            Err(AppError::Validation { ref field, .. }) if field == "handle"
        ));
    }
}
