//! Shared types and models for the Pallet Wine Store
//!
//! This crate contains the catalog records, the storefront view shapes and the
//! pure pallet/cart logic shared between the backend and the browser client
//! (via WASM).

pub mod adapters;
pub mod models;
pub mod types;
pub mod validation;

pub use adapters::*;
pub use models::*;
pub use types::*;
pub use validation::*;
