//! Domain models for the Pallet Wine Store

mod cart;
mod collection;
mod customer;
mod order;
mod pallet;
mod producer;
mod storefront;
mod wine;

pub use cart::*;
pub use collection::*;
pub use customer::*;
pub use order::*;
pub use pallet::*;
pub use producer::*;
pub use storefront::*;
pub use wine::*;
