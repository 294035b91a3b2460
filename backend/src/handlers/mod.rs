//! HTTP request handlers

pub mod auth;
pub mod cart;
pub mod collection;
pub mod health;
pub mod order;
pub mod pallet;
pub mod producer;
pub mod setup;
pub mod wine;

pub use auth::*;
pub use cart::*;
pub use collection::*;
pub use health::*;
pub use order::*;
pub use pallet::*;
pub use producer::*;
pub use setup::*;
pub use wine::*;
