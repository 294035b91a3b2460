//! Request middleware and extractors

pub mod auth;
pub mod cart_session;

pub use auth::{admin_auth_middleware, AdminUser, CurrentAdmin};
pub use cart_session::CartSession;
