//! Configuration management for the Pallet Wine Store
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with WCS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Admin account
    pub admin: AdminConfig,

    /// Storefront and cart settings
    pub storefront: StorefrontConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Run the schema bootstrap at startup
    pub auto_setup: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Admin login email
    pub email: String,

    /// bcrypt hash of the admin password
    pub password_hash: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorefrontConfig {
    /// Currency for records that do not carry one
    pub currency_code: String,

    /// Pallet target used when a wine does not set one
    pub default_bottles_per_pallet: i32,

    /// Name of the cart cookie
    pub cart_cookie_name: String,

    /// Cart cookie lifetime in days
    pub cart_cookie_max_age_days: i64,

    /// HMAC key for signing the cart cookie
    pub cookie_secret: String,

    /// Checkout URL reported on carts
    pub checkout_path: String,

    /// Days before an untouched cart expires
    pub cart_ttl_days: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WCS_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_development = environment == "development";

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.auto_setup", is_development)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("storefront.currency_code", shared::DEFAULT_CURRENCY_CODE)?
            .set_default(
                "storefront.default_bottles_per_pallet",
                shared::DEFAULT_BOTTLES_PER_PALLET,
            )?
            .set_default("storefront.cart_cookie_name", "cartId")?
            .set_default("storefront.cart_cookie_max_age_days", 30)?
            .set_default("storefront.checkout_path", "/api/v1/cart/checkout")?
            .set_default("storefront.cart_ttl_days", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WCS_ prefix)
            .add_source(
                Environment::with_prefix("WCS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

