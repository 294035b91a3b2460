//! Route definitions for the Pallet Wine Store

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::admin_auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .route("/auth/login", post(handlers::login))
        // Storefront catalog (public)
        .nest("/store", store_routes())
        // Pallet fill levels (public)
        .route("/pallets", get(handlers::list_pallets))
        // Cart and checkout (public, cookie session)
        .nest("/cart", cart_routes())
        // Admin routes (bearer token)
        .nest("/admin", admin_routes(state))
}

/// Storefront catalog routes (public)
fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/collections", get(handlers::list_store_collections))
        .route("/collections/:handle", get(handlers::get_store_collection))
        .route("/collections/:handle/wines", get(handlers::get_collection_wines))
        .route("/wines", get(handlers::list_store_wines))
        // Handle and wine id share the segment; the pallet handler parses the id
        .route("/wines/:handle", get(handlers::get_store_wine))
        .route("/wines/:handle/pallet", get(handlers::get_wine_pallet_status))
}

/// Cart routes (public)
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_cart).post(handlers::create_cart))
        .route("/lines", post(handlers::add_line))
        .route(
            "/lines/:line_id",
            put(handlers::update_line).delete(handlers::remove_line),
        )
        .route("/checkout", post(handlers::checkout))
}

/// Admin routes (protected)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/collections",
            get(handlers::list_collections).post(handlers::create_collection),
        )
        .route(
            "/producers",
            get(handlers::list_producers).post(handlers::create_producer),
        )
        .route("/wines", get(handlers::list_wines).post(handlers::create_wine))
        .route(
            "/wines/:wine_id/variants",
            get(handlers::list_variants).post(handlers::create_variant),
        )
        .route("/wines/:wine_id/images", post(handlers::add_image))
        .route("/pallets", post(handlers::create_pallet))
        .route("/pallets/:pallet_id/status", put(handlers::update_pallet_status))
        .route("/orders", get(handlers::list_orders))
        .route("/orders/:order_number", get(handlers::get_order))
        .route(
            "/setup-database",
            get(handlers::setup_usage).post(handlers::setup_database),
        )
        .route("/debug/catalog", get(handlers::debug_catalog))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
