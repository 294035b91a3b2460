//! Cart HTTP handlers
//!
//! The cart id lives in a signed cookie. Handlers that open a cart set the
//! cookie; checkout clears it.

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::cart_session::{cart_cookie, clear_cart_cookie};
use crate::middleware::CartSession;
use crate::services::cart::{AddCartItemInput, UpdateCartItemInput};
use crate::services::customer::CustomerInput;
use crate::services::{CartService, OrderService};
use crate::AppState;
use shared::StoreCart;

fn cart_service(state: &AppState) -> CartService {
    CartService::new(state.db.clone(), state.config.storefront.cart_ttl_days)
}

async fn load_cart(state: &AppState, cart_id: Uuid) -> AppResult<Option<StoreCart>> {
    let storefront = &state.config.storefront;
    cart_service(state)
        .get_cart(cart_id, &storefront.currency_code, &storefront.checkout_path)
        .await
}

fn with_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(cookie) = cookie {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

/// The current cart, or null when there is none
pub async fn get_cart(
    State(state): State<AppState>,
    session: CartSession,
) -> Result<impl IntoResponse, AppError> {
    let cart = match session.cart_id {
        Some(cart_id) => load_cart(&state, cart_id).await?,
        None => None,
    };
    Ok(Json(cart))
}

/// Open a new cart and hand out its cookie
pub async fn create_cart(State(state): State<AppState>) -> Result<Response, AppError> {
    let cart = cart_service(&state).create_cart().await?;
    let cookie = cart_cookie(&state.config, cart.id)?;

    let store_cart = load_cart(&state, cart.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart".to_string()))?;

    Ok(with_cookie(
        (StatusCode::CREATED, Json(store_cart)).into_response(),
        Some(cookie),
    ))
}

/// Add a variant, opening a cart when the request has none
pub async fn add_line(
    State(state): State<AppState>,
    session: CartSession,
    Json(input): Json<AddCartItemInput>,
) -> Result<Response, AppError> {
    let service = cart_service(&state);
    let (cart, created) = service.get_or_create_cart(session.cart_id).await?;
    service.add_item(cart.id, input).await?;

    let cookie = if created {
        Some(cart_cookie(&state.config, cart.id)?)
    } else {
        None
    };

    let store_cart = load_cart(&state, cart.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart".to_string()))?;

    Ok(with_cookie(Json(store_cart).into_response(), cookie))
}

/// Change a line's quantity; 0 removes it
pub async fn update_line(
    State(state): State<AppState>,
    session: CartSession,
    Path(line_id): Path<Uuid>,
    Json(input): Json<UpdateCartItemInput>,
) -> Result<impl IntoResponse, AppError> {
    let cart_id = session
        .cart_id
        .ok_or_else(|| AppError::NotFound("Cart".to_string()))?;

    cart_service(&state).update_item(cart_id, line_id, input).await?;
    Ok(Json(load_cart(&state, cart_id).await?))
}

/// Remove a line from the cart
pub async fn remove_line(
    State(state): State<AppState>,
    session: CartSession,
    Path(line_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let cart_id = session
        .cart_id
        .ok_or_else(|| AppError::NotFound("Cart".to_string()))?;

    cart_service(&state).remove_item(cart_id, line_id).await?;
    Ok(Json(load_cart(&state, cart_id).await?))
}

/// Place orders for everything in the cart
pub async fn checkout(
    State(state): State<AppState>,
    session: CartSession,
    Json(customer): Json<CustomerInput>,
) -> Result<Response, AppError> {
    let cart_id = session.cart_id.ok_or(AppError::EmptyCart)?;

    let service = OrderService::new(state.db.clone());
    let result = service.checkout(cart_id, customer).await?;

    let body = Json(json!({
        "success": true,
        "customer": result.customer,
        "orders": result.orders,
        "message": "Order placed successfully",
    }));

    Ok(with_cookie(
        (StatusCode::CREATED, body).into_response(),
        Some(clear_cart_cookie(&state.config)?),
    ))
}
