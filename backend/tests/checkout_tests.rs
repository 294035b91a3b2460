//! Checkout tests
//!
//! Tests for:
//! - Bottle allocation across pallets during checkout
//! - Rollback when a wine runs out of pallets
//! - Cart line merging and quantity limits
//! - Expired carts
//! - Concurrent checkouts over the same wines
//!
//! Each test runs against a fresh database from `#[sqlx::test]` (requires
//! DATABASE_URL) with the schema created by the setup service.

use rust_decimal::Decimal;
use shared::{CartLine, Pallet, PalletStatus, Wine, WineVariant, MAX_LINE_QUANTITY};
use sqlx::PgPool;
use uuid::Uuid;

use wcs_server::error::AppError;
use wcs_server::services::cart::{AddCartItemInput, UpdateCartItemInput};
use wcs_server::services::customer::CustomerInput;
use wcs_server::services::variant::CreateVariantInput;
use wcs_server::services::wine::CreateWineInput;
use wcs_server::services::{
    CartService, OrderService, SetupService, VariantService, WineService,
};

// ============================================================================
// Fixtures
// ============================================================================

async fn bootstrap(pool: &PgPool) {
    let result = SetupService::new(pool.clone()).setup_database().await;
    assert!(result.success, "{}", result.message);
}

async fn wine_with_variant(
    pool: &PgPool,
    title: &str,
    bottles_per_pallet: i32,
    max_pallet_orders: i32,
) -> (Wine, WineVariant) {
    let wine = WineService::new(pool.clone())
        .create_wine(
            CreateWineInput {
                title: Some(title.to_string()),
                bottles_per_pallet: Some(bottles_per_pallet),
                max_pallet_orders: Some(max_pallet_orders),
                ..Default::default()
            },
            56,
            "SEK",
        )
        .await
        .unwrap();

    let variant = VariantService::new(pool.clone())
        .create_variant(
            wine.id,
            CreateVariantInput {
                title: Some("750ml".to_string()),
                price: Some(Decimal::from(199)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    (wine, variant)
}

fn carts(pool: &PgPool) -> CartService {
    CartService::new(pool.clone(), 30)
}

async fn cart_with(pool: &PgPool, items: &[(Uuid, i32)]) -> Uuid {
    let service = carts(pool);
    let cart = service.create_cart().await.unwrap();
    for (variant_id, quantity) in items {
        service
            .add_item(
                cart.id,
                AddCartItemInput {
                    variant_id: *variant_id,
                    quantity: Some(*quantity),
                },
            )
            .await
            .unwrap();
    }
    cart.id
}

fn customer(email: &str) -> CustomerInput {
    CustomerInput {
        email: email.to_string(),
        first_name: Some("Anna".to_string()),
        last_name: Some("Lindqvist".to_string()),
        ..Default::default()
    }
}

async fn pallets_of(pool: &PgPool, wine_id: Uuid) -> Vec<Pallet> {
    sqlx::query_as::<_, Pallet>(
        "SELECT * FROM pallets WHERE wine_id = $1 ORDER BY current_bottles DESC, id",
    )
    .bind(wine_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

async fn lines_of(pool: &PgPool, cart_id: Uuid) -> Vec<CartLine> {
    sqlx::query_as::<_, CartLine>("SELECT * FROM cart_lines WHERE cart_id = $1")
        .bind(cart_id)
        .fetch_all(pool)
        .await
        .unwrap()
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ============================================================================
// Allocation
// ============================================================================

#[sqlx::test(migrations = false)]
async fn checkout_fills_pallet_and_overflows_into_new_one(pool: PgPool) {
    bootstrap(&pool).await;
    let (wine, variant) = wine_with_variant(&pool, "Chablis Premier Cru 2021", 12, 10).await;
    let cart_id = cart_with(&pool, &[(variant.id, 15)]).await;

    let result = OrderService::new(pool.clone())
        .checkout(cart_id, customer("anna@example.se"))
        .await
        .unwrap();

    assert_eq!(result.orders.len(), 1);
    let placed = &result.orders[0];
    assert_eq!(placed.order.quantity, 15);
    assert_eq!(placed.order.total_price, Decimal::from(15 * 199));
    assert_eq!(placed.pallets.len(), 2);

    let pallets = pallets_of(&pool, wine.id).await;
    assert_eq!(pallets.len(), 2);
    assert_eq!(pallets[0].current_bottles, 12);
    assert_eq!(pallets[0].status, PalletStatus::Full);
    assert_eq!(pallets[1].current_bottles, 3);
    assert_eq!(pallets[1].status, PalletStatus::Filling);
    assert_eq!(placed.order.pallet_id, Some(placed.pallets[0].pallet_id));

    assert!(carts(&pool).find_active_cart(cart_id).await.unwrap().is_none());
}

#[sqlx::test(migrations = false)]
async fn later_checkout_tops_up_the_filling_pallet(pool: PgPool) {
    bootstrap(&pool).await;
    let (wine, variant) = wine_with_variant(&pool, "Sancerre 2022", 12, 10).await;
    let orders = OrderService::new(pool.clone());

    let first = cart_with(&pool, &[(variant.id, 5)]).await;
    orders.checkout(first, customer("anna@example.se")).await.unwrap();
    let second = cart_with(&pool, &[(variant.id, 7)]).await;
    orders.checkout(second, customer("erik@example.se")).await.unwrap();

    let pallets = pallets_of(&pool, wine.id).await;
    assert_eq!(pallets.len(), 1);
    assert_eq!(pallets[0].current_bottles, 12);
    assert_eq!(pallets[0].status, PalletStatus::Full);
}

#[sqlx::test(migrations = false)]
async fn checkout_rolls_back_when_pallet_limit_is_reached(pool: PgPool) {
    bootstrap(&pool).await;
    let (wine, variant) = wine_with_variant(&pool, "Barolo 2019", 12, 1).await;
    let cart_id = cart_with(&pool, &[(variant.id, 13)]).await;

    let err = OrderService::new(pool.clone())
        .checkout(cart_id, customer("anna@example.se"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PalletCapacity(_)));

    assert!(pallets_of(&pool, wine.id).await.is_empty());
    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(count(&pool, "customers").await, 0);
    assert_eq!(lines_of(&pool, cart_id).await.len(), 1);
}

// ============================================================================
// Cart Lines
// ============================================================================

#[sqlx::test(migrations = false)]
async fn adding_same_variant_merges_into_one_line(pool: PgPool) {
    bootstrap(&pool).await;
    let (_, variant) = wine_with_variant(&pool, "Rioja Reserva 2018", 56, 10).await;
    let cart_id = cart_with(&pool, &[(variant.id, 2), (variant.id, 3)]).await;

    let lines = lines_of(&pool, cart_id).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 5);
}

#[sqlx::test(migrations = false)]
async fn merged_line_cannot_exceed_line_limit(pool: PgPool) {
    bootstrap(&pool).await;
    let (_, variant) = wine_with_variant(&pool, "Rioja Reserva 2018", 56, 10).await;
    let cart_id = cart_with(&pool, &[(variant.id, 5)]).await;

    let err = carts(&pool)
        .add_item(
            cart_id,
            AddCartItemInput {
                variant_id: variant.id,
                quantity: Some(MAX_LINE_QUANTITY),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));

    let err = carts(&pool)
        .add_item(
            cart_id,
            AddCartItemInput {
                variant_id: variant.id,
                quantity: Some(i32::MAX),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    assert_eq!(lines_of(&pool, cart_id).await[0].quantity, 5);
}

#[sqlx::test(migrations = false)]
async fn oversized_line_update_is_rejected(pool: PgPool) {
    bootstrap(&pool).await;
    let (_, variant) = wine_with_variant(&pool, "Rioja Reserva 2018", 56, 10).await;
    let cart_id = cart_with(&pool, &[(variant.id, 5)]).await;
    let line_id = lines_of(&pool, cart_id).await[0].id;

    let err = carts(&pool)
        .update_item(cart_id, line_id, UpdateCartItemInput { quantity: i32::MAX })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
    assert_eq!(lines_of(&pool, cart_id).await[0].quantity, 5);
}

// ============================================================================
// Expired Carts
// ============================================================================

#[sqlx::test(migrations = false)]
async fn expired_cart_is_not_revived(pool: PgPool) {
    bootstrap(&pool).await;
    let (_, variant) = wine_with_variant(&pool, "Riesling Spätlese 2020", 56, 10).await;
    let cart_id = cart_with(&pool, &[(variant.id, 2)]).await;
    let line_id = lines_of(&pool, cart_id).await[0].id;

    sqlx::query("UPDATE carts SET expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(cart_id)
        .execute(&pool)
        .await
        .unwrap();

    let service = carts(&pool);
    assert!(matches!(
        service
            .update_item(cart_id, line_id, UpdateCartItemInput { quantity: 4 })
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.remove_item(cart_id, line_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(service.get_cart(cart_id, "SEK", "/checkout").await.unwrap().is_none());
    assert_eq!(lines_of(&pool, cart_id).await[0].quantity, 2);

    let err = OrderService::new(pool.clone())
        .checkout(cart_id, customer("anna@example.se"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));
}

#[sqlx::test(migrations = false)]
async fn checkout_of_consumed_cart_reports_empty_cart(pool: PgPool) {
    bootstrap(&pool).await;
    let (_, variant) = wine_with_variant(&pool, "Riesling Spätlese 2020", 56, 10).await;
    let cart_id = cart_with(&pool, &[(variant.id, 2)]).await;
    let orders = OrderService::new(pool.clone());

    orders.checkout(cart_id, customer("anna@example.se")).await.unwrap();
    let err = orders
        .checkout(cart_id, customer("anna@example.se"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));
}

// ============================================================================
// Concurrency
// ============================================================================

#[sqlx::test(migrations = false)]
async fn concurrent_checkouts_in_opposite_wine_order_both_succeed(pool: PgPool) {
    bootstrap(&pool).await;
    let (first_wine, first) = wine_with_variant(&pool, "Pomerol 2016", 12, 10).await;
    let (second_wine, second) = wine_with_variant(&pool, "Pauillac 2016", 12, 10).await;
    let orders = OrderService::new(pool.clone());

    let rounds = 20;
    for round in 0..rounds {
        let forward = cart_with(&pool, &[(first.id, 1), (second.id, 1)]).await;
        let backward = cart_with(&pool, &[(second.id, 1), (first.id, 1)]).await;

        let (a, b) = tokio::join!(
            orders.checkout(forward, customer(&format!("forward{}@example.se", round))),
            orders.checkout(backward, customer(&format!("backward{}@example.se", round))),
        );
        assert!(a.is_ok(), "round {}: {:?}", round, a.err());
        assert!(b.is_ok(), "round {}: {:?}", round, b.err());
    }

    for wine in [first_wine, second_wine] {
        let bottles: i32 = pallets_of(&pool, wine.id)
            .await
            .iter()
            .map(|p| p.current_bottles)
            .sum();
        assert_eq!(bottles, 2 * rounds);
    }
    assert_eq!(count(&pool, "orders").await, i64::from(4 * rounds));
}
