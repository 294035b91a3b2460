//! Order service: checkout and admin order lookup
//!
//! Checkout runs in a single transaction. Each cart line becomes one order and
//! its bottles are allocated to the wine's pallets before the cart is deleted.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::cart::CartService;
use crate::services::customer::{CustomerInput, CustomerService};
use crate::services::pallet::PalletService;
use shared::{
    generate_order_number, line_total, Cart, Customer, Order, OrderStatus, PalletProgress,
};

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Filters for the admin order list
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilters {
    pub pallet_id: Option<Uuid>,
    pub wine_id: Option<Uuid>,
    pub status: Option<String>,
}

impl OrderFilters {
    fn status(&self) -> AppResult<Option<OrderStatus>> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => OrderStatus::from_str(s)
                .map(Some)
                .ok_or_else(|| AppError::field("status", "Unknown order status")),
        }
    }
}

/// An order together with the pallets its bottles went to
#[derive(Debug, Serialize)]
pub struct CheckoutOrder {
    pub order: Order,
    pub pallets: Vec<PalletProgress>,
}

/// Result of a completed checkout
#[derive(Debug, Serialize)]
pub struct CheckoutResult {
    pub customer: Customer,
    pub orders: Vec<CheckoutOrder>,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Turn the cart into orders and allocate their bottles
    #[instrument(skip(self, customer))]
    pub async fn checkout(&self, cart_id: Uuid, customer: CustomerInput) -> AppResult<CheckoutResult> {
        let mut tx = self.db.begin().await?;

        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE id = $1 FOR UPDATE")
            .bind(cart_id)
            .fetch_optional(&mut *tx)
            .await?
            .filter(|c| !c.is_expired(Utc::now()))
            .ok_or(AppError::EmptyCart)?;

        let lines = CartService::line_details(&mut *tx, cart.id).await?;
        if lines.is_empty() {
            return Err(AppError::EmptyCart);
        }
        if let Some(line) = lines.iter().find(|l| !l.available_for_sale) {
            return Err(AppError::Unavailable(line.wine_title.clone()));
        }

        let wine_ids: Vec<Uuid> = lines.iter().map(|l| l.wine_id).collect();
        PalletService::lock_wines(&mut *tx, &wine_ids).await?;

        let customer = CustomerService::upsert_customer(&mut *tx, customer).await?;
        let today = Utc::now().date_naive();

        let mut orders = Vec::with_capacity(lines.len());
        for line in &lines {
            let pallets = PalletService::add_bottles(&mut *tx, line.wine_id, line.quantity).await?;
            let first = pallets.first();

            let order = sqlx::query_as::<_, Order>(
                r#"
                INSERT INTO orders (order_number, customer_id, wine_id, variant_id, pallet_id,
                                    quantity, unit_price, total_price, status, estimated_shipping_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
                "#,
            )
            .bind(generate_order_number(today, Uuid::new_v4()))
            .bind(customer.id)
            .bind(line.wine_id)
            .bind(line.variant_id)
            .bind(first.map(|p| p.id))
            .bind(line.quantity)
            .bind(line.price)
            .bind(line_total(line.price, line.quantity))
            .bind(OrderStatus::Pending)
            .bind(first.and_then(|p| p.estimated_shipping_date))
            .fetch_one(&mut *tx)
            .await?;

            tracing::info!(
                "Order {} placed: {} x {} ({})",
                order.order_number,
                order.quantity,
                line.wine_title,
                line.variant_title
            );

            orders.push(CheckoutOrder {
                order,
                pallets: pallets.iter().map(|p| p.progress()).collect(),
            });
        }

        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(cart.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Checkout of cart {} created {} orders", cart.id, orders.len());
        Ok(CheckoutResult { customer, orders })
    }

    /// Orders newest first, optionally filtered
    pub async fn list_orders(&self, filters: OrderFilters) -> AppResult<Vec<Order>> {
        let status = filters.status()?;

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::uuid IS NULL OR pallet_id = $1)
              AND ($2::uuid IS NULL OR wine_id = $2)
              AND ($3::varchar IS NULL OR status = $3)
            ORDER BY order_date DESC
            "#,
        )
        .bind(filters.pallet_id)
        .bind(filters.wine_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        tracing::info!("Listed {} orders", orders.len());
        Ok(orders)
    }

    /// Order by its human-readable number
    pub async fn get_order(&self, order_number: &str) -> AppResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = $1")
            .bind(order_number)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }
}
