//! Cart service: carts, cart lines and their storefront view

use chrono::{Duration, Utc};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{summarize_cart, validate_quantity, Cart, CartLine, CartLineDetail, StoreCart};

/// Cart service
#[derive(Clone)]
pub struct CartService {
    db: PgPool,
    ttl_days: i64,
}

/// Input for adding an item to the cart
#[derive(Debug, Deserialize)]
pub struct AddCartItemInput {
    pub variant_id: Uuid,
    pub quantity: Option<i32>,
}

/// Input for changing a line's quantity
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemInput {
    pub quantity: i32,
}

/// What an update did to the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    Remove,
    SetQuantity(i32),
}

/// Quantity 0 removes the line; negative or oversized quantities are rejected
pub fn line_change(quantity: i32) -> AppResult<LineChange> {
    match quantity {
        0 => Ok(LineChange::Remove),
        q if q < 0 => Err(AppError::field("quantity", "Quantity cannot be negative")),
        q => {
            validate_quantity(q).map_err(|m| AppError::field("quantity", m))?;
            Ok(LineChange::SetQuantity(q))
        }
    }
}

/// Quantity of a line after adding more of the same variant
pub fn merged_quantity(current: i32, added: i32) -> AppResult<i32> {
    let merged = current.checked_add(added).unwrap_or(i32::MAX);
    validate_quantity(merged).map_err(|m| AppError::field("quantity", m))?;
    Ok(merged)
}

#[derive(Debug, sqlx::FromRow)]
struct VariantAvailability {
    wine_id: Uuid,
    title: String,
    available: bool,
}

impl CartService {
    /// Create a new CartService instance
    pub fn new(db: PgPool, ttl_days: i64) -> Self {
        Self { db, ttl_days }
    }

    /// Open a new cart
    pub async fn create_cart(&self) -> AppResult<Cart> {
        let expires_at = Utc::now() + Duration::days(self.ttl_days);
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (expires_at) VALUES ($1) RETURNING *",
        )
        .bind(expires_at)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Cart {} created", cart.id);
        Ok(cart)
    }

    /// Cart by id unless it is missing or expired
    pub async fn find_active_cart(&self, cart_id: Uuid) -> AppResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE id = $1")
            .bind(cart_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(cart.filter(|c| !c.is_expired(Utc::now())))
    }

    /// The cart from the cookie, or a fresh one. The flag is true when the
    /// cart was created and the cookie must be set.
    pub async fn get_or_create_cart(&self, cart_id: Option<Uuid>) -> AppResult<(Cart, bool)> {
        if let Some(id) = cart_id {
            if let Some(cart) = self.find_active_cart(id).await? {
                return Ok((cart, false));
            }
        }
        Ok((self.create_cart().await?, true))
    }

    /// Lines joined with their variant and wine
    pub async fn line_details(conn: &mut PgConnection, cart_id: Uuid) -> AppResult<Vec<CartLineDetail>> {
        let lines = sqlx::query_as::<_, CartLineDetail>(
            r#"
            SELECT l.id AS line_id, l.wine_id, l.variant_id, l.quantity,
                   v.title AS variant_title, v.bottle_size, v.price,
                   (v.available_for_sale AND w.available_for_sale AND w.is_active) AS available_for_sale,
                   w.title AS wine_title, w.handle AS wine_handle, w.currency_code
            FROM cart_lines l
            JOIN wine_variants v ON v.id = l.variant_id
            JOIN wines w ON w.id = l.wine_id
            WHERE l.cart_id = $1
            ORDER BY l.created_at ASC, l.id ASC
            "#,
        )
        .bind(cart_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(lines)
    }

    /// Storefront view of a cart; None when missing or expired
    pub async fn get_cart(
        &self,
        cart_id: Uuid,
        default_currency: &str,
        checkout_url: &str,
    ) -> AppResult<Option<StoreCart>> {
        let cart = match self.find_active_cart(cart_id).await? {
            Some(cart) => cart,
            None => return Ok(None),
        };

        let mut conn = self.db.acquire().await?;
        let lines = Self::line_details(&mut conn, cart.id).await?;

        Ok(Some(summarize_cart(
            &cart,
            &lines,
            default_currency,
            checkout_url.to_string(),
        )))
    }

    async fn require_active_cart(&self, cart_id: Uuid) -> AppResult<Cart> {
        self.find_active_cart(cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart".to_string()))
    }

    async fn touch(&self, cart_id: Uuid) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::days(self.ttl_days);
        sqlx::query("UPDATE carts SET expires_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .bind(expires_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Add a variant; an existing line for the same variant is incremented
    pub async fn add_item(&self, cart_id: Uuid, input: AddCartItemInput) -> AppResult<CartLine> {
        let quantity = input.quantity.unwrap_or(1);
        validate_quantity(quantity).map_err(|m| AppError::field("quantity", m))?;

        let variant = sqlx::query_as::<_, VariantAvailability>(
            r#"
            SELECT v.wine_id, w.title,
                   (v.available_for_sale AND w.available_for_sale AND w.is_active) AS available
            FROM wine_variants v
            JOIN wines w ON w.id = v.wine_id
            WHERE v.id = $1
            "#,
        )
        .bind(input.variant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Variant".to_string()))?;

        if !variant.available {
            return Err(AppError::Unavailable(variant.title));
        }

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, CartLine>(
            "SELECT * FROM cart_lines WHERE cart_id = $1 AND variant_id = $2 FOR UPDATE",
        )
        .bind(cart_id)
        .bind(input.variant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let line = match existing {
            Some(line) => {
                let merged = merged_quantity(line.quantity, quantity)?;
                sqlx::query_as::<_, CartLine>(
                    r#"
                    UPDATE cart_lines SET quantity = $2, updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(line.id)
                .bind(merged)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, CartLine>(
                    r#"
                    INSERT INTO cart_lines (cart_id, wine_id, variant_id, quantity)
                    VALUES ($1, $2, $3, $4)
                    RETURNING *
                    "#,
                )
                .bind(cart_id)
                .bind(variant.wine_id)
                .bind(input.variant_id)
                .bind(quantity)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        self.touch(cart_id).await?;

        tracing::info!("Cart {} now holds {} x variant {}", cart_id, line.quantity, line.variant_id);
        Ok(line)
    }

    /// Set a line's quantity; 0 removes the line
    pub async fn update_item(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
        input: UpdateCartItemInput,
    ) -> AppResult<()> {
        let change = line_change(input.quantity)?;
        self.require_active_cart(cart_id).await?;

        match change {
            LineChange::Remove => self.remove_item(cart_id, line_id).await,
            LineChange::SetQuantity(quantity) => {
                let result = sqlx::query(
                    r#"
                    UPDATE cart_lines SET quantity = $3, updated_at = NOW()
                    WHERE id = $1 AND cart_id = $2
                    "#,
                )
                .bind(line_id)
                .bind(cart_id)
                .bind(quantity)
                .execute(&self.db)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound("Cart line".to_string()));
                }
                self.touch(cart_id).await
            }
        }
    }

    /// Remove a line from the cart
    pub async fn remove_item(&self, cart_id: Uuid, line_id: Uuid) -> AppResult<()> {
        self.require_active_cart(cart_id).await?;

        let result = sqlx::query("DELETE FROM cart_lines WHERE id = $1 AND cart_id = $2")
            .bind(line_id)
            .bind(cart_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cart line".to_string()));
        }
        self.touch(cart_id).await
    }
}
