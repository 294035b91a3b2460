//! Variant and image service for wines

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::non_empty;
use shared::{variant_price_range, WineImage, WineVariant};

/// Variant service
#[derive(Clone)]
pub struct VariantService {
    db: PgPool,
}

/// Input for creating a variant
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateVariantInput {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub available_for_sale: Option<bool>,
    #[validate(length(max = 50))]
    pub bottle_size: Option<String>,
    #[validate(length(max = 255))]
    pub sku: Option<String>,
    #[validate(length(max = 255))]
    pub barcode: Option<String>,
    #[validate(range(min = 0))]
    pub weight_grams: Option<i32>,
}

/// Input for attaching an image
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateImageInput {
    #[validate(length(max = 500))]
    pub url: Option<String>,
    #[validate(length(max = 255))]
    pub alt_text: Option<String>,
    #[validate(range(min = 1))]
    pub width: Option<i32>,
    #[validate(range(min = 1))]
    pub height: Option<i32>,
    pub position: Option<i32>,
    pub is_featured: Option<bool>,
}

impl VariantService {
    /// Create a new VariantService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_wine(&self, wine_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM wines WHERE id = $1)")
            .bind(wine_id)
            .fetch_one(&self.db)
            .await?;
        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound("Wine".to_string()))
        }
    }

    /// Add a variant and refresh the wine's price range
    pub async fn create_variant(
        &self,
        wine_id: Uuid,
        input: CreateVariantInput,
    ) -> AppResult<WineVariant> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let title = non_empty(input.title)
            .ok_or_else(|| AppError::field("title", "Title and price are required"))?;
        let price = input
            .price
            .ok_or_else(|| AppError::field("price", "Title and price are required"))?;
        if price < Decimal::ZERO {
            return Err(AppError::field("price", "Price cannot be negative"));
        }

        self.ensure_wine(wine_id).await?;

        let mut tx = self.db.begin().await?;

        let variant = sqlx::query_as::<_, WineVariant>(
            r#"
            INSERT INTO wine_variants (wine_id, title, price, compare_at_price, available_for_sale,
                                       bottle_size, sku, barcode, weight_grams)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(wine_id)
        .bind(&title)
        .bind(price)
        .bind(input.compare_at_price)
        .bind(input.available_for_sale.unwrap_or(true))
        .bind(non_empty(input.bottle_size).unwrap_or_else(|| "750ml".to_string()))
        .bind(non_empty(input.sku))
        .bind(non_empty(input.barcode))
        .bind(input.weight_grams)
        .fetch_one(&mut *tx)
        .await?;

        // Keep the listing price in step with the purchasable variants
        let variants = sqlx::query_as::<_, WineVariant>(
            "SELECT * FROM wine_variants WHERE wine_id = $1",
        )
        .bind(wine_id)
        .fetch_all(&mut *tx)
        .await?;

        if let Some((min, max)) = variant_price_range(&variants) {
            sqlx::query(
                r#"
                UPDATE wines
                SET price_range_min = $2, price_range_max = $3, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(wine_id)
            .bind(min)
            .bind(max)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Variant {} added to wine {}", variant.title, wine_id);
        Ok(variant)
    }

    /// Variants of a wine, cheapest first
    pub async fn list_variants(&self, wine_id: Uuid) -> AppResult<Vec<WineVariant>> {
        self.ensure_wine(wine_id).await?;

        let variants = sqlx::query_as::<_, WineVariant>(
            "SELECT * FROM wine_variants WHERE wine_id = $1 ORDER BY price ASC, created_at ASC",
        )
        .bind(wine_id)
        .fetch_all(&self.db)
        .await?;

        Ok(variants)
    }

    /// Attach an image to a wine
    pub async fn add_image(&self, wine_id: Uuid, input: CreateImageInput) -> AppResult<WineImage> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let url = non_empty(input.url).ok_or_else(|| AppError::field("url", "Image URL is required"))?;

        self.ensure_wine(wine_id).await?;

        let image = sqlx::query_as::<_, WineImage>(
            r#"
            INSERT INTO wine_images (wine_id, url, alt_text, width, height, position, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(wine_id)
        .bind(&url)
        .bind(non_empty(input.alt_text))
        .bind(input.width)
        .bind(input.height)
        .bind(input.position.unwrap_or(0))
        .bind(input.is_featured.unwrap_or(false))
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Image added to wine {}", wine_id);
        Ok(image)
    }
}
