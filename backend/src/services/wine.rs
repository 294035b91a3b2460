//! Wine catalog service: admin writes and storefront product queries

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::{handle_or_slug, non_empty};
use shared::{
    adapt_wine_to_product, validate_alcohol_content, validate_currency_code,
    validate_pallet_settings, validate_price_range, validate_vintage, CatalogQuery, Product,
    Producer, Wine, WineImage, WineVariant,
};

/// Alcohol by volume written when the admin leaves it blank
const DEFAULT_ALCOHOL_CONTENT: Decimal = Decimal::from_parts(135, 0, 0, false, 1);

/// Default upper bound on live pallets per wine
const DEFAULT_MAX_PALLET_ORDERS: i32 = 10;

/// Wine service
#[derive(Clone)]
pub struct WineService {
    db: PgPool,
}

/// Input for creating a wine
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateWineInput {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    /// Derived from the title when omitted
    #[validate(length(max = 255))]
    pub handle: Option<String>,
    pub description: Option<String>,
    pub description_html: Option<String>,
    #[validate(length(max = 100))]
    pub product_type: Option<String>,
    pub category_id: Option<Uuid>,
    pub producer_id: Option<Uuid>,
    pub vintage: Option<i32>,
    #[validate(length(max = 100))]
    pub wine_type: Option<String>,
    pub grape_varieties: Option<Vec<String>>,
    pub alcohol_content: Option<Decimal>,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    pub price_range_min: Option<Decimal>,
    pub price_range_max: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub currency_code: Option<String>,
    pub bottles_per_pallet: Option<i32>,
    pub min_pallet_orders: Option<i32>,
    pub max_pallet_orders: Option<i32>,
    pub available_for_sale: Option<bool>,
    pub is_active: Option<bool>,
}

/// Values written for a new wine
#[derive(Debug, Clone, PartialEq)]
pub struct NewWine {
    pub title: String,
    pub handle: String,
    pub description: String,
    pub description_html: Option<String>,
    pub product_type: String,
    pub category_id: Option<Uuid>,
    pub producer_id: Option<Uuid>,
    pub vintage: i32,
    pub wine_type: String,
    pub grape_varieties: Vec<String>,
    pub alcohol_content: Decimal,
    pub region: String,
    pub country: String,
    pub price_range_min: Decimal,
    pub price_range_max: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub currency_code: String,
    pub bottles_per_pallet: i32,
    pub min_pallet_orders: i32,
    pub max_pallet_orders: i32,
    pub available_for_sale: bool,
    pub is_active: bool,
}

impl CreateWineInput {
    /// Apply defaults and validate the wine's settings
    pub fn into_new(
        self,
        current_year: i32,
        default_bottles_per_pallet: i32,
        default_currency: &str,
    ) -> AppResult<NewWine> {
        self.validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let title = non_empty(self.title)
            .ok_or_else(|| AppError::field("title", "Title and handle are required"))?;
        let handle = handle_or_slug(self.handle, &title, "Title and handle are required")?;

        let vintage = self.vintage.unwrap_or(current_year);
        validate_vintage(vintage, current_year).map_err(|m| AppError::field("vintage", m))?;

        let alcohol_content = self.alcohol_content.unwrap_or(DEFAULT_ALCOHOL_CONTENT);
        validate_alcohol_content(alcohol_content)
            .map_err(|m| AppError::field("alcohol_content", m))?;

        let price_range_min = self.price_range_min.unwrap_or(Decimal::ZERO);
        let price_range_max = self.price_range_max.unwrap_or(price_range_min);
        validate_price_range(price_range_min, price_range_max)
            .map_err(|m| AppError::field("price_range_min", m))?;

        let bottles_per_pallet = self.bottles_per_pallet.unwrap_or(default_bottles_per_pallet);
        let min_pallet_orders = self.min_pallet_orders.unwrap_or(1);
        let max_pallet_orders = self.max_pallet_orders.unwrap_or(DEFAULT_MAX_PALLET_ORDERS);
        validate_pallet_settings(bottles_per_pallet, min_pallet_orders, max_pallet_orders)
            .map_err(|m| AppError::field("bottles_per_pallet", m))?;

        let currency_code = non_empty(self.currency_code)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| default_currency.to_string());
        validate_currency_code(&currency_code)
            .map_err(|m| AppError::field("currency_code", m))?;

        Ok(NewWine {
            title,
            handle,
            description: self.description.unwrap_or_default(),
            description_html: non_empty(self.description_html),
            product_type: non_empty(self.product_type).unwrap_or_else(|| "Wine".to_string()),
            category_id: self.category_id,
            producer_id: self.producer_id,
            vintage,
            wine_type: self.wine_type.unwrap_or_default(),
            grape_varieties: self
                .grape_varieties
                .unwrap_or_default()
                .into_iter()
                .filter_map(|g| non_empty(Some(g)))
                .collect(),
            alcohol_content,
            region: self.region.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            price_range_min,
            price_range_max,
            compare_at_price: self.compare_at_price,
            currency_code,
            bottles_per_pallet,
            min_pallet_orders,
            max_pallet_orders,
            available_for_sale: self.available_for_sale.unwrap_or(true),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// Escape LIKE wildcards in a search term
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Join wines with their variants, images and producers into products,
/// keeping the order of `wines`
pub fn assemble_products(
    wines: &[Wine],
    variants: Vec<WineVariant>,
    images: Vec<WineImage>,
    producers: Vec<Producer>,
) -> Vec<Product> {
    let mut variants_by_wine: HashMap<Uuid, Vec<WineVariant>> = HashMap::new();
    for variant in variants {
        variants_by_wine.entry(variant.wine_id).or_default().push(variant);
    }

    let mut images_by_wine: HashMap<Uuid, Vec<WineImage>> = HashMap::new();
    for image in images {
        images_by_wine.entry(image.wine_id).or_default().push(image);
    }
    for list in images_by_wine.values_mut() {
        list.sort_by_key(|i| (i.position, i.created_at));
    }

    let producers: HashMap<Uuid, Producer> = producers.into_iter().map(|p| (p.id, p)).collect();

    wines
        .iter()
        .map(|wine| {
            adapt_wine_to_product(
                wine,
                variants_by_wine.get(&wine.id).map(Vec::as_slice).unwrap_or(&[]),
                images_by_wine.get(&wine.id).map(Vec::as_slice).unwrap_or(&[]),
                wine.producer_id.and_then(|id| producers.get(&id)),
            )
        })
        .collect()
}

impl WineService {
    /// Create a new WineService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a wine
    pub async fn create_wine(
        &self,
        input: CreateWineInput,
        default_bottles_per_pallet: i32,
        default_currency: &str,
    ) -> AppResult<Wine> {
        let new = input.into_new(
            Utc::now().year(),
            default_bottles_per_pallet,
            default_currency,
        )?;

        if let Some(category_id) = new.category_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM collections WHERE id = $1)",
            )
            .bind(category_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::NotFound("Collection".to_string()));
            }
        }

        if let Some(producer_id) = new.producer_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM producers WHERE id = $1)",
            )
            .bind(producer_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::NotFound("Producer".to_string()));
            }
        }

        let wine = sqlx::query_as::<_, Wine>(
            r#"
            INSERT INTO wines (
                title, handle, description, description_html, product_type,
                category_id, producer_id, vintage, wine_type, grape_varieties,
                alcohol_content, region, country, price_range_min, price_range_max,
                compare_at_price, currency_code, bottles_per_pallet, min_pallet_orders,
                max_pallet_orders, available_for_sale, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(&new.handle)
        .bind(&new.description)
        .bind(&new.description_html)
        .bind(&new.product_type)
        .bind(new.category_id)
        .bind(new.producer_id)
        .bind(new.vintage)
        .bind(&new.wine_type)
        .bind(&new.grape_varieties)
        .bind(new.alcohol_content)
        .bind(&new.region)
        .bind(&new.country)
        .bind(new.price_range_min)
        .bind(new.price_range_max)
        .bind(new.compare_at_price)
        .bind(&new.currency_code)
        .bind(new.bottles_per_pallet)
        .bind(new.min_pallet_orders)
        .bind(new.max_pallet_orders)
        .bind(new.available_for_sale)
        .bind(new.is_active)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Wine {} added", wine.handle);
        Ok(wine)
    }

    /// All wine rows, newest first
    pub async fn list_wines(&self) -> AppResult<Vec<Wine>> {
        let wines = sqlx::query_as::<_, Wine>("SELECT * FROM wines ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await?;

        tracing::info!("Fetched {} wines", wines.len());
        Ok(wines)
    }

    /// Storefront listing of wines that are active and for sale
    pub async fn get_store_wines(&self, params: &CatalogQuery) -> AppResult<Vec<Product>> {
        let (sort_key, reverse) = params.order_by();
        let direction = if reverse { "DESC" } else { "ASC" };

        // Column and direction come from a closed set, never from the request
        let sql = format!(
            r#"
            SELECT w.* FROM wines w
            WHERE w.is_active = true
              AND w.available_for_sale = true
              AND ($1::text IS NULL OR w.category_id IN (
                    SELECT c.id FROM collections c
                    WHERE c.handle = $1 OR c.id::text = $1))
              AND ($2::text IS NULL OR w.title ILIKE $2 OR w.description ILIKE $2)
            ORDER BY w.{} {}, w.id
            LIMIT $3
            "#,
            sort_key.column(),
            direction
        );

        let wines = sqlx::query_as::<_, Wine>(&sql)
            .bind(params.collection.as_deref().filter(|c| !c.is_empty()))
            .bind(params.search_term().map(like_pattern))
            .bind(params.limit.map(|l| l.max(0)))
            .fetch_all(&self.db)
            .await?;

        let products = self.to_products(&wines).await?;
        tracing::info!("Storefront listing returned {} wines", products.len());
        Ok(products)
    }

    /// Single active wine as a product
    pub async fn get_store_wine(&self, handle: &str) -> AppResult<Product> {
        let wine = sqlx::query_as::<_, Wine>(
            "SELECT * FROM wines WHERE handle = $1 AND is_active = true",
        )
        .bind(handle)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Wine".to_string()))?;

        self.to_products(std::slice::from_ref(&wine))
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Wine".to_string()))
    }

    /// Load variants, images and producers for the wines and adapt them
    async fn to_products(&self, wines: &[Wine]) -> AppResult<Vec<Product>> {
        if wines.is_empty() {
            return Ok(Vec::new());
        }

        let wine_ids: Vec<Uuid> = wines.iter().map(|w| w.id).collect();
        let producer_ids: Vec<Uuid> = wines.iter().filter_map(|w| w.producer_id).collect();

        let variants = sqlx::query_as::<_, WineVariant>(
            "SELECT * FROM wine_variants WHERE wine_id = ANY($1) ORDER BY price ASC, created_at ASC",
        )
        .bind(&wine_ids)
        .fetch_all(&self.db)
        .await?;

        let images = sqlx::query_as::<_, WineImage>(
            "SELECT * FROM wine_images WHERE wine_id = ANY($1) ORDER BY position ASC, created_at ASC",
        )
        .bind(&wine_ids)
        .fetch_all(&self.db)
        .await?;

        let producers = sqlx::query_as::<_, Producer>("SELECT * FROM producers WHERE id = ANY($1)")
            .bind(&producer_ids)
            .fetch_all(&self.db)
            .await?;

        Ok(assemble_products(wines, variants, images, producers))
    }
}
