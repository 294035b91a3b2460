//! Producer service (the storefront's vendors)

use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::{handle_or_slug, non_empty};
use shared::Producer;

/// Producer service
#[derive(Clone)]
pub struct ProducerService {
    db: PgPool,
}

/// Input for creating a producer
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateProducerInput {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    /// Derived from the name when omitted
    #[validate(length(max = 255))]
    pub handle: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(max = 255))]
    pub website: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    pub is_active: Option<bool>,
}

impl ProducerService {
    /// Create a new ProducerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a producer
    pub async fn create_producer(&self, input: CreateProducerInput) -> AppResult<Producer> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let name = non_empty(input.name)
            .ok_or_else(|| AppError::field("name", "Name and handle are required"))?;
        let handle = handle_or_slug(input.handle, &name, "Name and handle are required")?;

        let producer = sqlx::query_as::<_, Producer>(
            r#"
            INSERT INTO producers (name, handle, description, country, region, website, logo_url, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&handle)
        .bind(input.description.unwrap_or_default())
        .bind(input.country.unwrap_or_default())
        .bind(input.region.unwrap_or_default())
        .bind(input.website.unwrap_or_default())
        .bind(non_empty(input.logo_url))
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Producer {} added", producer.handle);
        Ok(producer)
    }

    /// All producers, newest first
    pub async fn list_producers(&self) -> AppResult<Vec<Producer>> {
        let producers = sqlx::query_as::<_, Producer>(
            "SELECT * FROM producers ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        tracing::info!("Fetched {} producers", producers.len());
        Ok(producers)
    }
}
