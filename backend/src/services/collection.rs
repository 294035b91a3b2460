//! Collection service for grouping wines

use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::{handle_or_slug, non_empty};
use shared::{adapt_collection, Collection, StoreCollection};

/// Collection service
#[derive(Clone)]
pub struct CollectionService {
    db: PgPool,
}

/// Input for creating a collection
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateCollectionInput {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    /// Derived from the title when omitted
    #[validate(length(max = 255))]
    pub handle: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(max = 255))]
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub is_active: Option<bool>,
}

/// Values written for a new collection
#[derive(Debug, PartialEq, Eq)]
pub struct NewCollection {
    pub title: String,
    pub handle: String,
    pub description: String,
    pub image_url: Option<String>,
    pub seo_title: String,
    pub seo_description: String,
    pub is_active: bool,
}

impl CreateCollectionInput {
    /// Apply defaults: SEO fields fall back to title and description
    pub fn into_new(self) -> AppResult<NewCollection> {
        self.validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let title = non_empty(self.title)
            .ok_or_else(|| AppError::field("title", "Title and handle are required"))?;
        let handle = handle_or_slug(self.handle, &title, "Title and handle are required")?;
        let description = self.description.unwrap_or_default();

        Ok(NewCollection {
            seo_title: non_empty(self.seo_title).unwrap_or_else(|| title.clone()),
            seo_description: non_empty(self.seo_description)
                .unwrap_or_else(|| description.clone()),
            image_url: non_empty(self.image_url),
            is_active: self.is_active.unwrap_or(true),
            title,
            handle,
            description,
        })
    }
}

impl CollectionService {
    /// Create a new CollectionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a collection
    pub async fn create_collection(&self, input: CreateCollectionInput) -> AppResult<Collection> {
        let new = input.into_new()?;

        let collection = sqlx::query_as::<_, Collection>(
            r#"
            INSERT INTO collections (title, handle, description, image_url, seo_title, seo_description, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(&new.handle)
        .bind(&new.description)
        .bind(&new.image_url)
        .bind(&new.seo_title)
        .bind(&new.seo_description)
        .bind(new.is_active)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Collection {} added", collection.handle);
        Ok(collection)
    }

    /// All collections, newest first
    pub async fn list_collections(&self) -> AppResult<Vec<Collection>> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        tracing::info!("Fetched {} collections", collections.len());
        Ok(collections)
    }

    /// Active collections in the storefront shape, by title
    pub async fn get_store_collections(&self) -> AppResult<Vec<StoreCollection>> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE is_active = true ORDER BY title ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(collections.iter().map(adapt_collection).collect())
    }

    /// Active collection row by handle
    pub async fn find_active_by_handle(&self, handle: &str) -> AppResult<Collection> {
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE handle = $1 AND is_active = true",
        )
        .bind(handle)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection".to_string()))
    }

    /// Single active collection in the storefront shape
    pub async fn get_store_collection(&self, handle: &str) -> AppResult<StoreCollection> {
        let collection = self.find_active_by_handle(handle).await?;
        Ok(adapt_collection(&collection))
    }
}
