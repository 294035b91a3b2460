//! Database bootstrap: tables, indexes, row-level security and example data
//!
//! Every step is idempotent so the bootstrap can run on each startup.

use serde::Serialize;
use serde_json::json;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

/// One named bootstrap step
pub struct SetupStep {
    pub name: &'static str,
    /// Failure message reported when the step fails
    pub failure: &'static str,
    pub sql: &'static str,
}

/// Tables created by the bootstrap, in dependency order
pub const TABLES: &[&str] = &[
    "collections",
    "producers",
    "wines",
    "wine_images",
    "wine_variants",
    "wine_options",
    "wine_option_values",
    "customers",
    "pallets",
    "orders",
    "carts",
    "cart_lines",
];

pub const SETUP_STEPS: &[SetupStep] = &[
    SetupStep {
        name: "collections",
        failure: "Failed to create collections table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS collections (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            handle VARCHAR(255) UNIQUE NOT NULL,
            description TEXT,
            image_url VARCHAR(255),
            seo_title VARCHAR(255),
            seo_description TEXT,
            is_active BOOLEAN NOT NULL DEFAULT true,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "producers",
        failure: "Failed to create producers table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS producers (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            handle VARCHAR(255) UNIQUE NOT NULL,
            description TEXT,
            country VARCHAR(100),
            region VARCHAR(100),
            website VARCHAR(255),
            logo_url VARCHAR(255),
            is_active BOOLEAN NOT NULL DEFAULT true,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "wines",
        failure: "Failed to create wines table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS wines (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            handle VARCHAR(255) UNIQUE NOT NULL,
            description TEXT,
            description_html TEXT,
            product_type VARCHAR(100) NOT NULL DEFAULT 'Wine',
            category_id UUID REFERENCES collections(id),
            producer_id UUID REFERENCES producers(id),
            vintage INTEGER,
            wine_type VARCHAR(100),
            grape_varieties TEXT[] NOT NULL DEFAULT '{}',
            alcohol_content DECIMAL(4,2),
            region VARCHAR(100),
            country VARCHAR(100),
            price_range_min DECIMAL(10,2) NOT NULL,
            price_range_max DECIMAL(10,2) NOT NULL,
            compare_at_price DECIMAL(10,2),
            currency_code VARCHAR(3) NOT NULL DEFAULT 'SEK',
            bottles_per_pallet INTEGER NOT NULL DEFAULT 56,
            min_pallet_orders INTEGER NOT NULL DEFAULT 1,
            max_pallet_orders INTEGER NOT NULL DEFAULT 10,
            available_for_sale BOOLEAN NOT NULL DEFAULT true,
            is_active BOOLEAN NOT NULL DEFAULT true,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "wine_images",
        failure: "Failed to create wine_images table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS wine_images (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            wine_id UUID NOT NULL REFERENCES wines(id) ON DELETE CASCADE,
            url VARCHAR(500) NOT NULL,
            alt_text VARCHAR(255),
            width INTEGER,
            height INTEGER,
            position INTEGER NOT NULL DEFAULT 0,
            is_featured BOOLEAN NOT NULL DEFAULT false,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "wine_variants",
        failure: "Failed to create wine_variants table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS wine_variants (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            wine_id UUID NOT NULL REFERENCES wines(id) ON DELETE CASCADE,
            title VARCHAR(255) NOT NULL,
            price DECIMAL(10,2) NOT NULL,
            compare_at_price DECIMAL(10,2),
            available_for_sale BOOLEAN NOT NULL DEFAULT true,
            bottle_size VARCHAR(50) NOT NULL DEFAULT '750ml',
            sku VARCHAR(255),
            barcode VARCHAR(255),
            weight_grams INTEGER,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "wine_options",
        failure: "Failed to create wine_options table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS wine_options (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            wine_id UUID REFERENCES wines(id) ON DELETE CASCADE,
            name VARCHAR(100) NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "wine_option_values",
        failure: "Failed to create wine_option_values table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS wine_option_values (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            option_id UUID REFERENCES wine_options(id) ON DELETE CASCADE,
            value VARCHAR(255) NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "customers",
        failure: "Failed to create customers table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS customers (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            email VARCHAR(255) UNIQUE NOT NULL,
            first_name VARCHAR(100),
            last_name VARCHAR(100),
            phone VARCHAR(20),
            accepts_marketing BOOLEAN NOT NULL DEFAULT false,
            address TEXT,
            city VARCHAR(100),
            postal_code VARCHAR(20),
            country VARCHAR(100),
            province VARCHAR(100),
            is_active BOOLEAN NOT NULL DEFAULT true,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "pallets",
        failure: "Failed to create pallets table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS pallets (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            wine_id UUID NOT NULL REFERENCES wines(id) ON DELETE CASCADE,
            target_bottles INTEGER NOT NULL CHECK (target_bottles > 0),
            current_bottles INTEGER NOT NULL DEFAULT 0 CHECK (current_bottles >= 0),
            status VARCHAR(50) NOT NULL DEFAULT 'filling',
            estimated_shipping_date DATE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "orders",
        failure: "Failed to create orders table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS orders (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            order_number VARCHAR(255) UNIQUE NOT NULL,
            customer_id UUID REFERENCES customers(id) ON DELETE CASCADE,
            wine_id UUID REFERENCES wines(id) ON DELETE CASCADE,
            variant_id UUID REFERENCES wine_variants(id),
            pallet_id UUID REFERENCES pallets(id) ON DELETE CASCADE,
            quantity INTEGER NOT NULL,
            unit_price DECIMAL(10,2) NOT NULL,
            total_price DECIMAL(10,2) NOT NULL,
            status VARCHAR(50) NOT NULL DEFAULT 'pending',
            financial_status VARCHAR(50) NOT NULL DEFAULT 'pending',
            fulfillment_status VARCHAR(50) NOT NULL DEFAULT 'unfulfilled',
            order_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            estimated_shipping_date DATE,
            notes TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "carts",
        failure: "Failed to create carts table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS carts (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            customer_id UUID REFERENCES customers(id),
            expires_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "cart_lines",
        failure: "Failed to create cart_lines table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS cart_lines (
            id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
            cart_id UUID NOT NULL REFERENCES carts(id) ON DELETE CASCADE,
            wine_id UUID NOT NULL REFERENCES wines(id) ON DELETE CASCADE,
            variant_id UUID NOT NULL REFERENCES wine_variants(id),
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    SetupStep {
        name: "indexes",
        failure: "Failed to create indexes",
        sql: r#"
        CREATE INDEX IF NOT EXISTS idx_collections_handle ON collections(handle);
        CREATE INDEX IF NOT EXISTS idx_collections_is_active ON collections(is_active);
        CREATE INDEX IF NOT EXISTS idx_producers_handle ON producers(handle);
        CREATE INDEX IF NOT EXISTS idx_producers_is_active ON producers(is_active);
        CREATE INDEX IF NOT EXISTS idx_wines_handle ON wines(handle);
        CREATE INDEX IF NOT EXISTS idx_wines_producer_id ON wines(producer_id);
        CREATE INDEX IF NOT EXISTS idx_wines_category_id ON wines(category_id);
        CREATE INDEX IF NOT EXISTS idx_wines_is_active ON wines(is_active);
        CREATE INDEX IF NOT EXISTS idx_wines_available_for_sale ON wines(available_for_sale);
        CREATE INDEX IF NOT EXISTS idx_wines_price_range ON wines(price_range_min, price_range_max);
        CREATE INDEX IF NOT EXISTS idx_wine_images_wine_id ON wine_images(wine_id);
        CREATE INDEX IF NOT EXISTS idx_wine_images_position ON wine_images(position);
        CREATE INDEX IF NOT EXISTS idx_wine_variants_wine_id ON wine_variants(wine_id);
        CREATE INDEX IF NOT EXISTS idx_wine_variants_available ON wine_variants(available_for_sale);
        CREATE INDEX IF NOT EXISTS idx_orders_customer_id ON orders(customer_id);
        CREATE INDEX IF NOT EXISTS idx_orders_wine_id ON orders(wine_id);
        CREATE INDEX IF NOT EXISTS idx_orders_pallet_id ON orders(pallet_id);
        CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
        CREATE INDEX IF NOT EXISTS idx_orders_order_number ON orders(order_number);
        CREATE INDEX IF NOT EXISTS idx_pallets_wine_id ON pallets(wine_id);
        CREATE INDEX IF NOT EXISTS idx_pallets_status ON pallets(status);
        CREATE INDEX IF NOT EXISTS idx_carts_customer_id ON carts(customer_id);
        CREATE INDEX IF NOT EXISTS idx_cart_lines_cart_id ON cart_lines(cart_id);
        "#,
    },
    SetupStep {
        name: "rls",
        failure: "Failed to setup RLS policies",
        sql: r#"
        ALTER TABLE collections ENABLE ROW LEVEL SECURITY;
        ALTER TABLE producers ENABLE ROW LEVEL SECURITY;
        ALTER TABLE wines ENABLE ROW LEVEL SECURITY;
        ALTER TABLE wine_images ENABLE ROW LEVEL SECURITY;
        ALTER TABLE wine_variants ENABLE ROW LEVEL SECURITY;
        ALTER TABLE wine_options ENABLE ROW LEVEL SECURITY;
        ALTER TABLE wine_option_values ENABLE ROW LEVEL SECURITY;
        ALTER TABLE customers ENABLE ROW LEVEL SECURITY;
        ALTER TABLE pallets ENABLE ROW LEVEL SECURITY;
        ALTER TABLE orders ENABLE ROW LEVEL SECURITY;
        ALTER TABLE carts ENABLE ROW LEVEL SECURITY;
        ALTER TABLE cart_lines ENABLE ROW LEVEL SECURITY;

        DO $$
        DECLARE
            p RECORD;
        BEGIN
            FOR p IN
                SELECT * FROM (VALUES
                    ('collections', 'Allow public read access to collections',
                     'FOR SELECT USING (is_active = true)'),
                    ('producers', 'Allow public read access to producers',
                     'FOR SELECT USING (is_active = true)'),
                    ('wines', 'Allow public read access to wines',
                     'FOR SELECT USING (is_active = true AND available_for_sale = true)'),
                    ('wine_images', 'Allow public read access to wine_images',
                     'FOR SELECT USING (true)'),
                    ('wine_variants', 'Allow public read access to wine_variants',
                     'FOR SELECT USING (available_for_sale = true)'),
                    ('wine_options', 'Allow public read access to wine_options',
                     'FOR SELECT USING (true)'),
                    ('wine_option_values', 'Allow public read access to wine_option_values',
                     'FOR SELECT USING (true)'),
                    ('pallets', 'Allow public read access to pallets',
                     'FOR SELECT USING (true)'),
                    ('orders', 'Allow customers to read own orders',
                     'FOR SELECT USING (customer_id::text = current_setting(''app.customer_id'', true))'),
                    ('orders', 'Allow customers to create orders',
                     'FOR INSERT WITH CHECK (customer_id::text = current_setting(''app.customer_id'', true))'),
                    ('carts', 'Allow customers to manage own cart',
                     'FOR ALL USING (customer_id::text = current_setting(''app.customer_id'', true))'),
                    ('cart_lines', 'Allow customers to manage own cart lines',
                     'FOR ALL USING (cart_id IN (SELECT id FROM carts WHERE customer_id::text = current_setting(''app.customer_id'', true)))')
                ) AS v(table_name, policy_name, definition)
            LOOP
                IF NOT EXISTS (
                    SELECT 1 FROM pg_policies
                    WHERE tablename = p.table_name AND policyname = p.policy_name
                ) THEN
                    EXECUTE format('CREATE POLICY %I ON %I %s',
                        p.policy_name, p.table_name, p.definition);
                END IF;
            END LOOP;
        END
        $$;
        "#,
    },
];

/// Outcome of a bootstrap or seeding run
#[derive(Debug, Clone, Serialize)]
pub struct SetupResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SetupResult {
    fn failed(message: &str, details: serde_json::Value) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            details: Some(details),
        }
    }
}

/// Setup service for bootstrapping the schema
#[derive(Clone)]
pub struct SetupService {
    db: PgPool,
}

impl SetupService {
    /// Create a new SetupService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Run every bootstrap step in order, stopping at the first failure
    pub async fn setup_database(&self) -> SetupResult {
        tracing::info!("Starting database setup for the pallet wine store");

        for step in SETUP_STEPS {
            // Plain SQL strings go through the simple query protocol,
            // which accepts the multi-statement steps
            if let Err(e) = self.db.execute(step.sql).await {
                tracing::error!("Setup step {} failed: {}", step.name, e);
                return SetupResult::failed(
                    step.failure,
                    json!({ "step": step.name, "error": e.to_string() }),
                );
            }
            tracing::debug!("Setup step {} completed", step.name);
        }

        tracing::info!("Database setup completed");
        SetupResult {
            success: true,
            message: "Database setup completed successfully for the pallet wine store".to_string(),
            details: Some(json!({
                "tables": TABLES,
                "indexes": "Performance indexes created",
                "rls": "Row Level Security enabled",
                "storefront_compatible": "Structure matches the storefront data model",
            })),
        }
    }

    /// Insert the example catalog. A store that already holds the example
    /// wine is left untouched.
    pub async fn seed_example_data(&self) -> SetupResult {
        match self.seed().await {
            Ok(Some(details)) => {
                tracing::info!("Example data seeded");
                SetupResult {
                    success: true,
                    message: "Example data seeded successfully".to_string(),
                    details: Some(details),
                }
            }
            Ok(None) => SetupResult {
                success: true,
                message: "Example data already present".to_string(),
                details: None,
            },
            Err(e) => {
                tracing::error!("Data seeding failed: {}", e);
                SetupResult::failed("Data seeding failed", json!({ "error": e.to_string() }))
            }
        }
    }

    async fn seed(&self) -> AppResult<Option<serde_json::Value>> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM wines WHERE handle = 'chateau-margaux-2018'",
        )
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Ok(None);
        }

        let mut tx = self.db.begin().await?;

        let collection_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO collections (title, handle, description, seo_title, seo_description)
            VALUES ('Bordeaux Wines', 'bordeaux-wines',
                    'Exceptional wines from the legendary Bordeaux region',
                    'Bordeaux Wines - Premium French Wines',
                    'Discover the finest Bordeaux wines from renowned producers')
            ON CONFLICT (handle) DO UPDATE SET updated_at = NOW()
            RETURNING id
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let producer_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO producers (name, handle, description, country, region, website)
            VALUES ('Château Margaux', 'chateau-margaux',
                    'Legendary Bordeaux producer known for exceptional wines',
                    'France', 'Bordeaux', 'https://www.chateau-margaux.com')
            ON CONFLICT (handle) DO UPDATE SET updated_at = NOW()
            RETURNING id
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let wine_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO wines (
                title, handle, description, description_html, product_type,
                category_id, producer_id, vintage, wine_type, grape_varieties,
                alcohol_content, region, country, price_range_min, price_range_max,
                bottles_per_pallet, min_pallet_orders, max_pallet_orders
            )
            VALUES (
                'Château Margaux 2018', 'chateau-margaux-2018',
                'A magnificent vintage with exceptional complexity and aging potential',
                '<p>A magnificent vintage with exceptional complexity and aging potential</p>',
                'Wine', $1, $2, 2018, 'Red',
                ARRAY['Cabernet Sauvignon', 'Merlot', 'Cabernet Franc', 'Petit Verdot'],
                13.5, 'Bordeaux', 'France', 899.00, 899.00, 56, 1, 5
            )
            RETURNING id
            "#,
        )
        .bind(collection_id)
        .bind(producer_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO wine_variants (wine_id, title, price, bottle_size, available_for_sale)
            VALUES ($1, '750ml', 899.00, '750ml', true)
            "#,
        )
        .bind(wine_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO wine_images (wine_id, url, alt_text, width, height, position, is_featured)
            VALUES ($1, 'https://images.unsplash.com/photo-1510812431401-41d2bd2722f3?w=800',
                    'Château Margaux 2018 Red Wine', 800, 600, 1, true)
            "#,
        )
        .bind(wine_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO pallets (wine_id, target_bottles, current_bottles, status)
            VALUES ($1, 56, 0, 'filling')
            "#,
        )
        .bind(wine_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(json!({
            "collection": "Bordeaux Wines",
            "producer": "Château Margaux",
            "wine": "Château Margaux 2018",
            "variant": "750ml",
            "pallet": "Created",
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_a_step() {
        for table in TABLES {
            assert!(
                SETUP_STEPS.iter().any(|s| s.name == *table),
                "missing step for {}",
                table
            );
        }
    }

    #[test]
    fn test_steps_are_idempotent() {
        for step in SETUP_STEPS {
            if step.sql.contains("CREATE TABLE") {
                assert!(step.sql.contains("IF NOT EXISTS"), "{}", step.name);
            }
        }
        let rls = SETUP_STEPS.iter().find(|s| s.name == "rls").unwrap();
        assert!(rls.sql.contains("pg_policies"));
    }

    #[test]
    fn test_tables_precede_indexes_and_policies() {
        let names: Vec<&str> = SETUP_STEPS.iter().map(|s| s.name).collect();
        let last_table = names.iter().rposition(|n| TABLES.contains(n)).unwrap();
        assert_eq!(names[last_table + 1], "indexes");
        assert_eq!(names[last_table + 2], "rls");
    }
}
