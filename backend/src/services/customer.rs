//! Customer service

use serde::Deserialize;
use sqlx::PgConnection;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::non_empty;
use shared::{validate_email, Customer};

/// Customer details supplied at checkout
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CustomerInput {
    pub email: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub accepts_marketing: Option<bool>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub province: Option<String>,
}

impl CustomerInput {
    /// Validated input with the email normalised to lowercase
    pub fn normalized(mut self) -> AppResult<Self> {
        self.email = self.email.trim().to_lowercase();
        if self.email.is_empty() {
            return Err(AppError::field("email", "Email is required"));
        }
        validate_email(&self.email).map_err(|m| AppError::field("email", m))?;
        self.validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        Ok(self)
    }
}

/// Customer service
pub struct CustomerService;

impl CustomerService {
    /// Insert a customer or refresh the one with the same email.
    /// Blank fields never overwrite stored values.
    pub async fn upsert_customer(conn: &mut PgConnection, input: CustomerInput) -> AppResult<Customer> {
        let input = input.normalized()?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (email, first_name, last_name, phone, accepts_marketing,
                                   address, city, postal_code, country, province)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (email) DO UPDATE SET
                first_name = COALESCE(EXCLUDED.first_name, customers.first_name),
                last_name = COALESCE(EXCLUDED.last_name, customers.last_name),
                phone = COALESCE(EXCLUDED.phone, customers.phone),
                accepts_marketing = EXCLUDED.accepts_marketing OR customers.accepts_marketing,
                address = COALESCE(EXCLUDED.address, customers.address),
                city = COALESCE(EXCLUDED.city, customers.city),
                postal_code = COALESCE(EXCLUDED.postal_code, customers.postal_code),
                country = COALESCE(EXCLUDED.country, customers.country),
                province = COALESCE(EXCLUDED.province, customers.province),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&input.email)
        .bind(non_empty(input.first_name))
        .bind(non_empty(input.last_name))
        .bind(non_empty(input.phone))
        .bind(input.accepts_marketing.unwrap_or(false))
        .bind(non_empty(input.address))
        .bind(non_empty(input.city))
        .bind(non_empty(input.postal_code))
        .bind(non_empty(input.country))
        .bind(non_empty(input.province))
        .fetch_one(&mut *conn)
        .await?;

        tracing::info!("Customer {} recorded", customer.display_name());
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalised() {
        let input = CustomerInput {
            email: "  Kund@Example.SE ".to_string(),
            ..Default::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(input.email, "kund@example.se");
    }

    #[test]
    fn test_invalid_email_rejected() {
        let err = CustomerInput {
            email: "not-an-email".to_string(),
            ..Default::default()
        }
        .normalized()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "email"));
    }
}
