//! Admin authentication: password check and token management

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Role claim carried by admin tokens
pub const ADMIN_ROLE: &str = "admin";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    admin_email: String,
    admin_password_hash: String,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Admin email
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: &Config) -> Self {
        Self {
            admin_email: config.admin.email.clone(),
            admin_password_hash: config.admin.password_hash.clone(),
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Authenticate the admin with email and password
    pub fn login(&self, email: &str, password: &str) -> AppResult<AuthTokens> {
        if self.admin_email.is_empty() || self.admin_password_hash.is_empty() {
            tracing::warn!("Admin login attempted but no admin account is configured");
            return Err(AppError::InvalidCredentials);
        }

        if !email.trim().eq_ignore_ascii_case(&self.admin_email) {
            return Err(AppError::InvalidCredentials);
        }

        // Verify password
        let valid = verify(password, &self.admin_password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("Admin {} logged in", self.admin_email);
        self.generate_token(&self.admin_email)
    }

    /// Issue an access token for the admin
    pub fn generate_token(&self, subject: &str) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })?;

        if token_data.claims.role != ADMIN_ROLE {
            return Err(AppError::InsufficientPermissions);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(password_hash: String) -> AuthService {
        AuthService {
            admin_email: "admin@example.se".to_string(),
            admin_password_hash: password_hash,
            jwt_secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_login_and_validate() {
        let hash = bcrypt::hash("vinlagret", 4).unwrap();
        let auth = service(hash);

        let tokens = auth.login("Admin@Example.se", "vinlagret").unwrap();
        assert_eq!(tokens.token_type, "Bearer");

        let claims = auth.validate_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, "admin@example.se");
        assert_eq!(claims.role, ADMIN_ROLE);
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        let hash = bcrypt::hash("vinlagret", 4).unwrap();
        let auth = service(hash);
        assert!(matches!(
            auth.login("admin@example.se", "fel"),
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("someone@example.se", "vinlagret"),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_disabled_without_hash() {
        let auth = service(String::new());
        assert!(matches!(
            auth.login("admin@example.se", "anything"),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let auth = service(String::new());
        assert!(matches!(
            auth.validate_token("not-a-token"),
            Err(AppError::InvalidToken)
        ));
    }
}
