//! Authentication service for the station admin login and token checks

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// Subject of every admin token; the station has a single admin role
pub const ADMIN_SUBJECT: &str = "station-admin";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    admin_password_hash: Option<String>,
    token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issued access token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
            token_expiry: config.token_expiry_secs,
        }
    }

    /// Check the admin password and issue a token
    pub fn login(&self, password: &str) -> AppResult<AuthToken> {
        let Some(password_hash) = self.admin_password_hash.as_deref() else {
            tracing::warn!("Admin login attempted but no password hash is configured");
            return Err(AppError::LoginDisabled);
        };

        let valid = verify(password, password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::warn!("Admin login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("Admin logged in");
        self.generate_token()
    }

    /// Validate a bearer token and return its claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        if claims.sub != ADMIN_SUBJECT {
            return Err(AppError::Unauthorized("Token is not an admin token".to_string()));
        }
        Ok(claims)
    }

    fn generate_token(&self) -> AppResult<AuthToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            exp: (now + Duration::seconds(self.token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_expiry,
        })
    }
}

/// bcrypt hash for `auth.admin_password_hash`
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}
