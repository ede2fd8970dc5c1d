use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use bid_lotto_shared::{UserRole, JWT_MIN_SECRET_LENGTH};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,           // Subject (user ID)
    pub role: UserRole,        // User role
    pub email: Option<String>, // Email, when registered with one
    pub phone: Option<String>, // Phone, when registered with one
    pub exp: i64,              // Expiration time
    pub iat: i64,              // Issued at
    pub jti: String,           // JWT ID
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::Authentication("Invalid user ID in token".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl JwtService {
    pub fn new(secret: &str, expiry_seconds: u64) -> Result<Self, AppError> {
        if secret.len() < JWT_MIN_SECRET_LENGTH {
            return Err(AppError::Internal(format!(
                "JWT_SECRET must be at least {} characters long",
                JWT_MIN_SECRET_LENGTH
            )));
        }

        let expiry_seconds = i64::try_from(expiry_seconds)
            .map_err(|_| AppError::Internal("Invalid token expiry duration".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub", "iat", "jti"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 30; // clock skew

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry: Duration::seconds(expiry_seconds),
        })
    }

    /// Lifetime of issued tokens, in seconds.
    pub fn expires_in(&self) -> i64 {
        self.expiry.num_seconds()
    }

    /// Generate an access token
    pub fn generate_token(
        &self,
        user_id: i64,
        role: UserRole,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now + self.expiry;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            email,
            phone,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Authentication("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::Authentication("Invalid token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Authentication("Invalid token signature".to_string())
                }
                _ => AppError::Authentication(format!("Token validation failed: {}", e)),
            })?;

        Ok(token_data.claims)
    }
}
