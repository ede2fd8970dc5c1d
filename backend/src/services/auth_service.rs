use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::utils::{
    crypto::{hash_password, verify_password},
    jwt::JwtService,
};
use bid_lotto_shared::{
    AuthResponse, LoginRequest, RegisterRequest, UserRole, ERROR_EMAIL_ALREADY_EXISTS, ERROR_INVALID_CREDENTIALS,
    ERROR_PHONE_ALREADY_EXISTS, ERROR_USER_NOT_FOUND, SUCCESS_LOGIN, SUCCESS_USER_CREATED,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_service: Arc<JwtService>) -> Self {
        Self { pool, jwt_service }
    }

    /// Register a new customer and sign them in.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        let email = request.email.as_deref().map(normalize_email);
        let phone = request.phone.as_deref().map(str::trim);

        if let Some(email) = email.as_deref() {
            if User::email_taken(&self.pool, email, None).await? {
                return Err(AppError::Conflict(ERROR_EMAIL_ALREADY_EXISTS.to_string()));
            }
        }
        if let Some(phone) = phone {
            if User::phone_taken(&self.pool, phone, None).await? {
                return Err(AppError::Conflict(ERROR_PHONE_ALREADY_EXISTS.to_string()));
            }
        }

        let password_hash = hash_password(&request.password)?;

        let user = User::create(
            &self.pool,
            NewUser {
                email: email.as_deref(),
                phone,
                first_name: request.first_name.trim(),
                last_name: request.last_name.trim(),
                password_hash: &password_hash,
                role: UserRole::Customer,
            },
        )
        .await
        .map_err(map_identity_conflict)?;

        info!("Registered user {}", user.id);

        self.auth_response(SUCCESS_USER_CREATED, user)
    }

    /// Sign in with email or phone plus password.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let user = match (request.email.as_deref(), request.phone.as_deref()) {
            (Some(email), _) => User::find_by_email(&self.pool, &normalize_email(email)).await?,
            (None, Some(phone)) => User::find_by_phone(&self.pool, phone.trim()).await?,
            (None, None) => return Err(AppError::Validation("Either email or phone is required".to_string())),
        }
        .ok_or_else(|| AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            warn!("Failed login for user {}", user.id);
            return Err(AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()));
        }

        info!("User {} logged in", user.id);

        self.auth_response(SUCCESS_LOGIN, user)
    }

    /// Make sure an admin account exists for `email`, promoting an existing account if needed.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        if let Some(existing) = User::find_by_email(&self.pool, &email).await? {
            if !existing.is_admin() {
                warn!("Promoting account {} to admin and replacing its password", existing.id);
            }
        }

        let password_hash = hash_password(password)?;
        let admin = User::upsert_admin(&self.pool, &email, &password_hash).await?;
        info!("Admin account {} is ready", admin.id);
        Ok(admin)
    }

    pub async fn get_current_user(&self, user_id: i64) -> Result<User, AppError> {
        User::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))
    }

    fn auth_response(&self, message: &str, user: User) -> Result<AuthResponse, AppError> {
        let token = self
            .jwt_service
            .generate_token(user.id, user.role, user.email.clone(), user.phone.clone())?;

        Ok(AuthResponse {
            message: message.to_string(),
            user: user.into(),
            token,
            expires_in: self.jwt_service.expires_in(),
        })
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Turn a unique violation on users into the matching conflict message.
pub(crate) fn map_identity_conflict(err: AppError) -> AppError {
    match err {
        AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            match db_err.constraint() {
                Some(constraint) if constraint.contains("phone") => {
                    AppError::Conflict(ERROR_PHONE_ALREADY_EXISTS.to_string())
                }
                _ => AppError::Conflict(ERROR_EMAIL_ALREADY_EXISTS.to_string()),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Somchai@Example.COM "), "somchai@example.com");
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_identity_conflict(AppError::Validation("bad".into()));
        assert!(matches!(err, AppError::Validation(msg) if msg == "bad"));
    }
}
