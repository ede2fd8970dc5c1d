use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::AuthService;
use crate::utils::validation_errors_to_app_error;
use actix_web::{web, HttpResponse};
use bid_lotto_shared::{LoginRequest, RegisterRequest, UserResponse};
use tracing::debug;
use validator::Validate;

#[cfg(test)]
mod tests;

/// Register a new customer account
pub async fn register(
    request: web::Json<RegisterRequest>,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    debug!("Registration attempt");

    let response = auth_service.register(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Sign in with email or phone
pub async fn login(
    request: web::Json<LoginRequest>,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    let response = auth_service.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// The signed-in user's own record
pub async fn me(user: AuthenticatedUser, auth_service: web::Data<AuthService>) -> Result<HttpResponse, AppError> {
    let current = auth_service.get_current_user(user.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(current)))
}
