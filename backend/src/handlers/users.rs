use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::UserService;
use crate::utils::validation_errors_to_app_error;
use actix_web::{web, HttpResponse};
use bid_lotto_shared::{UpdateUserRequest, UserResponse, ERROR_ADMIN_ONLY};
use validator::Validate;

/// Admin: every account
pub async fn list_users(
    user: AuthenticatedUser,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    if !user.is_admin() {
        return Err(AppError::Authorization(ERROR_ADMIN_ONLY.to_string()));
    }

    let users: Vec<UserResponse> = user_service.list().await?.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(users))
}

pub async fn get_user(
    user: AuthenticatedUser,
    user_id: web::Path<i64>,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let found = user_service.get(user.user_id, user.role, *user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(found)))
}

pub async fn update_user(
    user: AuthenticatedUser,
    user_id: web::Path<i64>,
    request: web::Json<UpdateUserRequest>,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    let updated = user_service
        .update_profile(user.user_id, user.role, *user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User updated successfully",
        "user": UserResponse::from(updated),
    })))
}
