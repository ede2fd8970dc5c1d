use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::WalletService;
use crate::utils::validation_errors_to_app_error;
use actix_web::{web, HttpResponse};
use bid_lotto_shared::{WalletAmountRequest, WalletResponse};
use validator::Validate;

pub async fn get_wallet(
    user: AuthenticatedUser,
    wallet_service: web::Data<WalletService>,
) -> Result<HttpResponse, AppError> {
    let wallet = wallet_service.get_balance(user.user_id).await?;
    Ok(HttpResponse::Ok().json(WalletResponse {
        message: "Wallet balance retrieved successfully".to_string(),
        amount: None,
        wallet,
    }))
}

pub async fn increase(
    user: AuthenticatedUser,
    request: web::Json<WalletAmountRequest>,
    wallet_service: web::Data<WalletService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    let wallet = wallet_service.increase(user.user_id, request.amount).await?;
    Ok(HttpResponse::Ok().json(WalletResponse {
        message: "Wallet increased successfully".to_string(),
        amount: Some(request.amount),
        wallet,
    }))
}

pub async fn decrease(
    user: AuthenticatedUser,
    request: web::Json<WalletAmountRequest>,
    wallet_service: web::Data<WalletService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    let wallet = wallet_service.decrease(user.user_id, request.amount).await?;
    Ok(HttpResponse::Ok().json(WalletResponse {
        message: "Wallet decreased successfully".to_string(),
        amount: Some(request.amount),
        wallet,
    }))
}
