use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::CartService;
use crate::utils::validation_errors_to_app_error;
use actix_web::{web, HttpResponse};
use bid_lotto_shared::{
    AddToCartRequest, AddToCartResponse, CheckoutResponse, MessageResponse, RemoveFromCartRequest,
    SUCCESS_ADDED_TO_CART, SUCCESS_PURCHASE, SUCCESS_REMOVED_FROM_CART,
};
use tracing::debug;
use validator::Validate;

pub async fn add_to_cart(
    user: AuthenticatedUser,
    request: web::Json<AddToCartRequest>,
    cart_service: web::Data<CartService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    debug!("User {} adding ticket {} to cart", user.user_id, request.lotto_id);

    let reservation = cart_service.add_to_cart(user.user_id, request.lotto_id).await?;
    Ok(HttpResponse::Ok().json(AddToCartResponse {
        message: SUCCESS_ADDED_TO_CART.to_string(),
        cid: reservation.cid,
        order_id: reservation.order_id,
    }))
}

pub async fn remove_from_cart(
    user: AuthenticatedUser,
    request: web::Json<RemoveFromCartRequest>,
    cart_service: web::Data<CartService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    cart_service.remove_from_cart(user.user_id, request.cid).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: SUCCESS_REMOVED_FROM_CART.to_string(),
    }))
}

/// Pay for everything in the cart
pub async fn buy(user: AuthenticatedUser, cart_service: web::Data<CartService>) -> Result<HttpResponse, AppError> {
    let receipt = cart_service.checkout(user.user_id).await?;
    Ok(HttpResponse::Ok().json(CheckoutResponse {
        message: SUCCESS_PURCHASE.to_string(),
        order_id: receipt.order_id,
        total_price: receipt.total,
        new_wallet: receipt.new_wallet,
    }))
}

pub async fn check_cart(
    user: AuthenticatedUser,
    cart_service: web::Data<CartService>,
) -> Result<HttpResponse, AppError> {
    let contents = cart_service.list_cart_contents(user.user_id).await?;
    Ok(HttpResponse::Ok().json(contents))
}

pub async fn my_orders(
    user: AuthenticatedUser,
    cart_service: web::Data<CartService>,
) -> Result<HttpResponse, AppError> {
    let orders = cart_service.list_my_orders(user.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn order_detail(
    user: AuthenticatedUser,
    order_id: web::Path<i64>,
    cart_service: web::Data<CartService>,
) -> Result<HttpResponse, AppError> {
    let detail = cart_service.get_order_detail(user.user_id, user.role, *order_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}
