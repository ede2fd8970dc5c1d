pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use actix_web::web;
use bid_lotto_shared::DrawStrategy;
use sqlx::PgPool;
use std::sync::Arc;

use crate::middleware::RateLimiter;
use crate::services::{
    AdminService, AuthService, CartService, DrawService, RedemptionService, TicketService, UserService,
    WalletService,
};
use crate::utils::jwt::JwtService;

/// Register services as app data and mount all routes.
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    pool: PgPool,
    jwt_service: Arc<JwtService>,
    draw_strategy: DrawStrategy,
    rate_limiter: RateLimiter,
) {
    cfg.app_data(web::Data::new(pool.clone()))
        .app_data(web::Data::new(AuthService::new(pool.clone(), jwt_service.clone())))
        .app_data(web::Data::new(TicketService::new(pool.clone())))
        .app_data(web::Data::new(WalletService::new(pool.clone())))
        .app_data(web::Data::new(CartService::new(pool.clone())))
        .app_data(web::Data::new(DrawService::new(pool.clone(), draw_strategy)))
        .app_data(web::Data::new(RedemptionService::new(pool.clone())))
        .app_data(web::Data::new(UserService::new(pool.clone())))
        .app_data(web::Data::new(AdminService::new(pool)))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            error::AppError::Validation(err.to_string()).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, _req| {
            error::AppError::Validation(err.to_string()).into()
        }));

    handlers::configure(cfg, &jwt_service, rate_limiter);
}
