pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod lotto;
pub mod users;
pub mod wallet;

use crate::middleware::{AuthMiddleware, RateLimiter};
use crate::utils::jwt::JwtService;
use actix_web::web;
use bid_lotto_shared::UserRole;

/// Mount every route under `/api`, rate limited per client IP.
pub fn configure(cfg: &mut web::ServiceConfig, jwt_service: &JwtService, rate_limiter: RateLimiter) {
    cfg.service(
        web::scope("/api")
            .wrap(rate_limiter)
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new(jwt_service.clone()))
                            .route("/me", web::get().to(auth::me)),
                    ),
            )
            .service(
                web::scope("/lotto")
                    .wrap(AuthMiddleware::new(jwt_service.clone()))
                    .route("", web::get().to(lotto::list_tickets))
                    .route("/status/{status}", web::get().to(lotto::list_tickets_by_status))
                    .route("/check", web::post().to(lotto::check_ticket))
                    .route("/redeem", web::post().to(lotto::redeem_ticket))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(lotto::get_ticket))
                            .route(web::put().to(lotto::update_ticket)),
                    ),
            )
            .service(
                web::scope("/cart")
                    .wrap(AuthMiddleware::new(jwt_service.clone()))
                    .route("/add", web::post().to(cart::add_to_cart))
                    .route("/remove", web::post().to(cart::remove_from_cart))
                    .route("/buy", web::post().to(cart::buy))
                    .route("/check", web::get().to(cart::check_cart))
                    .route("/order/me", web::get().to(cart::my_orders))
                    .route("/order/item/{oid}", web::get().to(cart::order_detail)),
            )
            .service(
                web::scope("/wallet")
                    .wrap(AuthMiddleware::new(jwt_service.clone()))
                    .route("/get_wallet", web::get().to(wallet::get_wallet))
                    .route("/increase", web::post().to(wallet::increase))
                    .route("/decrease", web::post().to(wallet::decrease)),
            )
            .service(
                web::scope("/users")
                    .wrap(AuthMiddleware::new(jwt_service.clone()))
                    .route("", web::get().to(users::list_users))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(users::get_user))
                            .route(web::put().to(users::update_user)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .wrap(AuthMiddleware::new(jwt_service.clone()).require_role(UserRole::Admin))
                    .route("/generate_lotto", web::post().to(admin::generate_lotto))
                    .route("/draw_random_number", web::post().to(admin::draw_random_number))
                    .route("/draw_random_from_lottos", web::post().to(admin::draw_random_from_lottos))
                    .route("/prizes", web::get().to(admin::list_prizes))
                    .route("/reset", web::post().to(admin::reset)),
            ),
    );
}
