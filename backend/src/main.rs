use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bid_lotto_backend::config::AppConfig;
use bid_lotto_backend::database::Database;
use bid_lotto_backend::error::AppError;
use bid_lotto_backend::middleware::RateLimiter;
use bid_lotto_backend::services::AuthService;
use bid_lotto_backend::utils::jwt::JwtService;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let draw_strategy = config.draw_strategy()?;
    info!("Starting Bid Lotto Backend on {}", config.bind_address());

    let database = Database::new(&config.database_url, config.database_max_connections).await?;
    database.migrate().await?;
    info!("Database migrations applied");

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiry_seconds)?);

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        AuthService::new(database.pool().clone(), jwt_service.clone())
            .ensure_admin(email, password)
            .await?;
    }

    let pool = database.pool().clone();
    // One store for all workers
    let rate_limiter = RateLimiter::new(config.rate_limit());
    let cors_origin = config.cors_allowed_origin.clone();

    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
                .max_age(3600),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .configure(|cfg| {
                bid_lotto_backend::configure_app(
                    cfg,
                    pool.clone(),
                    jwt_service.clone(),
                    draw_strategy,
                    rate_limiter.clone(),
                )
            })
    })
    .bind(config.bind_address())?
    .run()
    .await
    .map_err(AppError::from)
}
