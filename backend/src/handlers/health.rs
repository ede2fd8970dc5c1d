use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use sqlx::PgPool;
use tracing::warn;

pub async fn health_check(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => "up",
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            "down"
        }
    };

    let body = json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "service": "bid-lotto-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    });

    if database == "up" {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::ServiceUnavailable().json(body))
    }
}
