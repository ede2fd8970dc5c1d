use crate::middleware::RateLimitConfig;
use bid_lotto_shared::{
    DrawStrategy, JWT_ACCESS_TOKEN_EXPIRY, JWT_MIN_SECRET_LENGTH, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW,
};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiry_seconds: u64,
    pub draw_strategy: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub cors_allowed_origin: Option<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_max_connections", 20)?
            .set_default("jwt_expiry_seconds", JWT_ACCESS_TOKEN_EXPIRY.as_secs())?
            .set_default("draw_strategy", DrawStrategy::default().to_string())?
            .set_default("rate_limit_requests", u64::from(RATE_LIMIT_MAX_REQUESTS))?
            .set_default("rate_limit_window_seconds", RATE_LIMIT_WINDOW.as_secs())?
            .add_source(config::Environment::default())
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.jwt_secret.len() < JWT_MIN_SECRET_LENGTH {
            return Err(config::ConfigError::Message(format!(
                "JWT_SECRET must be at least {} characters",
                JWT_MIN_SECRET_LENGTH
            )));
        }
        if self.admin_email.is_some() != self.admin_password.is_some() {
            return Err(config::ConfigError::Message(
                "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
            ));
        }
        if self.rate_limit_requests == 0 || self.rate_limit_window_seconds == 0 {
            return Err(config::ConfigError::Message(
                "RATE_LIMIT_REQUESTS and RATE_LIMIT_WINDOW_SECONDS must be positive".to_string(),
            ));
        }
        self.draw_strategy()?;
        Ok(())
    }

    pub fn draw_strategy(&self) -> Result<DrawStrategy, config::ConfigError> {
        self.draw_strategy.parse().map_err(config::ConfigError::Message)
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_window: self.rate_limit_requests,
            window_duration: Duration::from_secs(self.rate_limit_window_seconds),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
