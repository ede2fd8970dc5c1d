pub mod auth;
pub mod rate_limiting;

pub use auth::{AuthMiddleware, AuthenticatedUser};
pub use rate_limiting::{RateLimitConfig, RateLimiter};
