use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    collections::HashMap,
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::warn;

use bid_lotto_shared::{RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW};

// Stale windows are swept once the table grows past this many clients.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: RATE_LIMIT_MAX_REQUESTS,
            window_duration: RATE_LIMIT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, PartialEq, Eq)]
enum Decision {
    Allowed { remaining: u32, reset_after: u64 },
    Limited { retry_after: u64 },
}

/// Fixed-window request counter per client IP, shared by every worker.
#[derive(Clone)]
pub struct RateLimiter {
    memory_store: Arc<RwLock<HashMap<String, RateLimitEntry>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            memory_store: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    async fn check(&self, key: &str, now: Instant) -> Decision {
        let window = self.config.window_duration;
        let mut store = self.memory_store.write().await;

        if store.len() >= SWEEP_THRESHOLD {
            store.retain(|_, entry| now.duration_since(entry.window_start) < window);
        }

        let entry = store.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });
        if now.duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
        }

        let reset_after = window
            .saturating_sub(now.duration_since(entry.window_start))
            .as_secs()
            .max(1);

        if entry.count >= self.config.requests_per_window {
            warn!("Rate limit exceeded for {}", key);
            return Decision::Limited {
                retry_after: reset_after,
            };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.config.requests_per_window - entry.count,
            reset_after,
        }
    }

    fn client_key(req: &ServiceRequest) -> String {
        // Socket address only; forwarding headers are client-controlled.
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = self.limiter.clone();

        Box::pin(async move {
            let key = RateLimiter::client_key(&req);
            let limit = limiter.config.requests_per_window;

            match limiter.check(&key, Instant::now()).await {
                Decision::Allowed { remaining, reset_after } => {
                    let mut res = service.call(req).await?;
                    let headers = res.headers_mut();
                    headers.insert(HeaderName::from_static("x-ratelimit-limit"), HeaderValue::from(limit));
                    headers.insert(
                        HeaderName::from_static("x-ratelimit-remaining"),
                        HeaderValue::from(remaining),
                    );
                    headers.insert(
                        HeaderName::from_static("x-ratelimit-reset"),
                        HeaderValue::from(reset_after),
                    );
                    Ok(res.map_into_left_body())
                }
                Decision::Limited { retry_after } => {
                    let response = HttpResponse::TooManyRequests()
                        .insert_header(("X-RateLimit-Limit", limit.to_string()))
                        .insert_header(("X-RateLimit-Remaining", "0"))
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .json(serde_json::json!({
                            "error": "rate_limited",
                            "message": "Too many requests, please try again later",
                            "retry_after": retry_after
                        }));
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, web, App};
    use std::net::SocketAddr;

    fn limiter(requests: u32, seconds: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            requests_per_window: requests,
            window_duration: Duration::from_secs(seconds),
        })
    }

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    fn peer(ip: &str) -> SocketAddr {
        format!("{}:40000", ip).parse().unwrap()
    }

    #[test]
    fn default_allows_a_thousand_requests_per_ten_minutes() {
        let config = RateLimitConfig::default();
        assert_eq!(config.requests_per_window, 1000);
        assert_eq!(config.window_duration, Duration::from_secs(600));
    }

    #[actix_web::test]
    async fn counts_within_a_window_and_resets_after_it() {
        let limiter = limiter(2, 60);
        let start = Instant::now();

        assert_eq!(
            limiter.check("10.0.0.1", start).await,
            Decision::Allowed { remaining: 1, reset_after: 60 }
        );
        assert!(matches!(limiter.check("10.0.0.1", start).await, Decision::Allowed { remaining: 0, .. }));
        assert_eq!(
            limiter.check("10.0.0.1", start + Duration::from_secs(45)).await,
            Decision::Limited { retry_after: 15 }
        );

        // Other clients have their own budget.
        assert!(matches!(limiter.check("10.0.0.2", start).await, Decision::Allowed { .. }));

        let later = start + Duration::from_secs(60);
        assert!(matches!(limiter.check("10.0.0.1", later).await, Decision::Allowed { remaining: 1, .. }));
    }

    #[actix_web::test]
    async fn over_the_limit_gets_429_with_retry_after() {
        let app = actix_test::init_service(
            App::new()
                .wrap(limiter(2, 600))
                .route("/ping", web::get().to(ok)),
        )
        .await;

        for remaining in ["1", "0"] {
            let req = actix_test::TestRequest::get()
                .uri("/ping")
                .peer_addr(peer("192.0.2.7"))
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200);
            assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), remaining);
        }

        let req = actix_test::TestRequest::get()
            .uri("/ping")
            .peer_addr(peer("192.0.2.7"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 429);
        assert!(resp.headers().contains_key("retry-after"));

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "rate_limited");

        let req = actix_test::TestRequest::get()
            .uri("/ping")
            .peer_addr(peer("192.0.2.8"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 200);
    }

    #[actix_web::test]
    async fn forwarded_headers_do_not_change_the_client() {
        let app = actix_test::init_service(
            App::new()
                .wrap(limiter(1, 600))
                .route("/ping", web::get().to(ok)),
        )
        .await;

        let first = actix_test::TestRequest::get()
            .uri("/ping")
            .peer_addr(peer("192.0.2.7"))
            .insert_header(("X-Forwarded-For", "203.0.113.1"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, first).await.status(), 200);

        let second = actix_test::TestRequest::get()
            .uri("/ping")
            .peer_addr(peer("192.0.2.7"))
            .insert_header(("X-Forwarded-For", "203.0.113.2"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, second).await.status(), 429);
    }
}
