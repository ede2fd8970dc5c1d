use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use crate::error::AppError;
use crate::utils::jwt::{Claims, JwtService};
use bid_lotto_shared::{UserRole, ERROR_ADMIN_ONLY};

/// Authenticated user information extracted from JWT token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub role: UserRole,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        Ok(Self {
            user_id: claims.user_id()?,
            role: claims.role,
            email: claims.email.clone(),
            phone: claims.phone.clone(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl actix_web::FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<Claims>()
            .ok_or_else(|| AppError::Authentication("Authorization token is required".to_string()))
            .and_then(AuthenticatedUser::from_claims);

        ready(result)
    }
}

/// Validates the bearer token and optionally requires a role.
pub struct AuthMiddleware {
    jwt_service: Rc<JwtService>,
    required_role: Option<UserRole>,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self {
            jwt_service: Rc::new(jwt_service),
            required_role: None,
        }
    }

    pub fn require_role(mut self, role: UserRole) -> Self {
        self.required_role = Some(role);
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: self.jwt_service.clone(),
            required_role: self.required_role,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: Rc<JwtService>,
    required_role: Option<UserRole>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();
        let required_role = self.required_role;

        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string);

            let token = match token {
                Some(token) => token,
                None => {
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "missing_token",
                        "message": "Authorization token is required"
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let claims = match jwt_service.validate_token(&token) {
                Ok(claims) => claims,
                Err(e) => {
                    let message = match e {
                        AppError::Authentication(msg) => msg,
                        other => other.to_string(),
                    };
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "invalid_token",
                        "message": message
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            if let Some(required_role) = required_role {
                if !has_required_role(claims.role, required_role) {
                    let response = HttpResponse::Forbidden().json(serde_json::json!({
                        "error": "insufficient_permissions",
                        "message": ERROR_ADMIN_ONLY
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            req.extensions_mut().insert(claims);

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Admins may do everything a customer may.
fn has_required_role(user_role: UserRole, required_role: UserRole) -> bool {
    match required_role {
        UserRole::Customer => true,
        UserRole::Admin => user_role == UserRole::Admin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, web, App};

    const SECRET: &str = "test-secret-key-for-testing-only-must-be-at-least-32-chars";

    async fn whoami(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
        Ok(HttpResponse::Ok().json(serde_json::json!({ "id": user.user_id, "admin": user.is_admin() })))
    }

    fn setup_jwt_service() -> JwtService {
        JwtService::new(SECRET, 3600).expect("Failed to create JWT service")
    }

    #[actix_web::test]
    async fn test_auth_middleware_no_token() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(setup_jwt_service()))
                .route("/test", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/test").to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_auth_middleware_garbage_token() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(setup_jwt_service()))
                .route("/test", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_auth_middleware_valid_token() {
        let jwt_service = setup_jwt_service();
        let token = jwt_service
            .generate_token(12, UserRole::Customer, Some("somchai@example.com".to_string()), None)
            .expect("Failed to generate token");

        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt_service))
                .route("/test", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["id"], 12);
        assert_eq!(body["admin"], false);
    }

    #[actix_web::test]
    async fn test_auth_middleware_role_check() {
        let jwt_service = setup_jwt_service();
        let token = jwt_service
            .generate_token(12, UserRole::Customer, None, Some("0812345678".to_string()))
            .expect("Failed to generate token");

        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt_service).require_role(UserRole::Admin))
                .route("/admin", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn test_admin_passes_role_check() {
        let jwt_service = setup_jwt_service();
        let token = jwt_service
            .generate_token(1, UserRole::Admin, Some("admin@example.com".to_string()), None)
            .expect("Failed to generate token");

        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt_service).require_role(UserRole::Admin))
                .route("/admin", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let app = actix_test::init_service(App::new().route("/open", web::get().to(whoami))).await;

        let req = actix_test::TestRequest::get().uri("/open").to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(has_required_role(UserRole::Customer, UserRole::Customer));
        assert!(has_required_role(UserRole::Admin, UserRole::Customer));
        assert!(!has_required_role(UserRole::Customer, UserRole::Admin));
        assert!(has_required_role(UserRole::Admin, UserRole::Admin));
    }
}
