//! Request principal extraction.
//!
//! [`JwtAuthMiddleware`] decodes an HS256 bearer token and stores the caller
//! as a [`Principal`] in the request extensions. It never rejects a request:
//! a missing, malformed or expired token yields an anonymous principal, and
//! the services decide what an anonymous caller may do.

pub mod permissions;

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

pub use permissions::{authorize, require_owner, Access, Owned};

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub exp: usize,
}

/// The caller of a request; `None` when unauthenticated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Principal(pub Option<Uuid>);

impl Principal {
    pub fn anonymous() -> Self {
        Principal(None)
    }

    pub fn user(id: Uuid) -> Self {
        Principal(Some(id))
    }

    pub fn id(&self) -> Option<Uuid> {
        self.0
    }

    /// The authenticated user id, or `Forbidden` for anonymous callers
    pub fn require(&self) -> Result<Uuid, AppError> {
        self.0
            .ok_or_else(|| AppError::forbidden("Authentication required"))
    }
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let principal = req
            .extensions()
            .get::<Principal>()
            .copied()
            .unwrap_or_default();
        ready(Ok(principal))
    }
}

/// Decode a bearer token into a principal
pub fn principal_from_token(token: &str, secret: &str) -> Principal {
    let validation = Validation::new(Algorithm::HS256);
    let key = DecodingKey::from_secret(secret.as_bytes());

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => match Uuid::parse_str(&data.claims.sub) {
            Ok(id) => Principal::user(id),
            Err(_) => {
                tracing::debug!(sub = %data.claims.sub, "Token subject is not a user id");
                Principal::anonymous()
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            Principal::anonymous()
        }
    }
}

pub struct JwtAuthMiddleware {
    secret: String,
}

impl JwtAuthMiddleware {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: S,
    secret: String,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let principal = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|token| principal_from_token(token.trim(), &self.secret))
            .unwrap_or_default();

        req.extensions_mut().insert(principal);

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn create_test_jwt(sub: &str, expires_in_seconds: i64, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + expires_in_seconds) as usize;
        let claims = Claims {
            sub: sub.to_string(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    async fn whoami(principal: Principal) -> HttpResponse {
        match principal.id() {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    async fn call(header: Option<String>) -> String {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new("test-secret"))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            req = req.insert_header(("Authorization", value));
        }
        let body = test::call_and_read_body(&app, req.to_request()).await;
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn test_valid_token_sets_principal() {
        let id = Uuid::new_v4();
        let token = create_test_jwt(&id.to_string(), 3600, "test-secret");
        assert_eq!(call(Some(format!("Bearer {token}"))).await, id.to_string());
    }

    #[actix_web::test]
    async fn test_missing_or_bad_tokens_are_anonymous() {
        let id = Uuid::new_v4().to_string();

        assert_eq!(call(None).await, "anonymous");
        assert_eq!(call(Some("Basic abc".into())).await, "anonymous");

        let expired = create_test_jwt(&id, -3600, "test-secret");
        assert_eq!(call(Some(format!("Bearer {expired}"))).await, "anonymous");

        let wrong_secret = create_test_jwt(&id, 3600, "other-secret");
        assert_eq!(call(Some(format!("Bearer {wrong_secret}"))).await, "anonymous");

        let not_uuid = create_test_jwt("user-123", 3600, "test-secret");
        assert_eq!(call(Some(format!("Bearer {not_uuid}"))).await, "anonymous");
    }

    #[::core::prelude::v1::test]
    fn test_require_rejects_anonymous() {
        assert!(matches!(
            Principal::anonymous().require(),
            Err(AppError::Forbidden(_))
        ));
        let id = Uuid::new_v4();
        assert_eq!(Principal::user(id).require().unwrap(), id);
    }
}
