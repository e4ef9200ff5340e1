//! Bearer token authentication
//!
//! `JwtAuthMiddleware` resolves the `Authorization: Bearer <token>` header into
//! a [`UserId`] before the handler runs. It never rejects a request on its own:
//! public and protected routes share one scope, and protected handlers opt in
//! by taking a [`UserId`] argument, whose extractor answers 401 when no
//! identity was resolved.
//!
//! Token checking sits behind the [`TokenVerifier`] trait so the verifier is
//! built once at startup and injected, instead of living in process-wide state.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Minimum accepted length of an HS256 secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// User ID resolved from a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// JWT claims understood by the verifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: usize,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid Authorization header format")]
    InvalidScheme,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid token: malformed user_id")]
    InvalidSubject,

    #[error("JWT secret too short: need at least 32 bytes")]
    WeakSecret,
}

/// Resolves a raw bearer credential to the acting user.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

/// HS256 verifier over a shared secret
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn from_secret(secret: &str) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSecret);
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Uuid::parse_str(&token_data.claims.sub)
            .map(UserId)
            .map_err(|_| AuthError::InvalidSubject)
    }
}

/// Why a presented credential was not accepted; kept for the extractor.
#[derive(Debug, Clone)]
struct AuthFailure(AuthError);

/// Resolves bearer tokens into request extensions
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    verifier: Arc<dyn TokenVerifier>,
}

impl JwtAuthMiddleware {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    verifier: Arc<dyn TokenVerifier>,
}

impl<S> JwtAuthMiddlewareService<S> {
    fn resolve(&self, req: &ServiceRequest) -> Option<Result<UserId, AuthError>> {
        let header = req.headers().get("Authorization")?;

        let resolved = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthError::InvalidScheme)
            .and_then(|token| self.verifier.verify(token.trim()));

        Some(resolved)
    }
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.resolve(&req) {
            Some(Ok(user_id)) => {
                req.extensions_mut().insert(user_id);
            }
            Some(Err(err)) => {
                tracing::debug!(path = %req.path(), error = %err, "bearer token rejected");
                req.extensions_mut().insert(AuthFailure(err));
            }
            None => {}
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();

        if let Some(user_id) = extensions.get::<UserId>() {
            return ready(Ok(*user_id));
        }

        let reason = extensions
            .get::<AuthFailure>()
            .map(|failure| failure.0.clone())
            .unwrap_or(AuthError::MissingHeader);

        ready(Err(ErrorUnauthorized(reason.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn secret() -> String {
        "a".repeat(MIN_SECRET_LEN)
    }

    fn create_test_jwt(sub: &str, expires_in_seconds: i64, secret: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            exp: (now + expires_in_seconds) as usize,
            iat: now as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    async fn whoami(user_id: UserId) -> HttpResponse {
        HttpResponse::Ok().body(user_id.0.to_string())
    }

    async fn public() -> HttpResponse {
        HttpResponse::Ok().body("public")
    }

    fn verifier() -> Arc<dyn TokenVerifier> {
        Arc::new(JwtVerifier::from_secret(&secret()).unwrap())
    }

    #[::core::prelude::v1::test]
    fn test_rejects_short_secret() {
        let short = "a".repeat(MIN_SECRET_LEN - 1);
        assert_eq!(
            JwtVerifier::from_secret(&short).err(),
            Some(AuthError::WeakSecret)
        );
    }

    #[::core::prelude::v1::test]
    fn test_verify_valid_token() {
        let user = Uuid::new_v4();
        let token = create_test_jwt(&user.to_string(), 3600, &secret());
        assert_eq!(verifier().verify(&token), Ok(UserId(user)));
    }

    #[::core::prelude::v1::test]
    fn test_verify_rejects_expired_token() {
        let token = create_test_jwt(&Uuid::new_v4().to_string(), -3600, &secret());
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[::core::prelude::v1::test]
    fn test_verify_rejects_foreign_signature() {
        let token = create_test_jwt(&Uuid::new_v4().to_string(), 3600, &"b".repeat(32));
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[::core::prelude::v1::test]
    fn test_verify_rejects_non_uuid_subject() {
        let token = create_test_jwt("user-123", 3600, &secret());
        assert_eq!(verifier().verify(&token), Err(AuthError::InvalidSubject));
    }

    #[actix_web::test]
    async fn test_extractor_returns_resolved_user() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(verifier()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let user = Uuid::new_v4();
        let token = create_test_jwt(&user.to_string(), 3600, &secret());
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, user.to_string());
    }

    #[actix_web::test]
    async fn test_protected_route_without_header_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(verifier()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_wrong_scheme_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(verifier()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_public_route_ignores_bad_token() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(verifier()))
                .route("/public", web::get().to(public)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/public")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
