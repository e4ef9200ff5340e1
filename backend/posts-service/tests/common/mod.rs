//! Shared helpers for posts-service HTTP tests
#![allow(dead_code)]

use actix_middleware::{Claims, CorrelationIdMiddleware, JwtVerifier, TokenVerifier};
use actix_web::{test, web, App};
use jsonwebtoken::{encode, EncodingKey, Header};
use posts_service::db::{InMemoryPostStore, PostStore};
use posts_service::routes;
use posts_service::services::PostMutationService;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const SECRET: &str = "posts-service-test-secret-0123456789";

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// HS256 token for `user`, valid for an hour.
pub fn token_for(user: Uuid) -> String {
    let claims = Claims {
        sub: user.to_string(),
        exp: now() + 3600,
        iat: now(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user: Uuid) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user)))
}

pub async fn setup_test_app_with_store(
    store: Arc<dyn PostStore>,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::from_secret(SECRET).unwrap());

    test::init_service(
        App::new()
            .app_data(web::Data::new(PostMutationService::new(store)))
            .wrap(CorrelationIdMiddleware)
            .configure(routes::configure(verifier)),
    )
    .await
}

pub async fn setup_test_app() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    setup_test_app_with_store(Arc::new(InMemoryPostStore::new())).await
}
