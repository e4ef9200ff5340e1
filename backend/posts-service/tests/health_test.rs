/// HTTP tests for the liveness and readiness endpoints
mod common;

use actix_middleware::CORRELATION_ID_HEADER;
use actix_web::http::StatusCode;
use actix_web::test;
use async_trait::async_trait;
use posts_service::db::{Conditional, PostStore, StoreError};
use posts_service::models::{Comment, Post};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Store whose connection is gone; every call times out.
struct UnreachableStore;

fn timed_out<T>() -> Result<T, StoreError> {
    Err(StoreError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl PostStore for UnreachableStore {
    async fn insert(&self, _: &Post) -> Result<(), StoreError> {
        timed_out()
    }
    async fn find_by_id(&self, _: Uuid) -> Result<Option<Post>, StoreError> {
        timed_out()
    }
    async fn find_all(&self) -> Result<Vec<Post>, StoreError> {
        timed_out()
    }
    async fn delete(&self, _: Uuid) -> Result<bool, StoreError> {
        timed_out()
    }
    async fn push_like_if_absent(&self, _: Uuid, _: Uuid) -> Result<Conditional, StoreError> {
        timed_out()
    }
    async fn pull_like(&self, _: Uuid, _: Uuid) -> Result<Conditional, StoreError> {
        timed_out()
    }
    async fn push_comment(&self, _: Uuid, _: &Comment) -> Result<Option<Post>, StoreError> {
        timed_out()
    }
    async fn pull_comment(&self, _: Uuid, _: Uuid) -> Result<Conditional, StoreError> {
        timed_out()
    }
    async fn ping(&self) -> Result<(), StoreError> {
        timed_out()
    }
}

#[actix_web::test]
async fn test_readiness_echoes_correlation_id() {
    let app = common::setup_test_app().await;

    let req = test::TestRequest::get()
        .uri("/api/health/ready")
        .insert_header((CORRELATION_ID_HEADER, "ready-check-1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(CORRELATION_ID_HEADER).unwrap(),
        "ready-check-1"
    );
}

#[actix_web::test]
async fn test_readiness_reports_unreachable_store() {
    let app = common::setup_test_app_with_store(Arc::new(UnreachableStore)).await;

    let req = test::TestRequest::get()
        .uri("/api/health/ready")
        .insert_header((CORRELATION_ID_HEADER, "ready-check-2"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        resp.headers().get(CORRELATION_ID_HEADER).unwrap(),
        "ready-check-2"
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ready"], false);
    assert_eq!(body["store"]["status"], "unhealthy");
}

#[actix_web::test]
async fn test_store_failure_is_internal_error() {
    let app = common::setup_test_app_with_store(Arc::new(UnreachableStore)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["internal"], "Internal server error");
    assert!(body.get("postnotfound").is_none());
}
